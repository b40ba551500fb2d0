use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(3, 2).unwrap();
    assert_eq!(c.pixel_count(), 6);
    assert_eq!(c.rgba8_len(), 24);
}

#[test]
fn canvas_contains_boundaries() {
    let c = Canvas::new(4, 3).unwrap();
    assert!(c.contains(0, 0));
    assert!(c.contains(3, 2));
    assert!(!c.contains(4, 2));
    assert!(!c.contains(-1, 0));
    assert!(!c.contains(0, 3));
}

#[test]
fn premul_from_straight_rounds() {
    let p = Rgba8Premul::from_straight_rgba(255, 128, 0, 128);
    assert_eq!(p.to_array(), [128, 64, 0, 128]);
    assert_eq!(
        Rgba8Premul::from_straight_rgba(10, 20, 30, 0),
        Rgba8Premul::transparent()
    );
}
