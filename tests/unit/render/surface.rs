use super::*;

#[test]
fn new_surface_is_transparent() {
    let s = Surface::new(3, 2).unwrap();
    assert!(s.data().iter().all(|&b| b == 0));
    assert_eq!(s.data().len(), 3 * 2 * 4);
    assert!(Surface::new(0, 1).is_err());
}

#[test]
fn fill_with_addresses_row_major() {
    let mut s = Surface::new(3, 2).unwrap();
    s.fill_with(|x, y| [x as u8, y as u8, 0, 255]);
    assert_eq!(s.pixel(2, 0), [2, 0, 0, 255]);
    assert_eq!(s.pixel(1, 1), [1, 1, 0, 255]);
}

#[test]
fn draw_bitmap_respects_alpha() {
    let mut s = Surface::new(2, 1).unwrap();
    s.fill(Rgba8Premul::from_straight_rgba(0, 0, 255, 255));
    let bmp = AlphaBitmap::from_rgba8(2, 1, vec![255, 0, 0, 255, 255, 0, 0, 0]).unwrap();
    s.draw_bitmap(&bmp);
    assert_eq!(s.pixel(0, 0), [255, 0, 0, 255]);
    assert_eq!(s.pixel(1, 0), [0, 0, 255, 255]);
}

#[test]
fn draw_bitmap_clips_to_surface() {
    let mut s = Surface::new(2, 2).unwrap();
    let bmp = AlphaBitmap::filled(5, 5, [9, 9, 9, 255]).unwrap();
    s.draw_bitmap(&bmp);
    assert!(s.data().chunks_exact(4).all(|px| px == [9, 9, 9, 255]));
}

#[test]
fn straight_copy_unpremultiplies() {
    let mut s = Surface::new(1, 1).unwrap();
    s.fill(Rgba8Premul::from_straight_rgba(200, 0, 0, 128));
    let straight = s.to_straight_rgba8();
    assert_eq!(straight[3], 128);
    assert!((i32::from(straight[0]) - 200).abs() <= 2);
}

#[test]
fn pixmap_conversion_checks_lengths() {
    assert!(pixmap_from_premul_bytes(&[0u8; 7], 1, 2).is_err());
    assert!(pixmap_dims(70_000, 1).is_err());
    let p = pixmap_from_premul_bytes(&[1, 2, 3, 255], 1, 1).unwrap();
    assert_eq!(p.data_as_u8_slice(), &[1, 2, 3, 255]);
}
