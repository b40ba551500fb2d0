use super::*;

fn system_engine() -> Option<TextLayoutEngine> {
    FontBook::from_system().map(TextLayoutEngine::new)
}

#[test]
fn font_book_falls_back_to_default_then_any_face() {
    let mut book = FontBook::new();
    assert!(book.is_empty());
    assert!(book.face(FontVariant::Vt323).is_none());

    book.insert(FontVariant::Monoton, vec![1, 2, 3]);
    assert_eq!(book.face(FontVariant::Vt323).unwrap().as_slice(), &[1, 2, 3]);

    book.insert(FontVariant::Default, vec![9]);
    assert_eq!(book.face(FontVariant::Vt323).unwrap().as_slice(), &[9]);
    assert_eq!(book.face(FontVariant::Monoton).unwrap().as_slice(), &[1, 2, 3]);
}

#[test]
fn font_book_load_reports_missing_and_empty_files() {
    let dir = std::env::temp_dir().join(format!("cutframe-fontbook-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let empty = dir.join("empty.ttf");
    std::fs::write(&empty, b"").unwrap();

    let mut book = FontBook::new();
    assert!(book.load(FontVariant::Default, &dir.join("missing.ttf")).is_err());
    let err = book.load(FontVariant::Default, &empty).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"));
    assert!(book.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn layout_without_fonts_is_a_canvas_error() {
    let mut engine = TextLayoutEngine::new(FontBook::new());
    assert!(!engine.has_fonts());
    let err = engine
        .measure_width("HI", FontVariant::Default, 20.0)
        .unwrap_err();
    assert!(matches!(err, CutframeError::CanvasOperation(_)));
}

#[test]
fn layout_rejects_non_positive_size() {
    let mut book = FontBook::new();
    book.insert(FontVariant::Default, vec![0; 4]);
    let mut engine = TextLayoutEngine::new(book);
    assert!(engine.measure_width("HI", FontVariant::Default, 0.0).is_err());
    assert!(engine.measure_width("HI", FontVariant::Default, f32::NAN).is_err());
}

#[test]
fn measured_width_scales_with_size_and_length() {
    let Some(mut engine) = system_engine() else {
        return;
    };
    let small = engine.measure_width("RETRO!", FontVariant::Default, 20.0).unwrap();
    let large = engine.measure_width("RETRO!", FontVariant::Default, 40.0).unwrap();
    let longer = engine
        .measure_width("RETRO! RETRO!", FontVariant::Default, 20.0)
        .unwrap();
    assert!(small > 0.0);
    assert!((large / small - 2.0).abs() < 0.1, "{small} vs {large}");
    assert!(longer > small * 1.8);
    assert_eq!(engine.measure_width("", FontVariant::Default, 20.0).unwrap(), 0.0);
}

#[test]
fn repeated_layouts_reuse_the_registered_family() {
    let Some(mut engine) = system_engine() else {
        return;
    };
    let a = engine.measure_width("abc", FontVariant::Orbitron, 30.0).unwrap();
    let b = engine.measure_width("abc", FontVariant::Orbitron, 30.0).unwrap();
    assert_eq!(a, b);
    assert_eq!(engine.families.len(), 1);
}
