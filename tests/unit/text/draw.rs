use super::*;
use crate::foundation::core::{Point, Rgba8Premul};
use crate::foundation::error::CutframeError;
use crate::text::layout::FontBook;

fn grey_surface(w: u32, h: u32) -> Surface {
    let mut s = Surface::new(w, h).unwrap();
    s.fill(Rgba8Premul::from_straight_rgba(128, 128, 128, 255));
    s
}

fn caption(content: &str) -> TextOverlaySpec {
    TextOverlaySpec {
        enabled: true,
        content: content.to_string(),
        color: Color::rgb(255, 0, 0),
        size_px: 40,
        shadow_blur_px: 0,
        position: Point::new(100.0, 20.0),
        ..TextOverlaySpec::default()
    }
}

#[test]
fn hidden_caption_draws_nothing_even_without_fonts() {
    let mut engine = TextLayoutEngine::new(FontBook::new());
    let mut raster = Rasterizer::new();
    let mut s = grey_surface(50, 50);
    let before = s.clone();

    draw_caption(&mut s, &caption("  "), &mut engine, &mut raster).unwrap();
    let mut off = caption("HELLO");
    off.enabled = false;
    draw_caption(&mut s, &off, &mut engine, &mut raster).unwrap();
    assert_eq!(s, before);
}

#[test]
fn visible_caption_without_fonts_is_a_canvas_error() {
    let mut engine = TextLayoutEngine::new(FontBook::new());
    let mut s = grey_surface(50, 50);
    let err = draw_caption(&mut s, &caption("HI"), &mut engine, &mut Rasterizer::new())
        .unwrap_err();
    assert!(matches!(err, CutframeError::CanvasOperation(_)));
}

#[test]
fn caption_paints_fill_and_white_stroke_near_anchor() {
    let Some(book) = FontBook::from_system() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(book);
    let mut s = grey_surface(200, 100);
    draw_caption(&mut s, &caption("HHHH"), &mut engine, &mut Rasterizer::new()).unwrap();

    let grey = [128, 128, 128, 255];
    let mut reddish = 0;
    let mut whitish = 0;
    for y in 0..100 {
        for x in 0..200 {
            let px = s.pixel(x, y);
            if px == grey {
                continue;
            }
            // Nothing above the top anchor minus the stroke half-width.
            assert!(y >= 17, "ink at ({x},{y})");
            if px[0] > 200 && px[1] < 60 {
                reddish += 1;
            }
            if px[0] > 230 && px[1] > 230 && px[2] > 230 {
                whitish += 1;
            }
        }
    }
    assert!(reddish > 0, "fill colour present");
    assert!(whitish > 0, "stroke colour present");
    // Left and right halves of the canvas both carry ink: centred on x = 100.
    assert!((0..100).any(|x| (0..100).any(|y| s.pixel(x, y) != grey)));
    assert!((100..200).any(|x| (0..100).any(|y| s.pixel(x, y) != grey)));
}

#[test]
fn shadow_darkens_pixels_behind_the_stroke() {
    let Some(book) = FontBook::from_system() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(book);
    let mut plain = grey_surface(200, 100);
    let mut shadowed = grey_surface(200, 100);
    let mut spec = caption("HHHH");
    draw_caption(&mut plain, &spec, &mut engine, &mut Rasterizer::new()).unwrap();
    spec.shadow_blur_px = 6;
    draw_caption(&mut shadowed, &spec, &mut engine, &mut Rasterizer::new()).unwrap();

    let darker = plain
        .data()
        .chunks_exact(4)
        .zip(shadowed.data().chunks_exact(4))
        .filter(|(a, b)| b[0] < a[0] && b[1] <= a[1])
        .count();
    assert!(darker > 0);
}
