use std::time::Duration;

use super::*;
use crate::compose::debounce::DEBOUNCE_QUIET;
use crate::compose::notice::NoticeKind;
use crate::text::overlay::MAX_SIZE_PX;

fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    AlphaBitmap::filled(w, h, rgba).unwrap().to_png().unwrap()
}

fn cutout_png(w: u32, h: u32) -> Vec<u8> {
    AlphaBitmap::from_fn(w, h, |x, _| {
        if x < w / 2 {
            [0, 0, 255, 255]
        } else {
            [0, 0, 0, 0]
        }
    })
    .unwrap()
    .to_png()
    .unwrap()
}

fn loaded(w: u32, h: u32) -> (EditorSession, Instant) {
    let t0 = Instant::now();
    let mut s = EditorSession::new(FontBook::new());
    s.load_foreground(&png(w, h, [255, 0, 0, 255]), Some("image/png"), t0)
        .unwrap();
    (s, t0)
}

fn notice_text(s: &mut EditorSession, now: Instant) -> Option<(NoticeKind, String)> {
    s.notice(now).map(|n| (n.kind, n.text.clone()))
}

#[test]
fn upload_activates_foreground_and_resets_caption() {
    let (mut s, t0) = loaded(300, 200);
    let frame = s.frame().unwrap();
    assert_eq!((frame.width(), frame.height()), (300, 200));
    assert_eq!(s.text().position, Point::new(150.0, TEXT_RESET_Y));
    assert_eq!(s.generation(), 1);
    assert!(!s.active_foreground().unwrap().live_alpha);
    assert_eq!(
        notice_text(&mut s, t0),
        Some((NoticeKind::Success, MSG_UPLOADED.to_string()))
    );
}

#[test]
fn caption_reset_is_clamped_on_short_images() {
    let (s, _) = loaded(40, 60);
    // 60 - 48 = 12 is the lowest allowed top edge.
    assert_eq!(s.text().position, Point::new(20.0, 12.0));
}

#[test]
fn rejected_upload_changes_nothing() {
    let t0 = Instant::now();
    let mut s = EditorSession::new(FontBook::new());
    let err = s
        .load_foreground(&png(4, 4, [0, 0, 0, 255]), Some("image/bmp"), t0)
        .unwrap_err();
    assert!(matches!(err, CutframeError::Validation(_)));
    assert!(s.frame().is_none());
    assert_eq!(s.generation(), 0);
    assert_eq!(
        notice_text(&mut s, t0),
        Some((
            NoticeKind::Error,
            "Please upload a valid image file (JPG, PNG, GIF, or WebP)".to_string()
        ))
    );
}

#[test]
fn undecodable_upload_keeps_previous_image() {
    let (mut s, t0) = loaded(10, 10);
    let before = s.frame().cloned();
    let mut corrupt = png(10, 10, [0, 0, 0, 255]);
    corrupt.truncate(30);
    let err = s.load_foreground(&corrupt, Some("image/png"), t0).unwrap_err();
    assert!(matches!(err, CutframeError::Decode(_)));
    assert_eq!(s.frame().cloned(), before);
    assert_eq!(s.generation(), 1);
    assert_eq!(
        notice_text(&mut s, t0).unwrap().1,
        "Failed to load image. Please try a different file."
    );
}

#[test]
fn gradient_parameters_survive_variant_switches() {
    let (mut s, t0) = loaded(20, 20);
    s.apply(Edit::BackgroundKind(BackgroundKind::Gradient), t0);
    s.apply(Edit::GradientStart(Color::rgb(1, 2, 3)), t0);
    s.apply(Edit::GradientEnd(Color::rgb(4, 5, 6)), t0);
    s.apply(Edit::BackgroundKind(BackgroundKind::Color), t0);
    s.apply(Edit::BackgroundColor(Color::rgb(9, 9, 9)), t0);
    s.apply(Edit::BackgroundKind(BackgroundKind::Gradient), t0);

    let g = s.background().gradient;
    assert_eq!(g.start, Color::rgb(1, 2, 3));
    assert_eq!(g.end, Color::rgb(4, 5, 6));
    assert_eq!(s.background().color, Color::rgb(9, 9, 9));
}

#[test]
fn hex_entry_requires_exact_six_digit_form() {
    let (mut s, t0) = loaded(4, 4);
    s.apply(Edit::BackgroundHex("#12AbEf".to_string()), t0);
    assert_eq!(s.background().color, Color::rgb(0x12, 0xab, 0xef));
    for bad in ["12abef", "#12abe", "#12abefff", "#12abeg", ""] {
        s.apply(Edit::BackgroundHex(bad.to_string()), t0);
        assert_eq!(s.background().color, Color::rgb(0x12, 0xab, 0xef));
    }
}

#[test]
fn slider_edits_are_coalesced_until_quiet() {
    let t0 = Instant::now();
    let mut s = EditorSession::new(FontBook::new());
    s.load_foreground(&cutout_png(20, 20), None, t0).unwrap();
    s.set_foreground(
        crate::assets::decode::decode_image(&cutout_png(20, 20)).unwrap(),
        true,
        t0,
    );
    s.apply(Edit::BackgroundKind(BackgroundKind::Transparent), t0);
    let before = s.frame().cloned().unwrap();

    for (i, w) in [1u32, 2, 3].into_iter().enumerate() {
        s.apply(Edit::OutlineWidth(w), t0 + Duration::from_millis(30 * i as u64));
    }
    assert_eq!(s.frame(), Some(&before));
    assert!(!s.tick(t0 + Duration::from_millis(100)));
    assert_eq!(
        s.next_deadline(),
        Some(t0 + Duration::from_millis(60) + DEBOUNCE_QUIET)
    );

    assert!(s.tick(t0 + Duration::from_millis(160)));
    assert_eq!(s.outline().width_px, 3);
    assert_ne!(s.frame(), Some(&before));
    assert_eq!(s.next_deadline(), None);
}

#[test]
fn text_size_edit_keeps_caption_inside_canvas() {
    let (mut s, t0) = loaded(100, 100);
    s.apply(Edit::TextSize(90), t0);
    assert_eq!(s.text().size_px, 90);
    assert_eq!(s.text().position.y, 10.0);
}

#[test]
fn extreme_text_size_is_capped() {
    let (mut s, t0) = loaded(100, 100);
    s.apply(Edit::TextEnabled(true), t0);
    s.apply(Edit::TextSize(u32::MAX), t0);
    s.tick(t0 + Duration::from_secs(1));
    assert_eq!(s.text().size_px, MAX_SIZE_PX);
    assert_eq!(s.text().position.y, 0.0);
    assert_eq!(s.cursor_at(Point::new(50.0, 50.0)), CursorHint::Default);

    s.apply(Edit::TextSize(0), t0);
    assert_eq!(s.text().size_px, 1);
}

#[test]
fn blank_caption_draws_nothing_and_never_hits() {
    let (mut s, t0) = loaded(50, 50);
    let plain = s.frame().cloned();
    s.apply(Edit::TextEnabled(true), t0);
    s.apply(Edit::TextContent("   ".to_string()), t0);
    assert_eq!(s.frame().cloned(), plain);
    assert!(!s.begin_drag(s.text().position));
    assert_eq!(s.cursor_at(s.text().position), CursorHint::Default);
}

#[test]
fn removal_round_trip_activates_cutout() {
    let (mut s, t0) = loaded(8, 8);
    let ticket = s.begin_removal(t0).unwrap();
    assert!(s.is_removal_pending());
    let request = crate::assets::decode::decode_image(ticket.png()).unwrap();
    assert_eq!(request.pixel(0, 0), [255, 0, 0, 255]);

    assert!(s.finish_removal(ticket, Ok(cutout_png(8, 8)), t0).unwrap());
    assert!(!s.is_removal_pending());
    let fg = s.active_foreground().unwrap();
    assert!(fg.live_alpha);
    assert_eq!(fg.bitmap.alpha(7, 0), 0);
    assert_eq!(s.generation(), 2);
    assert_eq!(notice_text(&mut s, t0).unwrap().1, MSG_REMOVED);
}

#[test]
fn removal_response_may_exceed_upload_byte_limit() {
    use crate::assets::decode::MAX_SOURCE_BYTES;

    let (mut s, t0) = loaded(8, 8);
    // Incompressible pixels keep the encoded cut-out above the upload limit.
    let mut state = 0x2545_f491_u32;
    let noisy = AlphaBitmap::from_fn(1800, 1600, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state.to_le_bytes()
    })
    .unwrap()
    .to_png()
    .unwrap();
    assert!(noisy.len() > MAX_SOURCE_BYTES);

    let ticket = s.begin_removal(t0).unwrap();
    assert!(s.finish_removal(ticket, Ok(noisy), t0).unwrap());
    let fg = s.active_foreground().unwrap();
    assert!(fg.live_alpha);
    assert_eq!((fg.bitmap.width(), fg.bitmap.height()), (1800, 1600));
}

#[test]
fn removal_without_image_or_while_pending_is_rejected() {
    let t0 = Instant::now();
    let mut empty = EditorSession::new(FontBook::new());
    let err = empty.begin_removal(t0).unwrap_err();
    assert!(matches!(err, CutframeError::Validation(ref m) if m == MSG_NO_IMAGE));
    assert_eq!(notice_text(&mut empty, t0).unwrap().1, MSG_NO_IMAGE);

    let (mut s, t0) = loaded(8, 8);
    let first = s.begin_removal(t0).unwrap();
    let err = s.begin_removal(t0).unwrap_err();
    assert!(matches!(err, CutframeError::Validation(ref m) if m == MSG_REMOVAL_PENDING));

    s.finish_removal(first, Err(CutframeError::removal("boom")), t0)
        .unwrap_err();
    assert!(s.begin_removal(t0).is_ok());
}

#[test]
fn stale_removal_response_is_discarded() {
    let (mut s, t0) = loaded(8, 8);
    let ticket = s.begin_removal(t0).unwrap();
    s.load_foreground(&png(6, 6, [0, 255, 0, 255]), Some("image/png"), t0)
        .unwrap();

    assert!(!s.finish_removal(ticket, Ok(cutout_png(8, 8)), t0).unwrap());
    let fg = s.active_foreground().unwrap();
    assert!(!fg.live_alpha);
    assert_eq!(fg.bitmap.width(), 6);
    assert!(!s.is_removal_pending());
}

#[test]
fn removal_failure_keeps_prior_foreground() {
    let (mut s, t0) = loaded(8, 8);
    let ticket = s.begin_removal(t0).unwrap();
    let err = s
        .finish_removal(ticket, Err(CutframeError::removal("API key invalid")), t0)
        .unwrap_err();
    assert!(matches!(err, CutframeError::Removal(_)));
    assert!(!s.active_foreground().unwrap().live_alpha);
    assert_eq!(
        notice_text(&mut s, t0),
        Some((
            NoticeKind::Error,
            "Error removing background: API key invalid".to_string()
        ))
    );

    // Undecodable success bodies are removal failures too.
    let ticket = s.begin_removal(t0).unwrap();
    let err = s.finish_removal(ticket, Ok(b"junk".to_vec()), t0).unwrap_err();
    assert!(matches!(err, CutframeError::Removal(_)));
}

#[test]
fn client_points_map_through_display_scale() {
    let (s, _) = loaded(200, 100);
    let display = Rect::new(10.0, 20.0, 110.0, 70.0);
    assert_eq!(
        s.map_client_point(Point::new(60.0, 45.0), display),
        Some(Point::new(100.0, 50.0))
    );
    assert_eq!(s.map_client_point(Point::ZERO, Rect::ZERO), None);
}

#[test]
fn export_requires_a_composite() {
    let t0 = Instant::now();
    let mut s = EditorSession::new(FontBook::new());
    let err = s.export(Utc::now(), t0).unwrap_err();
    assert!(matches!(err, CutframeError::Validation(_)));
    assert_eq!(notice_text(&mut s, t0).unwrap().1, MSG_NOTHING_TO_EXPORT);

    let (mut s, t0) = loaded(3, 3);
    let out = s.export(Utc::now(), t0).unwrap();
    assert!(out.file_name.starts_with("edited-image-"));
    assert_eq!(notice_text(&mut s, t0).unwrap().1, MSG_DOWNLOADED);
}

#[test]
fn export_flushes_pending_edits() {
    let (mut s, t0) = loaded(4, 4);
    s.set_foreground(
        crate::assets::decode::decode_image(&cutout_png(4, 4)).unwrap(),
        true,
        t0,
    );
    s.apply(Edit::BackgroundKind(BackgroundKind::Transparent), t0);
    s.apply(Edit::OutlineWidth(2), t0);
    let out = s.export(Utc::now(), t0).unwrap();
    let decoded = crate::assets::decode::decode_image(&out.png).unwrap();
    // Outline paints into the transparent half next to the opaque edge.
    assert!(decoded.alpha(2, 1) > 0);
}

#[test]
fn drag_moves_caption_with_grab_offset() {
    let Some(fonts) = FontBook::from_system() else {
        return;
    };
    let t0 = Instant::now();
    let mut s = EditorSession::new(fonts);
    s.load_foreground(&png(400, 300, [200, 200, 200, 255]), None, t0)
        .unwrap();
    s.apply(Edit::TextEnabled(true), t0);
    s.apply(Edit::TextContent("DRAG".to_string()), t0);
    let start = s.text().position;

    let grab = start + Vec2::new(0.0, 10.0);
    assert_eq!(s.cursor_at(grab), CursorHint::Grab);
    assert!(s.begin_drag(grab));
    assert!(s.is_dragging());
    assert_eq!(s.cursor_at(Point::ZERO), CursorHint::Grabbing);

    assert!(s.drag_to(grab + Vec2::new(30.0, 40.0), t0));
    assert_eq!(s.text().position, start + Vec2::new(30.0, 40.0));

    // Clamped at the bottom edge.
    assert!(s.drag_to(Point::new(grab.x, 10_000.0), t0));
    assert_eq!(s.text().position.y, 300.0 - 48.0);

    assert!(s.end_drag());
    assert!(!s.is_dragging());
    assert!(!s.drag_to(Point::ZERO, t0));
    assert_eq!(s.cursor_at(Point::new(0.0, 299.0)), CursorHint::Default);
    assert!(!s.cancel_drag());
}

#[test]
fn content_edit_schedules_auto_shrink() {
    let Some(fonts) = FontBook::from_system() else {
        return;
    };
    let t0 = Instant::now();
    let mut s = EditorSession::new(fonts);
    s.load_foreground(&png(200, 200, [200, 200, 200, 255]), None, t0)
        .unwrap();
    s.apply(Edit::TextEnabled(true), t0);
    s.apply(Edit::TextFont(FontVariant::Orbitron), t0);
    s.apply(
        Edit::TextContent("A VERY LONG CAPTION THAT OVERFLOWS".to_string()),
        t0,
    );
    assert_eq!(s.text().size_px, 48);

    assert!(s.tick(t0 + DEBOUNCE_QUIET));
    assert!(s.text().size_px < 48);
    assert!(s.text().size_px >= crate::text::overlay::MIN_AUTO_SIZE_PX);
}

#[test]
fn auto_shrink_is_skipped_while_caption_disabled() {
    let (mut s, t0) = loaded(50, 50);
    s.apply(Edit::TextContent("W".repeat(200)), t0);
    assert!(!s.tick(t0 + DEBOUNCE_QUIET));
    assert_eq!(s.text().size_px, 48);
}

#[test]
fn background_image_upload_failures_use_dedicated_notice() {
    let (mut s, t0) = loaded(5, 5);
    let err = s
        .set_background_image(b"\x89PNG\r\n\x1a\n broken", Some("image/png"), t0)
        .unwrap_err();
    assert!(matches!(err, CutframeError::Decode(_)));
    assert_eq!(notice_text(&mut s, t0).unwrap().1, MSG_BG_IMAGE_FAILED);

    s.set_background_image(&png(10, 2, [0, 255, 0, 255]), Some("image/png"), t0)
        .unwrap();
    assert!(s.background().image.is_some());
}
