//! Editor session: owns the active foreground, every spec, the latest composite and the
//! timers that gate recomputes.
//!
//! Failures are caught at the operation that introduced them, logged, turned into a notice and
//! returned; the session's prior state is kept in every failure case.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::assets::bitmap::AlphaBitmap;
use crate::assets::decode::{decode_image, validate_input};
use crate::compose::debounce::Debouncer;
use crate::compose::engine::{CompositeEngine, CompositeFrame, CompositeInputs, Foreground};
use crate::compose::notice::{Notice, NoticeBoard};
use crate::export::{ExportedImage, export_png};
use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Point, Rect, Vec2};
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::removal::{BackgroundRemover, RemovalTicket};
use crate::render::background::{BackgroundConfig, BackgroundKind, GradientKind};
use crate::render::outline::OutlineSpec;
use crate::text::layout::FontBook;
use crate::text::overlay::{FontVariant, TextOverlaySpec};

/// Vertical caption position applied whenever a new foreground becomes active.
pub const TEXT_RESET_Y: f64 = 50.0;

pub const MSG_UPLOADED: &str = "Image uploaded successfully!";
pub const MSG_REMOVED: &str = "Background removed successfully!";
pub const MSG_NO_IMAGE: &str = "Please upload an image first";
pub const MSG_REMOVAL_PENDING: &str = "Background removal is already in progress";
pub const MSG_BG_IMAGE_FAILED: &str = "Failed to load background image";
pub const MSG_NOTHING_TO_EXPORT: &str = "No image to download";
pub const MSG_DOWNLOADED: &str = "Image downloaded successfully!";
pub const MSG_DOWNLOAD_FAILED: &str = "Failed to download image. Please try again.";

/// Pointer feedback for the composite view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Grab,
    Grabbing,
}

/// A single user edit.
#[derive(Clone, Debug, PartialEq)]
pub enum Edit {
    OutlineWidth(u32),
    OutlineColor(Color),
    BackgroundKind(BackgroundKind),
    BackgroundColor(Color),
    /// Free-form hex entry; applied only when it is exactly `#RRGGBB`.
    BackgroundHex(String),
    FixedColor(Color),
    GradientKind(GradientKind),
    GradientStart(Color),
    GradientEnd(Color),
    TextEnabled(bool),
    TextContent(String),
    TextFont(FontVariant),
    TextColor(Color),
    TextSize(u32),
    TextShadow(u32),
}

impl Edit {
    /// Slider-style edits that arrive in bursts and are coalesced.
    pub fn is_continuous(&self) -> bool {
        matches!(
            self,
            Self::OutlineWidth(_) | Self::TextSize(_) | Self::TextShadow(_)
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct DragState {
    grab_offset: Vec2,
}

/// Single-threaded editing state plus the engine that renders it.
pub struct EditorSession {
    engine: CompositeEngine,
    original: Option<Arc<AlphaBitmap>>,
    processed: Option<Arc<AlphaBitmap>>,
    generation: u64,
    background: BackgroundConfig,
    outline: OutlineSpec,
    text: TextOverlaySpec,
    frame: Option<CompositeFrame>,
    recompute_timer: Debouncer,
    shrink_timer: Debouncer,
    drag: Option<DragState>,
    pending_removal: Option<u64>,
    notices: NoticeBoard,
}

impl EditorSession {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            engine: CompositeEngine::new(fonts),
            original: None,
            processed: None,
            generation: 0,
            background: BackgroundConfig::default(),
            outline: OutlineSpec::default(),
            text: TextOverlaySpec::default(),
            frame: None,
            recompute_timer: Debouncer::default(),
            shrink_timer: Debouncer::default(),
            drag: None,
            pending_removal: None,
            notices: NoticeBoard::default(),
        }
    }

    pub fn background(&self) -> &BackgroundConfig {
        &self.background
    }

    pub fn outline(&self) -> &OutlineSpec {
        &self.outline
    }

    pub fn text(&self) -> &TextOverlaySpec {
        &self.text
    }

    /// Latest composite, if a foreground is loaded.
    pub fn frame(&self) -> Option<&CompositeFrame> {
        self.frame.as_ref()
    }

    /// Bumped whenever the active foreground is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The processed cut-out when present, else the uploaded image.
    pub fn active_foreground(&self) -> Option<Foreground> {
        match (&self.processed, &self.original) {
            (Some(p), _) => Some(Foreground::new(Arc::clone(p), true)),
            (None, Some(o)) => Some(Foreground::new(Arc::clone(o), false)),
            (None, None) => None,
        }
    }

    pub fn canvas(&self) -> Option<Canvas> {
        self.active_foreground().map(|fg| fg.canvas())
    }

    pub fn is_removal_pending(&self) -> bool {
        self.pending_removal.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Live notice at `now`.
    pub fn notice(&mut self, now: Instant) -> Option<&Notice> {
        self.notices.current(now)
    }

    /// Earliest pending timer deadline, for the caller's event loop.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.recompute_timer.deadline(), self.shrink_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn fail<T>(&mut self, err: CutframeError, now: Instant) -> CutframeResult<T> {
        tracing::warn!(error = %err, "editor operation failed");
        self.notices.error(err.notice_text(), now);
        Err(err)
    }

    /// Rebuild the composite immediately. A failure keeps the previous frame.
    fn recompute_now(&mut self, now: Instant) -> bool {
        self.recompute_timer.cancel();
        let Some(fg) = self.active_foreground() else {
            return false;
        };
        let background = self.background.spec();
        let result = self.engine.recompute(CompositeInputs {
            foreground: &fg,
            background: &background,
            outline: &self.outline,
            text: &self.text,
        });
        match result {
            Ok(frame) => {
                self.frame = Some(frame);
                true
            }
            Err(err) => {
                let _ = self.fail::<()>(err, now);
                false
            }
        }
    }

    fn activate(&mut self, now: Instant) {
        self.generation += 1;
        self.drag = None;
        if let Some(canvas) = self.canvas() {
            let anchor = Point::new(f64::from(canvas.width) / 2.0, TEXT_RESET_Y);
            self.text.set_position(anchor, canvas);
        }
        self.recompute_now(now);
    }

    /// Validate, decode and activate a newly uploaded image. Any processed cut-out is dropped.
    #[tracing::instrument(skip(self, bytes, now), fields(len = bytes.len()))]
    pub fn load_foreground(
        &mut self,
        bytes: &[u8],
        media_type: Option<&str>,
        now: Instant,
    ) -> CutframeResult<()> {
        let decoded = validate_input(bytes, media_type).and_then(|_| decode_image(bytes));
        let bitmap = match decoded {
            Ok(b) => b,
            Err(err) => return self.fail(err, now),
        };
        self.original = Some(Arc::new(bitmap));
        self.processed = None;
        self.activate(now);
        self.notices.success(MSG_UPLOADED, now);
        Ok(())
    }

    /// Validate and decode a background image and recompute.
    pub fn set_background_image(
        &mut self,
        bytes: &[u8],
        media_type: Option<&str>,
        now: Instant,
    ) -> CutframeResult<()> {
        if let Err(err) = validate_input(bytes, media_type) {
            return self.fail(err, now);
        }
        let bitmap = match decode_image(bytes) {
            Ok(b) => b,
            Err(err) => {
                tracing::warn!(error = %err, "background image rejected");
                self.notices.error(MSG_BG_IMAGE_FAILED, now);
                return Err(err);
            }
        };
        self.background.image = Some(Arc::new(bitmap));
        self.recompute_now(now);
        Ok(())
    }

    /// Apply an edit. Continuous edits recompute after the quiet period, the rest immediately.
    pub fn apply(&mut self, edit: Edit, now: Instant) {
        let continuous = edit.is_continuous();
        match edit {
            Edit::OutlineWidth(w) => self.outline.width_px = w,
            Edit::OutlineColor(c) => self.outline.color = c,
            Edit::BackgroundKind(k) => self.background.kind = k,
            Edit::BackgroundColor(c) => self.background.color = c,
            Edit::BackgroundHex(hex) => match Color::parse_strict_hex6(&hex) {
                Some(c) => self.background.color = c,
                None => return,
            },
            Edit::FixedColor(c) => self.background.fixed_color = c,
            Edit::GradientKind(k) => self.background.gradient.kind = k,
            Edit::GradientStart(c) => self.background.gradient.start = c,
            Edit::GradientEnd(c) => self.background.gradient.end = c,
            Edit::TextEnabled(on) => self.text.enabled = on,
            Edit::TextContent(s) => {
                self.text.content = s;
                self.shrink_timer.schedule(now);
            }
            Edit::TextFont(f) => self.text.font = f,
            Edit::TextColor(c) => self.text.color = c,
            Edit::TextSize(px) => {
                self.text.set_size_px(px);
                if let Some(canvas) = self.canvas() {
                    self.text.clamp_position(canvas);
                }
            }
            Edit::TextShadow(px) => self.text.shadow_blur_px = px,
        }

        if continuous {
            self.recompute_timer.schedule(now);
        } else {
            self.recompute_now(now);
        }
    }

    /// Run due timers. Returns whether a recompute happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut dirty = self.recompute_timer.fire(now);
        if self.shrink_timer.fire(now) && self.text.enabled {
            dirty |= self.run_auto_shrink(now);
        }
        if dirty {
            tracing::debug!("flushing coalesced edits");
            return self.recompute_now(now);
        }
        false
    }

    fn run_auto_shrink(&mut self, now: Instant) -> bool {
        let Some(canvas) = self.canvas() else {
            return false;
        };
        match self
            .text
            .auto_shrink(canvas.width, self.engine.text_engine())
        {
            Ok(changed) => changed,
            Err(err) => {
                let _ = self.fail::<()>(CutframeError::canvas(err.to_string()), now);
                false
            }
        }
    }

    /// Start a background-removal request for the uploaded image.
    ///
    /// Only one request may be outstanding.
    pub fn begin_removal(&mut self, now: Instant) -> CutframeResult<RemovalTicket> {
        let Some(original) = self.original.clone() else {
            return self.fail(CutframeError::validation(MSG_NO_IMAGE), now);
        };
        if self.pending_removal.is_some() {
            return self.fail(CutframeError::validation(MSG_REMOVAL_PENDING), now);
        }
        let png = match original.to_png() {
            Ok(png) => png,
            Err(err) => return self.fail(CutframeError::canvas(err.to_string()), now),
        };
        self.pending_removal = Some(self.generation);
        Ok(RemovalTicket::new(self.generation, png))
    }

    /// Apply the collaborator's answer to `ticket`.
    ///
    /// Returns `Ok(false)` when the foreground changed since the request was issued; the
    /// response is then dropped without touching any state.
    #[tracing::instrument(skip_all, fields(ticket = ticket.generation(), current = self.generation))]
    pub fn finish_removal(
        &mut self,
        ticket: RemovalTicket,
        response: CutframeResult<Vec<u8>>,
        now: Instant,
    ) -> CutframeResult<bool> {
        if self.pending_removal == Some(ticket.generation()) {
            self.pending_removal = None;
        }
        if ticket.generation() != self.generation {
            tracing::debug!("discarding stale removal response");
            return Ok(false);
        }

        let bytes = match response {
            Ok(b) => b,
            Err(err @ CutframeError::Removal(_)) => return self.fail(err, now),
            Err(other) => return self.fail(CutframeError::removal(other.to_string()), now),
        };
        let bitmap = match decode_image(&bytes) {
            Ok(b) => b,
            Err(err) => return self.fail(CutframeError::removal(err.to_string()), now),
        };

        self.processed = Some(Arc::new(bitmap));
        self.activate(now);
        self.notices.success(MSG_REMOVED, now);
        Ok(true)
    }

    /// Run a removal round-trip synchronously through `remover`.
    pub fn remove_background(
        &mut self,
        remover: &mut dyn BackgroundRemover,
        now: Instant,
    ) -> CutframeResult<bool> {
        let ticket = self.begin_removal(now)?;
        let response = remover.remove_background(ticket.png());
        self.finish_removal(ticket, response, now)
    }

    fn caption_hit(&mut self, point: Point) -> bool {
        match self.text.hit_test(point, self.engine.text_engine()) {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(error = %err, "caption hit-test failed");
                false
            }
        }
    }

    /// Start dragging the caption if `point` (canvas coordinates) is on it.
    pub fn begin_drag(&mut self, point: Point) -> bool {
        if self.canvas().is_none() || !self.caption_hit(point) {
            return false;
        }
        self.drag = Some(DragState {
            grab_offset: point - self.text.position,
        });
        true
    }

    /// Move a dragged caption so the grab point follows `point`, then recompute.
    pub fn drag_to(&mut self, point: Point, now: Instant) -> bool {
        let (Some(drag), Some(canvas)) = (self.drag, self.canvas()) else {
            return false;
        };
        self.text.set_position(point - drag.grab_offset, canvas);
        self.recompute_now(now)
    }

    /// Finish a drag, keeping the caption where it is.
    pub fn end_drag(&mut self) -> bool {
        self.drag.take().is_some()
    }

    /// Abandon a drag (Escape). The caption keeps its last dragged position.
    pub fn cancel_drag(&mut self) -> bool {
        self.end_drag()
    }

    pub fn cursor_at(&mut self, point: Point) -> CursorHint {
        if self.drag.is_some() {
            CursorHint::Grabbing
        } else if self.canvas().is_some() && self.caption_hit(point) {
            CursorHint::Grab
        } else {
            CursorHint::Default
        }
    }

    /// Map a pointer position in display space to canvas pixels, given where the canvas is
    /// displayed.
    pub fn map_client_point(&self, client: Point, display: Rect) -> Option<Point> {
        let canvas = self.canvas()?;
        if display.width() <= 0.0 || display.height() <= 0.0 {
            return None;
        }
        let sx = f64::from(canvas.width) / display.width();
        let sy = f64::from(canvas.height) / display.height();
        Some(Point::new(
            (client.x - display.x0) * sx,
            (client.y - display.y0) * sy,
        ))
    }

    /// Encode the current composite for download.
    ///
    /// Pending debounced edits are flushed first so the export matches the latest state.
    pub fn export(&mut self, at: DateTime<Utc>, now: Instant) -> CutframeResult<ExportedImage> {
        if self.recompute_timer.is_pending() {
            self.recompute_now(now);
        }
        let Some(frame) = self.frame.as_ref() else {
            return self.fail(CutframeError::validation(MSG_NOTHING_TO_EXPORT), now);
        };
        match export_png(frame, at) {
            Ok(out) => {
                self.notices.success(MSG_DOWNLOADED, now);
                Ok(out)
            }
            Err(err) => {
                tracing::warn!(error = %err, "export failed");
                self.notices.error(MSG_DOWNLOAD_FAILED, now);
                Err(err)
            }
        }
    }

    /// Replace every spec at once, then recompute. Used when loading an edit document.
    pub fn configure(
        &mut self,
        background: BackgroundConfig,
        outline: OutlineSpec,
        text: TextOverlaySpec,
        now: Instant,
    ) {
        self.background = background;
        self.outline = outline;
        self.text = text;
        self.text.set_size_px(self.text.size_px);
        if let Some(canvas) = self.canvas() {
            self.text.clamp_position(canvas);
        }
        self.recompute_now(now);
    }

    /// Activate an already decoded foreground, bypassing upload validation.
    ///
    /// `cutout` marks its alpha as live, as if it came back from background removal.
    pub fn set_foreground(&mut self, bitmap: AlphaBitmap, cutout: bool, now: Instant) {
        let bitmap = Arc::new(bitmap);
        if cutout {
            self.original = Some(Arc::clone(&bitmap));
            self.processed = Some(bitmap);
        } else {
            self.original = Some(bitmap);
            self.processed = None;
        }
        self.activate(now);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/session.rs"]
mod tests;
