//! Caption state: font variants, placement, hit-testing and the auto-shrink pass.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::core::{Canvas, Point, Rect};
use crate::foundation::error::CutframeResult;

/// Auto-shrink never goes below this size.
pub const MIN_AUTO_SIZE_PX: u32 = 16;
/// Largest nominal caption size accepted from edits and documents.
pub const MAX_SIZE_PX: u32 = 1024;
/// Auto-shrink fits the caption into this share of the canvas width.
pub const AUTO_FIT_RATIO: f64 = 0.8;
/// Width of the white stroke drawn under the fill.
pub const STROKE_WIDTH_PX: f64 = 4.0;
/// Offset of the drop shadow behind the stroke.
pub const SHADOW_OFFSET: (f64, f64) = (2.0, 2.0);

/// Caption typeface family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontVariant {
    /// Pixel font rendered at 80% of the nominal size.
    #[default]
    Default,
    Orbitron,
    /// Rendered at 120% of the nominal size.
    Vt323,
    Monoton,
}

impl FontVariant {
    pub const ALL: [FontVariant; 4] = [Self::Default, Self::Orbitron, Self::Vt323, Self::Monoton];

    /// Pixel size actually used for layout, derived from the nominal `size_px`.
    pub fn render_size_px(self, size_px: u32) -> u32 {
        let size = u64::from(size_px);
        let scaled = match self {
            Self::Default => size * 4 / 5,
            Self::Vt323 => size * 6 / 5,
            Self::Orbitron | Self::Monoton => size,
        };
        u32::try_from(scaled).unwrap_or(u32::MAX)
    }

    fn family(self) -> (&'static str, &'static str) {
        match self {
            Self::Default => ("Press Start 2P", "cursive"),
            Self::Orbitron => ("Orbitron", "sans-serif"),
            Self::Vt323 => ("VT323", "monospace"),
            Self::Monoton => ("Monoton", "cursive"),
        }
    }

    pub fn is_bold(self) -> bool {
        !matches!(self, Self::Default)
    }

    /// CSS-style font shorthand for `size_px`, e.g. `bold 57px 'VT323', monospace`.
    pub fn font_css(self, size_px: u32) -> String {
        let (family, generic) = self.family();
        let weight = if self.is_bold() { "bold " } else { "" };
        format!(
            "{weight}{}px '{family}', {generic}",
            self.render_size_px(size_px)
        )
    }
}

impl fmt::Display for FontVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Orbitron => "orbitron",
            Self::Vt323 => "vt323",
            Self::Monoton => "monoton",
        })
    }
}

/// Measures the advance width of a single-line caption.
pub trait TextMetrics {
    /// Width in pixels of `text` laid out with `font` at `render_size_px`.
    fn measure_width(
        &mut self,
        text: &str,
        font: FontVariant,
        render_size_px: f32,
    ) -> CutframeResult<f64>;
}

/// Caption overlay parameters.
///
/// `position` is the top-centre anchor of the caption: text is centred on `position.x` and
/// its top edge sits at `position.y`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverlaySpec {
    pub enabled: bool,
    pub content: String,
    pub font: FontVariant,
    pub color: Color,
    pub size_px: u32,
    pub shadow_blur_px: u32,
    pub position: Point,
}

impl Default for TextOverlaySpec {
    fn default() -> Self {
        Self {
            enabled: false,
            content: "RETRO!".to_string(),
            font: FontVariant::Default,
            color: Color::rgb(0xff, 0x00, 0xcc),
            size_px: 48,
            shadow_blur_px: 4,
            position: Point::new(100.0, 40.0),
        }
    }
}

impl TextOverlaySpec {
    /// Whether anything is drawn. Blank content hides the caption even when enabled.
    pub fn is_visible(&self) -> bool {
        self.enabled && !self.content.trim().is_empty()
    }

    pub fn render_size_px(&self) -> u32 {
        self.font.render_size_px(self.size_px)
    }

    /// Set the nominal size, kept within `1..=MAX_SIZE_PX`.
    pub fn set_size_px(&mut self, size_px: u32) {
        self.size_px = size_px.clamp(1, MAX_SIZE_PX);
    }

    /// Measured caption width under the current font.
    pub fn measured_width(&self, metrics: &mut dyn TextMetrics) -> CutframeResult<f64> {
        let size = self.render_size_px();
        if size == 0 {
            return Ok(0.0);
        }
        metrics.measure_width(&self.content, self.font, size as f32)
    }

    /// Draggable region, or `None` while the caption is hidden.
    ///
    /// The box height is the nominal `size_px`, not the scaled render size.
    pub fn hit_box(&self, metrics: &mut dyn TextMetrics) -> CutframeResult<Option<Rect>> {
        if !self.is_visible() {
            return Ok(None);
        }
        let half = self.measured_width(metrics)? / 2.0;
        let Point { x, y } = self.position;
        Ok(Some(Rect::new(
            x - half,
            y,
            x + half,
            y + f64::from(self.size_px),
        )))
    }

    /// Inclusive containment test against [`Self::hit_box`].
    pub fn hit_test(&self, point: Point, metrics: &mut dyn TextMetrics) -> CutframeResult<bool> {
        Ok(self.hit_box(metrics)?.is_some_and(|r| {
            point.x >= r.x0 && point.x <= r.x1 && point.y >= r.y0 && point.y <= r.y1
        }))
    }

    /// Clamp `position` into `x ∈ [0, width]`, `y ∈ [0, height - size_px]`.
    pub fn clamp_position(&mut self, canvas: Canvas) {
        self.position = clamp_anchor(self.position, self.size_px, canvas);
    }

    pub fn set_position(&mut self, position: Point, canvas: Canvas) {
        self.position = clamp_anchor(position, self.size_px, canvas);
    }

    /// Shrink `size_px` so the caption fits [`AUTO_FIT_RATIO`] of `canvas_width`.
    ///
    /// Only ever reduces the size (floor, never below [`MIN_AUTO_SIZE_PX`]). Returns whether
    /// the size changed.
    pub fn auto_shrink(
        &mut self,
        canvas_width: u32,
        metrics: &mut dyn TextMetrics,
    ) -> CutframeResult<bool> {
        if !self.enabled {
            return Ok(false);
        }
        let limit = f64::from(canvas_width) * AUTO_FIT_RATIO;
        let width = self.measured_width(metrics)?;
        if width <= limit || width <= 0.0 {
            return Ok(false);
        }
        let suggested = (f64::from(self.size_px) * limit / width).floor();
        if suggested >= f64::from(self.size_px) {
            return Ok(false);
        }
        let next = (suggested.max(0.0) as u32).max(MIN_AUTO_SIZE_PX);
        if next >= self.size_px {
            return Ok(false);
        }
        tracing::debug!(from = self.size_px, to = next, "auto-shrinking caption");
        self.size_px = next;
        Ok(true)
    }
}

fn clamp_anchor(p: Point, size_px: u32, canvas: Canvas) -> Point {
    let max_y = (f64::from(canvas.height) - f64::from(size_px)).max(0.0);
    Point::new(
        p.x.clamp(0.0, f64::from(canvas.width)),
        p.y.clamp(0.0, max_y),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/text/overlay.rs"]
mod tests;
