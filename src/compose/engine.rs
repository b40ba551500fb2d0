//! Layer orchestration: background, outline, foreground, caption.

use std::sync::Arc;

use crate::assets::bitmap::AlphaBitmap;
use crate::foundation::core::Canvas;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::render::background::{BackgroundSpec, paint_background};
use crate::render::boundary::{BoundaryMask, trace_boundary};
use crate::render::outline::{OutlineSpec, render_outline};
use crate::render::raster::Rasterizer;
use crate::render::surface::Surface;
use crate::text::draw::draw_caption;
use crate::text::layout::{FontBook, TextLayoutEngine};
use crate::text::overlay::TextOverlaySpec;

/// The active foreground image.
///
/// `live_alpha` marks a cut-out whose transparency is meaningful: only then is the outline
/// drawn and a transparent background left unpainted.
#[derive(Clone, Debug)]
pub struct Foreground {
    pub bitmap: Arc<AlphaBitmap>,
    pub live_alpha: bool,
}

impl Foreground {
    pub fn new(bitmap: Arc<AlphaBitmap>, live_alpha: bool) -> Self {
        Self { bitmap, live_alpha }
    }

    pub fn canvas(&self) -> Canvas {
        self.bitmap.canvas()
    }
}

/// Everything one recompute reads.
#[derive(Clone, Copy, Debug)]
pub struct CompositeInputs<'a> {
    pub foreground: &'a Foreground,
    pub background: &'a BackgroundSpec,
    pub outline: &'a OutlineSpec,
    pub text: &'a TextOverlaySpec,
}

/// Flattened result of one recompute, sized like the foreground.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeFrame {
    surface: Surface,
}

impl CompositeFrame {
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn canvas(&self) -> Canvas {
        self.surface.canvas()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Premultiplied pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.surface.pixel(x, y)
    }
}

struct CachedBoundary {
    bitmap: Arc<AlphaBitmap>,
    mask: BoundaryMask,
}

/// Produces [`CompositeFrame`]s. Owns the rasterizer, text shaping state and the boundary of
/// the last foreground seen.
pub struct CompositeEngine {
    raster: Rasterizer,
    text: TextLayoutEngine,
    boundary: Option<CachedBoundary>,
}

impl CompositeEngine {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            raster: Rasterizer::new(),
            text: TextLayoutEngine::new(fonts),
            boundary: None,
        }
    }

    /// Text measurement used for hit-testing and auto-shrink.
    pub fn text_engine(&mut self) -> &mut TextLayoutEngine {
        &mut self.text
    }

    fn boundary_for(&mut self, bitmap: &Arc<AlphaBitmap>) -> &BoundaryMask {
        let stale = self
            .boundary
            .as_ref()
            .is_none_or(|c| !Arc::ptr_eq(&c.bitmap, bitmap));
        if stale {
            self.boundary = None;
        }
        &self
            .boundary
            .get_or_insert_with(|| CachedBoundary {
                bitmap: Arc::clone(bitmap),
                mask: trace_boundary(bitmap),
            })
            .mask
    }

    /// Build a fresh frame from `inputs`.
    ///
    /// Any failure is reported as [`CutframeError::CanvasOperation`].
    #[tracing::instrument(
        skip_all,
        fields(
            width = inputs.foreground.bitmap.width(),
            height = inputs.foreground.bitmap.height(),
            live_alpha = inputs.foreground.live_alpha,
        )
    )]
    pub fn recompute(&mut self, inputs: CompositeInputs<'_>) -> CutframeResult<CompositeFrame> {
        self.compose(inputs).map_err(|e| match e {
            CutframeError::CanvasOperation(_) => e,
            other => CutframeError::canvas(other.to_string()),
        })
    }

    fn compose(&mut self, inputs: CompositeInputs<'_>) -> CutframeResult<CompositeFrame> {
        let fg = inputs.foreground;
        let mut surface = Surface::new(fg.bitmap.width(), fg.bitmap.height())?;

        if !(inputs.background.is_transparent() && fg.live_alpha) {
            paint_background(&mut surface, inputs.background, &mut self.raster)?;
        }

        if inputs.outline.is_enabled() && fg.live_alpha {
            let bitmap = Arc::clone(&fg.bitmap);
            let mask = self.boundary_for(&bitmap);
            render_outline(&mut surface, mask, inputs.outline)?;
        }

        surface.draw_bitmap(&fg.bitmap);

        draw_caption(&mut surface, inputs.text, &mut self.text, &mut self.raster)?;

        Ok(CompositeFrame { surface })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/engine.rs"]
mod tests;
