use crate::foundation::error::CutframeResult;
use crate::render::surface::pixmap_dims;

/// Reusable `vello_cpu` render context for vector and glyph rasterization.
///
/// Layers are rendered into fresh transparent pixmaps and handed back as premultiplied bytes;
/// compositing onto the output surface happens on the CPU side.
#[derive(Default)]
pub(crate) struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl Rasterizer {
    pub(crate) fn new() -> Self {
        Self { ctx: None }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> CutframeResult<R>,
    ) -> CutframeResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }

    /// Run `draw` against a cleared context and return the rendered layer
    /// (premultiplied RGBA8, `width * height * 4` bytes).
    pub(crate) fn render_layer(
        &mut self,
        width: u32,
        height: u32,
        draw: impl FnOnce(&mut vello_cpu::RenderContext) -> CutframeResult<()>,
    ) -> CutframeResult<Vec<u8>> {
        let (w, h) = pixmap_dims(width, height)?;
        self.with_ctx_mut(w, h, |ctx| {
            draw(ctx)?;
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(pixmap.data_as_u8_slice().to_vec())
        })
    }
}
