use crate::foundation::color::Color;
use crate::foundation::error::CutframeResult;
use crate::render::blur::shadow_blur_in_place;
use crate::render::raster::Rasterizer;
use crate::render::surface::Surface;
use crate::text::layout::{ShapedText, TextBrushRgba8, TextLayoutEngine};
use crate::text::overlay::{SHADOW_OFFSET, STROKE_WIDTH_PX, TextOverlaySpec};

#[derive(Clone, Copy)]
enum GlyphPass {
    Fill,
    Stroke,
}

fn cpu_color(c: Color) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn draw_runs(
    ctx: &mut vello_cpu::RenderContext,
    shaped: &ShapedText,
    origin: (f64, f64),
    pass: GlyphPass,
) {
    ctx.set_transform(vello_cpu::kurbo::Affine::translate(origin));
    for line in shaped.layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            let builder = ctx
                .glyph_run(&shaped.font)
                .font_size(run.run().font_size());
            match pass {
                GlyphPass::Fill => builder.fill_glyphs(glyphs),
                GlyphPass::Stroke => builder.stroke_glyphs(glyphs),
            }
        }
    }
}

/// Draw the caption onto `surface`: blurred shadow of the stroke, white stroke, then fill.
///
/// Hidden captions (disabled or blank) draw nothing.
pub(crate) fn draw_caption(
    surface: &mut Surface,
    spec: &TextOverlaySpec,
    engine: &mut TextLayoutEngine,
    raster: &mut Rasterizer,
) -> CutframeResult<()> {
    if !spec.is_visible() {
        return Ok(());
    }
    let size = spec.render_size_px();
    if size == 0 {
        return Ok(());
    }

    let shaped = engine.layout(
        &spec.content,
        spec.font,
        size as f32,
        TextBrushRgba8::from(spec.color),
    )?;
    let origin = (spec.position.x - shaped.width() / 2.0, spec.position.y);
    let (w, h) = (surface.width(), surface.height());
    let stroke = vello_cpu::kurbo::Stroke::new(STROKE_WIDTH_PX);

    if spec.shadow_blur_px > 0 {
        let shadow_origin = (origin.0 + SHADOW_OFFSET.0, origin.1 + SHADOW_OFFSET.1);
        let mut shadow = raster.render_layer(w, h, |ctx| {
            ctx.set_stroke(stroke.clone());
            ctx.set_paint(cpu_color(Color::BLACK));
            draw_runs(ctx, &shaped, shadow_origin, GlyphPass::Stroke);
            Ok(())
        })?;
        shadow_blur_in_place(&mut shadow, w, h, spec.shadow_blur_px)?;
        surface.composite_over(&shadow)?;
    }

    let caption = raster.render_layer(w, h, |ctx| {
        ctx.set_stroke(stroke);
        ctx.set_paint(cpu_color(Color::WHITE));
        draw_runs(ctx, &shaped, origin, GlyphPass::Stroke);
        ctx.set_paint(cpu_color(spec.color));
        draw_runs(ctx, &shaped, origin, GlyphPass::Fill);
        Ok(())
    })?;
    surface.composite_over(&caption)
}

#[cfg(test)]
#[path = "../../tests/unit/text/draw.rs"]
mod tests;
