//! Background variants and their rasterization.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::assets::bitmap::AlphaBitmap;
use crate::foundation::color::Color;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::CutframeResult;
use crate::foundation::math::lerp_u8;
use crate::render::raster::Rasterizer;
use crate::render::surface::{Surface, bitmap_paint};

/// Checkerboard cell edge, in pixels.
pub const CHECKER_CELL_PX: u32 = 20;
/// Checkerboard shade for even-parity cells.
pub const CHECKER_LIGHT: Color = Color::rgb(0xff, 0xff, 0xff);
/// Checkerboard shade for odd-parity cells.
pub const CHECKER_DARK: Color = Color::rgb(0xf0, 0xf0, 0xf0);
/// Default for the fixed-colour variant.
pub const DEFAULT_FIXED_COLOR: Color = Color::rgb(0x25, 0x63, 0xeb);
/// Fill used by the image variant while no image is set.
pub const IMAGE_FALLBACK: Color = Color::WHITE;

/// Which background variant is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundKind {
    Transparent,
    #[default]
    Color,
    Fixed,
    Gradient,
    Image,
}

/// Gradient geometry family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    #[default]
    Linear,
    Radial,
}

/// Two-stop gradient parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradientSpec {
    #[serde(default)]
    pub kind: GradientKind,
    pub start: Color,
    pub end: Color,
}

impl Default for GradientSpec {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            start: Color::rgb(0x66, 0x7e, 0xea),
            end: Color::rgb(0x76, 0x4b, 0xa2),
        }
    }
}

/// The active background, as consumed by the painter.
#[derive(Clone, Debug)]
pub enum BackgroundSpec {
    Transparent,
    SolidColor(Color),
    FixedColor(Color),
    Gradient(GradientSpec),
    /// `None` paints [`IMAGE_FALLBACK`].
    Image(Option<Arc<AlphaBitmap>>),
}

impl BackgroundSpec {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }
}

/// Stored parameters of every background variant plus the selected one.
///
/// Switching `kind` never touches the other variants' parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub kind: BackgroundKind,
    pub color: Color,
    pub fixed_color: Color,
    pub gradient: GradientSpec,
    #[serde(skip)]
    pub image: Option<Arc<AlphaBitmap>>,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            kind: BackgroundKind::Color,
            color: Color::WHITE,
            fixed_color: DEFAULT_FIXED_COLOR,
            gradient: GradientSpec::default(),
            image: None,
        }
    }
}

impl BackgroundConfig {
    /// Snapshot of the active variant.
    pub fn spec(&self) -> BackgroundSpec {
        match self.kind {
            BackgroundKind::Transparent => BackgroundSpec::Transparent,
            BackgroundKind::Color => BackgroundSpec::SolidColor(self.color),
            BackgroundKind::Fixed => BackgroundSpec::FixedColor(self.fixed_color),
            BackgroundKind::Gradient => BackgroundSpec::Gradient(self.gradient),
            BackgroundKind::Image => BackgroundSpec::Image(self.image.clone()),
        }
    }
}

/// Anchor geometry of a gradient laid over a `width x height` surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientGeometry {
    /// Spans the bounding diagonal `(0,0) -> (width,height)`.
    Linear { start: Point, end: Point },
    /// Centred on the surface with radius `max(width,height)/2`.
    Radial { center: Point, radius: f64 },
}

impl GradientGeometry {
    pub fn for_surface(kind: GradientKind, width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        match kind {
            GradientKind::Linear => Self::Linear {
                start: Point::ZERO,
                end: Point::new(w, h),
            },
            GradientKind::Radial => Self::Radial {
                center: Point::new(w / 2.0, h / 2.0),
                radius: w.max(h) / 2.0,
            },
        }
    }

    /// Gradient parameter at `p`, clamped to `0..=1` (stops pad beyond the anchors).
    pub fn offset_at(&self, p: Point) -> f64 {
        let t = match *self {
            Self::Linear { start, end } => {
                let axis = end - start;
                let len2 = axis.length_squared();
                if len2 <= 0.0 {
                    0.0
                } else {
                    (p - start).dot(axis) / len2
                }
            }
            Self::Radial { center, radius } => {
                if radius <= 0.0 {
                    0.0
                } else {
                    (p - center).length() / radius
                }
            }
        };
        t.clamp(0.0, 1.0)
    }

    /// Interpolated colour at `p` in premultiplied space.
    pub fn color_at(&self, spec: &GradientSpec, p: Point) -> [u8; 4] {
        let t = self.offset_at(p);
        let a = spec.start.to_premul().to_array();
        let b = spec.end.to_premul().to_array();
        [
            lerp_u8(a[0], b[0], t),
            lerp_u8(a[1], b[1], t),
            lerp_u8(a[2], b[2], t),
            lerp_u8(a[3], b[3], t),
        ]
    }
}

/// Cover-fit placement of a `src` image over a `dst` rectangle.
///
/// The image keeps its aspect ratio, covers the whole rectangle and is centred; overflow on the
/// longer axis is cropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to both axes.
    pub scale: f64,
    /// Top-left of the scaled image relative to the target (zero or negative).
    pub offset: Vec2,
    pub draw_width: f64,
    pub draw_height: f64,
}

impl CoverFit {
    pub fn compute(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Self {
        let (sw, sh) = (f64::from(src_w.max(1)), f64::from(src_h.max(1)));
        let (dw, dh) = (f64::from(dst_w), f64::from(dst_h));
        let src_aspect = sw / sh;
        let dst_aspect = dw / dh.max(1.0);

        if src_aspect > dst_aspect {
            let scale = dh / sh;
            let draw_width = sw * scale;
            Self {
                scale,
                offset: Vec2::new((dw - draw_width) / 2.0, 0.0),
                draw_width,
                draw_height: dh,
            }
        } else {
            let scale = dw / sw;
            let draw_height = sh * scale;
            Self {
                scale,
                offset: Vec2::new(0.0, (dh - draw_height) / 2.0),
                draw_width: dw,
                draw_height,
            }
        }
    }
}

/// Fill `surface` with `spec`. Every pixel is overwritten.
pub(crate) fn paint_background(
    surface: &mut Surface,
    spec: &BackgroundSpec,
    raster: &mut Rasterizer,
) -> CutframeResult<()> {
    match spec {
        BackgroundSpec::Transparent => paint_checkerboard(surface),
        BackgroundSpec::SolidColor(c) | BackgroundSpec::FixedColor(c) => {
            surface.fill(c.to_premul());
        }
        BackgroundSpec::Gradient(g) => {
            let geometry = GradientGeometry::for_surface(g.kind, surface.width(), surface.height());
            surface.fill_with(|x, y| {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                geometry.color_at(g, center)
            });
        }
        BackgroundSpec::Image(None) => surface.fill(IMAGE_FALLBACK.to_premul()),
        BackgroundSpec::Image(Some(img)) => paint_cover_image(surface, img, raster)?,
    }
    Ok(())
}

fn paint_checkerboard(surface: &mut Surface) {
    let light = CHECKER_LIGHT.to_premul().to_array();
    let dark = CHECKER_DARK.to_premul().to_array();
    surface.fill_with(|x, y| {
        if ((x / CHECKER_CELL_PX) + (y / CHECKER_CELL_PX)) % 2 == 1 {
            dark
        } else {
            light
        }
    });
}

fn paint_cover_image(
    surface: &mut Surface,
    img: &AlphaBitmap,
    raster: &mut Rasterizer,
) -> CutframeResult<()> {
    let fit = CoverFit::compute(img.width(), img.height(), surface.width(), surface.height());
    let paint = bitmap_paint(img)?;
    let (iw, ih) = (f64::from(img.width()), f64::from(img.height()));

    let layer = raster.render_layer(surface.width(), surface.height(), |ctx| {
        ctx.set_transform(
            vello_cpu::kurbo::Affine::translate((fit.offset.x, fit.offset.y))
                * vello_cpu::kurbo::Affine::scale(fit.scale),
        );
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        Ok(())
    })?;

    surface.data_mut().copy_from_slice(&layer);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
