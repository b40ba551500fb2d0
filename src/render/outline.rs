use serde::{Deserialize, Serialize};

use crate::foundation::color::Color;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::foundation::math::scale_by_coverage;
use crate::render::boundary::BoundaryMask;
use crate::render::surface::Surface;

// Samples per axis when computing disc coverage.
const STAMP_SUBSAMPLES: u32 = 4;

/// Outline drawn along the foreground's alpha boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineSpec {
    /// Disc radius in pixels. `0` disables the outline.
    pub width_px: u32,
    pub color: Color,
}

impl Default for OutlineSpec {
    fn default() -> Self {
        Self {
            width_px: 0,
            color: Color::WHITE,
        }
    }
}

impl OutlineSpec {
    pub fn is_enabled(&self) -> bool {
        self.width_px > 0
    }
}

/// Largest radius that can still change the output on a `width x height` surface.
///
/// A disc centred on any pixel corner of the surface with a radius beyond its diagonal already
/// covers every pixel fully.
fn effective_radius(width_px: u32, width: u32, height: u32) -> u32 {
    let diag = f64::from(width).hypot(f64::from(height)).ceil() as u32;
    width_px.min(diag.saturating_add(1))
}

/// Anti-aliased coverage of a disc of radius `r` centred on a pixel corner.
///
/// The stamp covers offsets `-r..r` on both axes relative to that corner.
struct DiscStamp {
    radius: i64,
    side: usize,
    coverage: Vec<u8>,
}

impl DiscStamp {
    fn new(radius: u32) -> CutframeResult<Self> {
        let r = i64::from(radius);
        let side = (radius as usize)
            .checked_mul(2)
            .ok_or_else(|| CutframeError::canvas("outline stamp size overflow"))?;
        let len = side
            .checked_mul(side)
            .ok_or_else(|| CutframeError::canvas("outline stamp size overflow"))?;
        let n = STAMP_SUBSAMPLES;
        let r2 = f64::from(radius) * f64::from(radius);
        let mut coverage = Vec::with_capacity(len);
        for dy in -r..r {
            for dx in -r..r {
                let mut hits = 0u32;
                for sy in 0..n {
                    for sx in 0..n {
                        let px = dx as f64 + (f64::from(sx) + 0.5) / f64::from(n);
                        let py = dy as f64 + (f64::from(sy) + 0.5) / f64::from(n);
                        if px * px + py * py <= r2 {
                            hits += 1;
                        }
                    }
                }
                coverage.push(((hits * 255 + (n * n) / 2) / (n * n)) as u8);
            }
        }
        Ok(Self {
            radius: r,
            side,
            coverage,
        })
    }

    /// Max-combine the stamp into `layer` with its centre at pixel corner `(cx, cy)`.
    fn stamp(&self, layer: &mut [u8], width: u32, height: u32, cx: i64, cy: i64) {
        let (w, h) = (i64::from(width), i64::from(height));
        let (x0, x1) = ((cx - self.radius).max(0), (cx + self.radius).min(w));
        let (y0, y1) = ((cy - self.radius).max(0), (cy + self.radius).min(h));
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let col0 = (x0 - (cx - self.radius)) as usize;
        let cols = (x1 - x0) as usize;
        for sy in y0..y1 {
            let row = (sy - (cy - self.radius)) as usize;
            let src = &self.coverage[row * self.side + col0..row * self.side + col0 + cols];
            let dst_start = (sy * w + x0) as usize;
            let dst = &mut layer[dst_start..dst_start + cols];
            for (d, &c) in dst.iter_mut().zip(src) {
                *d = (*d).max(c);
            }
        }
    }
}

/// Paint `spec` along every pixel of `boundary` onto `surface`.
///
/// Discs are merged into one coverage layer before tinting, so overlap never darkens the
/// stroke and the result does not depend on iteration order. A zero width leaves `surface`
/// untouched.
pub(crate) fn render_outline(
    surface: &mut Surface,
    boundary: &BoundaryMask,
    spec: &OutlineSpec,
) -> CutframeResult<()> {
    if !spec.is_enabled() || boundary.is_empty() {
        return Ok(());
    }

    let (w, h) = (surface.width(), surface.height());
    let stamp = DiscStamp::new(effective_radius(spec.width_px, w, h))?;
    let mut coverage = vec![0u8; (w as usize) * (h as usize)];
    for (x, y) in boundary.iter() {
        stamp.stamp(&mut coverage, w, h, i64::from(x), i64::from(y));
    }

    let tint = spec.color.to_premul().to_array();
    let mut layer = vec![0u8; coverage.len() * 4];
    for (px, &c) in layer.chunks_exact_mut(4).zip(coverage.iter()) {
        if c != 0 {
            px.copy_from_slice(&scale_by_coverage(tint, c));
        }
    }
    surface.composite_over(&layer)
}

#[cfg(test)]
#[path = "../../tests/unit/render/outline.rs"]
mod tests;
