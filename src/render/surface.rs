use std::sync::Arc;

use crate::assets::bitmap::AlphaBitmap;
use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::foundation::math::{over, over_in_place, unpremultiply_rgba8_in_place};

/// Premultiplied RGBA8 raster target, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Fully transparent surface.
    pub fn new(width: u32, height: u32) -> CutframeResult<Self> {
        let canvas = Canvas::new(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0u8; canvas.rgba8_len()],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Premultiplied pixel at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    pub fn fill(&mut self, color: Rgba8Premul) {
        let rgba = color.to_array();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Overwrite every pixel with `f(x, y)` (premultiplied).
    pub fn fill_with(&mut self, mut f: impl FnMut(u32, u32) -> [u8; 4]) {
        let w = self.width as usize;
        for (i, px) in self.data.chunks_exact_mut(4).enumerate() {
            let x = (i % w) as u32;
            let y = (i / w) as u32;
            px.copy_from_slice(&f(x, y));
        }
    }

    /// Source-over a same-sized premultiplied layer onto this surface.
    pub fn composite_over(&mut self, layer: &[u8]) -> CutframeResult<()> {
        over_in_place(&mut self.data, layer)
    }

    /// Draw a bitmap at natural size with its top-left at `(0, 0)`, clipped to the surface.
    pub fn draw_bitmap(&mut self, bitmap: &AlphaBitmap) {
        let src = bitmap.premultiplied();
        let src_w = bitmap.width() as usize;
        let cols = bitmap.width().min(self.width) as usize;
        let rows = bitmap.height().min(self.height) as usize;
        let dst_w = self.width as usize;
        for y in 0..rows {
            let src_row = &src[y * src_w * 4..(y * src_w + cols) * 4];
            let dst_row = &mut self.data[y * dst_w * 4..(y * dst_w + cols) * 4];
            for (d, s) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
    }

    /// Straight (non-premultiplied) copy of the pixels, for encoding.
    pub fn to_straight_rgba8(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

pub(crate) fn pixmap_dims(width: u32, height: u32) -> CutframeResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| CutframeError::canvas("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CutframeError::canvas("pixmap height exceeds u16"))?;
    Ok((w, h))
}

pub(crate) fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> CutframeResult<vello_cpu::Pixmap> {
    let (w, h) = pixmap_dims(width, height)?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(CutframeError::canvas("pixmap byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

/// Image paint for a bitmap, sampled by `vello_cpu`.
pub(crate) fn bitmap_paint(bitmap: &AlphaBitmap) -> CutframeResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bitmap.premultiplied(), bitmap.width(), bitmap.height())?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
