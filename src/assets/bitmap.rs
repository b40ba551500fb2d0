use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Canvas;
use crate::foundation::error::{CutframeError, CutframeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decoded image plus its per-pixel alpha channel.
///
/// Immutable once built; cloning is cheap (pixel buffers are shared). A pixel is opaque iff its
/// alpha is non-zero.
#[derive(Clone, Debug)]
pub struct AlphaBitmap {
    width: u32,
    height: u32,
    /// Straight RGBA8, row-major from the top-left, tightly packed.
    rgba8: Arc<Vec<u8>>,
    /// Same pixels, premultiplied, for compositing.
    rgba8_premul: Arc<Vec<u8>>,
}

impl AlphaBitmap {
    /// Wrap straight RGBA8 pixels (`width * height * 4` bytes).
    pub fn from_rgba8(width: u32, height: u32, rgba8: Vec<u8>) -> CutframeResult<Self> {
        let canvas = Canvas::new(width, height)?;
        if rgba8.len() != canvas.rgba8_len() {
            return Err(CutframeError::validation(format!(
                "bitmap byte len {} does not match {width}x{height} rgba8",
                rgba8.len()
            )));
        }
        let mut premul = rgba8.clone();
        premultiply_rgba8_in_place(&mut premul);
        Ok(Self {
            width,
            height,
            rgba8: Arc::new(rgba8),
            rgba8_premul: Arc::new(premul),
        })
    }

    /// Bitmap where every pixel has the same straight RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> CutframeResult<Self> {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Build a bitmap by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> [u8; 4],
    ) -> CutframeResult<Self> {
        let canvas = Canvas::new(width, height)?;
        let mut rgba8 = Vec::with_capacity(canvas.rgba8_len());
        for y in 0..height {
            for x in 0..width {
                rgba8.extend_from_slice(&f(x, y));
            }
        }
        Self::from_rgba8(width, height, rgba8)
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

    /// Straight RGBA8 pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba8
    }

    /// Premultiplied RGBA8 pixel bytes.
    pub fn premultiplied(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Straight RGBA of pixel `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.index(x, y) * 4;
        [
            self.rgba8[i],
            self.rgba8[i + 1],
            self.rgba8[i + 2],
            self.rgba8[i + 3],
        ]
    }

    /// Alpha of pixel `(x, y)`. Panics when out of bounds.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.rgba8[self.index(x, y) * 4 + 3]
    }

    /// Alpha values in row-major order.
    pub fn alphas(&self) -> impl Iterator<Item = u8> + '_ {
        self.rgba8.chunks_exact(4).map(|px| px[3])
    }

    /// Encode as PNG (straight RGBA8), e.g. as a request body for background removal.
    pub fn to_png(&self) -> CutframeResult<Vec<u8>> {
        let mut buf = Vec::new();
        image::write_buffer_with_format(
            &mut Cursor::new(&mut buf),
            &self.rgba8,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .context("encode bitmap as png")?;
        Ok(buf)
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize) * (self.width as usize) + (x as usize)
    }
}
