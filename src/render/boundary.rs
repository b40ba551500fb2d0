//! Alpha-boundary detection.
//!
//! A pixel is on the boundary when it is opaque (`alpha > 0`) and at least one of its eight
//! neighbours is transparent (`alpha == 0`) or lies outside the bitmap. Opaque pixels on the
//! bitmap's outer ring are therefore always boundary pixels.

use crate::assets::bitmap::AlphaBitmap;

const NEIGHBORS_8: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Set of boundary pixels stored as a row-major membership grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundaryMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
    len: usize,
}

impl BoundaryMask {
    fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width as usize) * (height as usize)],
            len: 0,
        }
    }

    fn insert(&mut self, idx: usize) {
        if !self.bits[idx] {
            self.bits[idx] = true;
            self.len += 1;
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of boundary pixels.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Membership test; coordinates outside the grid are never members.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.bits[(y as usize) * (self.width as usize) + (x as usize)]
    }

    /// Packed `y * width + x` keys of all members.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &on)| on.then_some(i))
    }

    /// `(x, y)` of all members.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let w = self.width as usize;
        self.indices().map(move |i| ((i % w) as u32, (i / w) as u32))
    }
}

/// Compute the boundary pixels of `bitmap`. Cost is O(width * height).
#[tracing::instrument(skip_all, fields(width = bitmap.width(), height = bitmap.height()))]
pub fn trace_boundary(bitmap: &AlphaBitmap) -> BoundaryMask {
    let w = bitmap.width();
    let h = bitmap.height();
    let alpha: Vec<u8> = bitmap.alphas().collect();
    let mut mask = BoundaryMask::empty(w, h);

    let wi = i64::from(w);
    let hi = i64::from(h);
    for y in 0..hi {
        for x in 0..wi {
            let idx = (y * wi + x) as usize;
            if alpha[idx] == 0 {
                continue;
            }
            let touches_gap = NEIGHBORS_8.iter().any(|&(dx, dy)| {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= wi || ny >= hi {
                    return true;
                }
                alpha[(ny * wi + nx) as usize] == 0
            });
            if touches_gap {
                mask.insert(idx);
            }
        }
    }

    tracing::debug!(boundary_px = mask.len(), "traced alpha boundary");
    mask
}

#[cfg(test)]
#[path = "../../tests/unit/render/boundary.rs"]
mod tests;
