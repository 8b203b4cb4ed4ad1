// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Generalized Hilbert ("gilbert") curve over arbitrary rectangles.

use std::ops::Index;

use crate::error::{Error, Result};

/// Grid position. `x` is the column, `y` is the row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Traversal order visiting every cell of a `width * height` grid once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    width: usize,
    height: usize,
    coords: Vec<Coord>,
}

impl Curve {
    /// Generates the curve for a `width * height` grid.
    ///
    /// The longer side always becomes the primary arm, so the curve starts
    /// at `(0, 0)` and runs along the longer edge first.
    /// Fails with [`Error::InvalidDimension`] if either side is zero
    /// or does not fit a `u32` coordinate.
    #[tracing::instrument(level = "debug")]
    pub fn generate(width: usize, height: usize) -> Result<Self> {
        if width == 0
            || height == 0
            || u32::try_from(width).is_err()
            || u32::try_from(height).is_err()
        {
            return Err(Error::InvalidDimension { width, height });
        }
        let total = width
            .checked_mul(height)
            .ok_or(Error::InvalidDimension { width, height })?;

        let mut coords = Vec::with_capacity(total);
        let (w, h) = (width as i64, height as i64);
        if width >= height {
            gilbert(&mut coords, (0, 0), (w, 0), (0, h));
        } else {
            gilbert(&mut coords, (0, 0), (0, h), (w, 0));
        }
        debug_assert_eq!(coords.len(), total);

        Ok(Self {
            width,
            height,
            coords,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Always false for a generated curve.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coord> {
        self.coords.iter()
    }
}

impl Index<usize> for Curve {
    type Output = Coord;

    fn index(&self, index: usize) -> &Coord {
        &self.coords[index]
    }
}

impl<'a> IntoIterator for &'a Curve {
    type Item = &'a Coord;
    type IntoIter = std::slice::Iter<'a, Coord>;

    fn into_iter(self) -> Self::IntoIter {
        self.coords.iter()
    }
}

/// Emits `n` points starting at `p`, stepping by `d`.
fn line(out: &mut Vec<Coord>, (mut x, mut y): (i64, i64), (dx, dy): (i64, i64), n: i64) {
    for _ in 0..n {
        out.push(Coord::new(x as u32, y as u32));
        x += dx;
        y += dy;
    }
}

/// Covers the region spanned from `p` by arms `a` (major) and `b` (minor).
fn gilbert(out: &mut Vec<Coord>, p: (i64, i64), a: (i64, i64), b: (i64, i64)) {
    let (x, y) = p;
    let (ax, ay) = a;
    let (bx, by) = b;

    let w = (ax + ay).abs();
    let h = (bx + by).abs();
    let (dax, day) = (ax.signum(), ay.signum());
    let (dbx, dby) = (bx.signum(), by.signum());

    if h == 1 {
        return line(out, p, (dax, day), w);
    }
    if w == 1 {
        return line(out, p, (dbx, dby), h);
    }

    // Floor division, rounds toward negative infinity for negative arms.
    let (mut ax2, mut ay2) = (ax.div_euclid(2), ay.div_euclid(2));
    let (mut bx2, mut by2) = (bx.div_euclid(2), by.div_euclid(2));

    let w2 = (ax2 + ay2).abs();
    let h2 = (bx2 + by2).abs();

    if 2 * w > 3 * h {
        // Wide: split the long arm in two.
        if w2 % 2 != 0 && w > 2 {
            ax2 += dax;
            ay2 += day;
        }

        gilbert(out, (x, y), (ax2, ay2), (bx, by));
        gilbert(out, (x + ax2, y + ay2), (ax - ax2, ay - ay2), (bx, by));
    } else {
        // Tall or square: up, across, back down.
        if h2 % 2 != 0 && h > 2 {
            bx2 += dbx;
            by2 += dby;
        }

        gilbert(out, (x, y), (bx2, by2), (ax2, ay2));
        gilbert(out, (x + bx2, y + by2), (ax, ay), (bx - bx2, by - by2));
        gilbert(
            out,
            (x + (ax - dax) + (bx2 - dbx), y + (ay - day) + (by2 - dby)),
            (-bx2, -by2),
            (-(ax - ax2), -(ay - ay2)),
        );
    }
}
