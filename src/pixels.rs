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

use ndarray::prelude::*;

use crate::curve::Coord;
use crate::error::{Error, Result};

/// Bytes per pixel. Channel order is whatever the codec produced.
pub const BYTES_PER_PIXEL: usize = 4;

/// Owned, row-major pixel storage of shape `(height, width, 4)`.
///
/// Rows are contiguous, so the byte stride is always `width * 4`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Array3<u8>,
}

impl PixelBuffer {
    /// Zero-filled buffer.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        byte_len(width, height)?;
        Ok(Self {
            data: Array3::zeros((height, width, BYTES_PER_PIXEL)),
        })
    }

    /// Wraps raw bytes laid out row by row, 4 bytes per pixel.
    pub fn from_raw(width: usize, height: usize, bytes: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if bytes.len() != expected {
            return Err(Error::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }

        let data = Array3::from_shape_vec((height, width, BYTES_PER_PIXEL), bytes).map_err(
            |_| Error::BufferSize {
                expected,
                actual: expected,
            },
        )?;
        Ok(Self { data })
    }

    /// Builds a buffer from packed pixel values, one `[u8; 4]` per pixel.
    pub fn from_pixels(width: usize, height: usize, pixels: &[[u8; 4]]) -> Result<Self> {
        Self::from_raw(width, height, pixels.iter().flatten().copied().collect())
    }

    /// Wraps an array produced elsewhere in the crate. Shape must be `(h, w, 4)`.
    pub(crate) fn from_array(data: Array3<u8>) -> Self {
        debug_assert_eq!(data.shape()[2], BYTES_PER_PIXEL);
        debug_assert!(data.is_standard_layout());
        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn height(&self) -> usize {
        self.data.shape()[0]
    }

    /// Byte length of one row.
    pub fn stride(&self) -> usize {
        self.width() * BYTES_PER_PIXEL
    }

    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    pub fn contains(&self, c: Coord) -> bool {
        (c.x as usize) < self.width() && (c.y as usize) < self.height()
    }

    pub fn pixel(&self, c: Coord) -> Option<[u8; 4]> {
        if !self.contains(c) {
            return None;
        }
        let p = self.data.slice(s![c.y as usize, c.x as usize, ..]);
        Some([p[0], p[1], p[2], p[3]])
    }

    /// Writes one pixel. Returns false if `c` is out of bounds.
    pub fn set_pixel(&mut self, c: Coord, value: [u8; 4]) -> bool {
        if !self.contains(c) {
            return false;
        }
        self.data
            .slice_mut(s![c.y as usize, c.x as usize, ..])
            .assign(&aview1(&value));
        true
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height() {
            return None;
        }
        let stride = self.stride();
        Some(&self.as_bytes()[y * stride..(y + 1) * stride])
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data
            .as_slice()
            .expect("Should be standard-layout")
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data.into_raw_vec()
    }
}

/// Byte length of a `width * height` buffer. Zero sides and sizes past
/// `isize::MAX` are rejected.
fn byte_len(width: usize, height: usize) -> Result<usize> {
    let invalid = Error::InvalidDimension { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or(invalid)
}
