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

//! Golden-ratio rotation of pixels along a curve.
//!
//! Walking the curve in order, every pixel is moved `offset` steps ahead
//! (wrapping around). [`inverse`] moves them back. Neither is a cipher,
//! the permutation depends only on the image size.

use ndarray::prelude::*;
use ndarray::Zip;

use crate::curve::{Coord, Curve};
use crate::error::{Error, Result};
use crate::pixels::{PixelBuffer, BYTES_PER_PIXEL};

/// `(sqrt(5) - 1) / 2`
const GOLDEN_FRACTION: f64 = 0.618_033_988_749_894_9;

/// Rotation amount for a curve of `total` points.
pub fn golden_offset(total: usize) -> usize {
    (total as f64 * GOLDEN_FRACTION).round() as usize
}

/// Moves each pixel at `curve[i]` to `curve[i + offset]`.
///
/// Returns a new buffer, the input is untouched.
pub fn forward(curve: &Curve, buffer: &PixelBuffer) -> Result<PixelBuffer> {
    permute(curve, buffer, Direction::Forward)
}

/// Moves each pixel at `curve[i + offset]` back to `curve[i]`.
pub fn inverse(curve: &Curve, buffer: &PixelBuffer) -> Result<PixelBuffer> {
    permute(curve, buffer, Direction::Inverse)
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Forward,
    Inverse,
}

fn permute(curve: &Curve, buffer: &PixelBuffer, dir: Direction) -> Result<PixelBuffer> {
    let (w, h) = (buffer.width(), buffer.height());
    if curve.width() != w || curve.height() != h {
        return Err(Error::DimensionMismatch {
            curve: (curve.width(), curve.height()),
            buffer: (w, h),
        });
    }

    let total = curve.len();
    let offset = golden_offset(total) % total;

    // Gather map: for every destination, which source pixel lands there.
    // The curve is a bijection, so every cell is assigned exactly once.
    let mut source = Array2::from_elem((h, w), Coord::default());
    for (i, &here) in curve.iter().enumerate() {
        let there = curve[(i + offset) % total];
        let (src, dst) = match dir {
            Direction::Forward => (here, there),
            Direction::Inverse => (there, here),
        };
        source[[dst.y as usize, dst.x as usize]] = src;
    }

    let input = buffer.view();
    let mut out = Array3::<u8>::zeros((h, w, BYTES_PER_PIXEL));
    Zip::from(out.lanes_mut(Axis(2)))
        .and(&source)
        .par_for_each(|mut px, src| {
            px.assign(&input.slice(s![src.y as usize, src.x as usize, ..]));
        });

    Ok(PixelBuffer::from_array(out))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::prelude::*;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::*;

    fn random_buffer(w: usize, h: usize, rng: &mut impl Rng) -> PixelBuffer {
        let mut bytes = vec![0u8; w * h * BYTES_PER_PIXEL];
        rng.fill_bytes(&mut bytes);
        PixelBuffer::from_raw(w, h, bytes).unwrap()
    }

    /// Every pixel gets a distinct value so moves are traceable.
    fn indexed_buffer(w: usize, h: usize) -> PixelBuffer {
        let px: Vec<[u8; 4]> = (0..(w * h) as u32).map(u32::to_le_bytes).collect();
        PixelBuffer::from_pixels(w, h, &px).unwrap()
    }

    #[test]
    fn offset_is_golden_fraction() {
        assert_eq!(golden_offset(1), 1);
        assert_eq!(golden_offset(4), 2);
        assert_eq!(golden_offset(6), 4);
        assert_eq!(golden_offset(100), 62);
        assert_eq!(golden_offset(10_000), 6180);
    }

    #[test]
    fn two_by_two_round_trip() {
        let px = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [1, 2, 3, 4]];
        let buf = PixelBuffer::from_pixels(2, 2, &px).unwrap();
        let curve = Curve::generate(2, 2).unwrap();

        let scrambled = forward(&curve, &buf).unwrap();
        assert_ne!(scrambled, buf);
        assert_eq!(inverse(&curve, &scrambled).unwrap(), buf);
    }

    #[test]
    fn two_by_two_moves_along_curve() {
        // Curve is (0,0) (0,1) (1,1) (1,0), offset 2.
        let buf = indexed_buffer(2, 2);
        let curve = Curve::generate(2, 2).unwrap();
        let out = forward(&curve, &buf).unwrap();

        assert_eq!(out.pixel(Coord::new(1, 1)), buf.pixel(Coord::new(0, 0)));
        assert_eq!(out.pixel(Coord::new(1, 0)), buf.pixel(Coord::new(0, 1)));
        assert_eq!(out.pixel(Coord::new(0, 0)), buf.pixel(Coord::new(1, 1)));
        assert_eq!(out.pixel(Coord::new(0, 1)), buf.pixel(Coord::new(1, 0)));
    }

    #[test]
    fn random_round_trips() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(0x5eed);
        for (w, h) in [(1, 1), (1, 7), (5, 3), (16, 16), (33, 20), (64, 9)] {
            let curve = Curve::generate(w, h).unwrap();
            let buf = random_buffer(w, h, &mut rng);

            let f = forward(&curve, &buf).unwrap();
            assert_eq!(inverse(&curve, &f).unwrap(), buf, "inverse . forward {w}x{h}");

            let i = inverse(&curve, &buf).unwrap();
            assert_eq!(forward(&curve, &i).unwrap(), buf, "forward . inverse {w}x{h}");
        }
    }

    #[test]
    fn every_destination_written_once() {
        for (w, h) in [(3, 2), (17, 11), (40, 40)] {
            let curve = Curve::generate(w, h).unwrap();
            let buf = indexed_buffer(w, h);

            for out in [forward(&curve, &buf).unwrap(), inverse(&curve, &buf).unwrap()] {
                let seen: HashSet<_> = out.as_bytes().chunks_exact(4).collect();
                assert_eq!(seen.len(), w * h);
            }
        }
    }

    #[test]
    fn input_is_not_mutated() {
        let buf = indexed_buffer(5, 4);
        let copy = buf.clone();
        let curve = Curve::generate(5, 4).unwrap();
        forward(&curve, &buf).unwrap();
        assert_eq!(buf, copy);
    }

    #[test]
    fn rejects_mismatched_curve() {
        let buf = indexed_buffer(3, 2);
        let transposed = Curve::generate(2, 3).unwrap();
        assert!(matches!(
            forward(&transposed, &buf),
            Err(Error::DimensionMismatch {
                curve: (2, 3),
                buffer: (3, 2)
            })
        ));
        let small = Curve::generate(2, 2).unwrap();
        assert!(inverse(&small, &buf).is_err());
    }
}
