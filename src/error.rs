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

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Curve or buffer requested with a zero-sized side.
    #[error("invalid dimension: {width}x{height}")]
    InvalidDimension { width: usize, height: usize },

    /// Curve was generated for a different grid than the buffer.
    #[error("curve is {}x{}, buffer is {}x{}", .curve.0, .curve.1, .buffer.0, .buffer.1)]
    DimensionMismatch {
        curve: (usize, usize),
        buffer: (usize, usize),
    },

    /// Raw byte length does not match `width * height * 4`.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    #[error("no image selected")]
    NoSelection,

    /// Source path cannot serve as an identifier.
    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(std::path::PathBuf),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
