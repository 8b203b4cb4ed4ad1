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

//! Image file <-> [`PixelBuffer`] conversion. Pixels are kept as RGBA8.

use std::path::{Path, PathBuf};

use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::info;

use crate::error::{Error, Result};
use crate::pixels::PixelBuffer;

const FALLBACK_NAME: &str = "image.png";

/// Decodes an image file, format guessed from its content.
pub fn load(path: impl AsRef<Path>) -> Result<PixelBuffer> {
    let path = path.as_ref();
    let im = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    from_dynamic(im)
}

pub fn from_dynamic(im: DynamicImage) -> Result<PixelBuffer> {
    let im = im.into_rgba8();
    let (w, h) = im.dimensions();
    PixelBuffer::from_raw(w as _, h as _, im.into_raw())
}

/// Encodes `buffer` to `path`, format chosen from the extension.
///
/// JPEG cannot store alpha, so it is dropped there.
pub fn save(path: impl AsRef<Path>, buffer: &PixelBuffer) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path)?;

    let (w, h) = (buffer.width(), buffer.height());
    let im = RgbaImage::from_raw(w as _, h as _, buffer.as_bytes().to_vec()).ok_or(
        Error::BufferSize {
            expected: w * h * 4,
            actual: buffer.as_bytes().len(),
        },
    )?;
    let im = DynamicImage::ImageRgba8(im);

    match format {
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgb8(im.to_rgb8()).save_with_format(path, format)?
        }
        _ => im.save_with_format(path, format)?,
    }
    info!(path = %path.display(), "saved image");
    Ok(())
}

/// File name used when saving an image loaded from `identifier`.
pub fn default_save_name(identifier: &str) -> PathBuf {
    Path::new(identifier)
        .file_name()
        .map_or_else(|| PathBuf::from(FALLBACK_NAME), PathBuf::from)
}
