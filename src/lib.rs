//! Library to reversibly scramble images along a space-filling curve.
//!
//! The pieces, from the bottom up:
//!
//! * [Curve] visits every pixel of a `width * height` grid exactly once,
//!   following a generalized Hilbert curve that works on any rectangle.
//! * [forward] and [inverse] rotate pixels along that curve by a
//!   golden-ratio fraction of its length. Both are bijections, so one
//!   undoes the other exactly.
//! * [ImageStore] keeps a bounded list of loaded images. Each image keeps
//!   its original pixels and a working copy the transforms apply to.
//!
//! The scrambling is only visual obfuscation. It depends on nothing but
//! the image size and anybody can undo it.

// Copyright (C) 2023 Dheatly23
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
//

pub mod codec;
pub mod config;
pub mod curve;
pub mod error;
pub mod permute;
pub mod pixels;
pub mod store;
pub mod viewer;

#[doc(inline)]
pub use crate::config::{Config, ConfigBuilder};
#[doc(inline)]
pub use crate::curve::{Coord, Curve};
#[doc(inline)]
pub use crate::error::{Error, Result};
#[doc(inline)]
pub use crate::permute::{forward, inverse};
#[doc(inline)]
pub use crate::pixels::PixelBuffer;
#[doc(inline)]
pub use crate::store::{Entry, ImageStore, StoreEvent, StoreObserver};
#[doc(inline)]
pub use crate::viewer::Viewer;
