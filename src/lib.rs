//! A library for converting raster images (PNG, JPEG, BMP, or WebP) into
//! multi-resolution Windows ICO files.
//!
//! Each requested size becomes one directory entry: the source is scaled
//! to fit the square, centered over transparent padding, and serialized as
//! either a compressed PNG payload or an uncompressed 32-bpp bitmap
//! payload.
//!
//! ```no_run
//! let bytes = std::fs::read("logo.png")?;
//! let result = img2ico::convert(&bytes, &img2ico::IcoOptions::default())?;
//! std::fs::write("logo.ico", result.as_bytes())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod compose;
mod engine;
mod error;
mod format;
mod icondir;
mod options;
mod raster;
mod result;

pub use crate::compose::compose;
pub use crate::engine::{Converter, IcoEngine};
pub use crate::error::Error;
pub use crate::format::SourceFormat;
pub use crate::icondir::{EncodingStrategy, IconDir, IconDirEntry};
pub use crate::options::{IcoOptions, DEFAULT_SIZES};
pub use crate::raster::RasterImage;
pub use crate::result::IcoResult;

//===========================================================================//

/// Converts a source image into an ICO file using the default converter:
/// PNG-payload entries, accelerated engine first when available, reference
/// pipeline otherwise.
pub fn convert(
    bytes: &[u8],
    options: &IcoOptions,
) -> Result<IcoResult, Error> {
    Converter::new().convert(bytes, options)
}

//===========================================================================//
