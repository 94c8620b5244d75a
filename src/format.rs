#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

//===========================================================================//

// The signature that all PNG files start with.
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// The signature that all JPEG files start with.
const JPEG_SIGNATURE: &[u8] = &[0xff, 0xd8, 0xff];

// The signature that all BMP files start with.
const BMP_SIGNATURE: &[u8] = b"BM";

//===========================================================================//

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
/// A source image format that can be converted into an ICO file.
pub enum SourceFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG/JFIF
    Jpeg,
    /// Windows bitmap
    Bmp,
    /// WebP (lossy or lossless)
    Webp,
}

impl SourceFormat {
    /// Classifies a byte buffer by its leading bytes, or returns `None` if
    /// the signature is not recognized.  Inspects at most the first 12
    /// bytes; a buffer shorter than a format's signature never matches it.
    pub fn sniff(bytes: &[u8]) -> Option<SourceFormat> {
        if bytes.starts_with(PNG_SIGNATURE) {
            Some(SourceFormat::Png)
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            Some(SourceFormat::Jpeg)
        } else if bytes.starts_with(BMP_SIGNATURE) {
            Some(SourceFormat::Bmp)
        } else if bytes.len() >= 12
            && &bytes[0..4] == b"RIFF"
            && &bytes[8..12] == b"WEBP"
        {
            Some(SourceFormat::Webp)
        } else {
            None
        }
    }

    /// Returns the conventional name of this format.
    pub fn name(&self) -> &'static str {
        match *self {
            SourceFormat::Png => "PNG",
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Bmp => "BMP",
            SourceFormat::Webp => "WebP",
        }
    }

    pub(crate) fn image_format(&self) -> image::ImageFormat {
        match *self {
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Bmp => image::ImageFormat::Bmp,
            SourceFormat::Webp => image::ImageFormat::WebP,
        }
    }
}

//===========================================================================//


//===========================================================================//
