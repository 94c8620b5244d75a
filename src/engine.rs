use crate::compose::compose;
use crate::error::Error;
use crate::format::SourceFormat;
use crate::icondir::{EncodingStrategy, IconDir, IconDirEntry};
use crate::options::IcoOptions;
use crate::raster::RasterImage;
use crate::result::IcoResult;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::io::Cursor;
use std::sync::Arc;

//===========================================================================//

/// A conversion path: raw source bytes and a size list in, finished ICO
/// bytes out.  Implementations must produce the container layout described
/// by [`IconDir`]: entries in size-list order, payloads packed contiguously
/// after the directory.  All sizes must be nonzero.
pub trait IcoEngine: Send + Sync {
    /// Converts the source image into a complete ICO byte buffer, one
    /// directory entry per requested size.
    fn convert(&self, bytes: &[u8], sizes: &[u32]) -> Result<Vec<u8>, Error>;
}

//===========================================================================//

// Source formats the fused pipeline must be able to read.
const REQUIRED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Bmp,
    ImageFormat::WebP,
];

/// The accelerated conversion path: a fused pipeline that decodes,
/// composes, and encodes in one pass, assembling the container inline.
/// Produces PNG-payload entries only.
pub(crate) struct FastEngine;

impl FastEngine {
    /// Checks once that the codec was compiled with every decoder the
    /// fused pipeline needs.
    pub(crate) fn load() -> Result<FastEngine, String> {
        for format in REQUIRED_FORMATS {
            if !format.reading_enabled() {
                return Err(format!(
                    "codec support for {:?} is not compiled in",
                    format
                ));
            }
        }
        Ok(FastEngine)
    }
}

impl IcoEngine for FastEngine {
    fn convert(&self, bytes: &[u8], sizes: &[u32]) -> Result<Vec<u8>, Error> {
        if sizes.len() > (u16::MAX as usize) {
            invalid_input!(
                "too many sizes (was {}, but max is {})",
                sizes.len(),
                u16::MAX
            );
        }
        if sizes.contains(&0) {
            invalid_input!("icon sizes must be nonzero");
        }
        let image = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(error) => invalid_input!("failed to decode image: {}", error),
        };
        let mut payloads = Vec::<Vec<u8>>::with_capacity(sizes.len());
        for &size in sizes {
            // Scale to fit within the square while keeping aspect ratio,
            // then center on a transparent canvas.
            let scaled = image.resize(size, size, FilterType::CatmullRom);
            let mut canvas = RgbaImage::new(size, size);
            let x = (size as i64 - scaled.width() as i64) / 2;
            let y = (size as i64 - scaled.height() as i64) / 2;
            imageops::replace(&mut canvas, &scaled, x, y);
            let mut payload = Cursor::new(Vec::new());
            if let Err(error) = DynamicImage::ImageRgba8(canvas)
                .write_to(&mut payload, ImageFormat::Png)
            {
                encoding_error!(
                    "failed to encode {}x{} frame: {}",
                    size,
                    size,
                    error
                );
            }
            payloads.push(payload.into_inner());
        }
        let directory_len = 6 + 16 * payloads.len();
        let mut ico = Vec::with_capacity(
            directory_len + payloads.iter().map(Vec::len).sum::<usize>(),
        );
        ico.extend_from_slice(&0u16.to_le_bytes()); // reserved
        ico.extend_from_slice(&1u16.to_le_bytes()); // image type: icon
        ico.extend_from_slice(&(payloads.len() as u16).to_le_bytes());
        let mut offset = directory_len as u32;
        for (payload, &size) in payloads.iter().zip(sizes) {
            // A width/height byte of zero indicates a size of 256 or more.
            let dimension = if size >= 256 { 0 } else { size as u8 };
            ico.push(dimension); // width
            ico.push(dimension); // height
            ico.push(0); // color count
            ico.push(0); // reserved
            ico.extend_from_slice(&0u16.to_le_bytes()); // planes
            ico.extend_from_slice(&0u16.to_le_bytes()); // bit count
            ico.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            ico.extend_from_slice(&offset.to_le_bytes());
            offset += payload.len() as u32;
        }
        for payload in &payloads {
            ico.extend_from_slice(payload);
        }
        Ok(ico)
    }
}

// The process-wide accelerated engine.  The load outcome is decided at
// most once per process: until first use it is unattempted, afterwards it
// is permanently available or permanently unavailable, and conversions
// racing the initialization block until it resolves.
static FAST_ENGINE: Lazy<Option<Arc<FastEngine>>> =
    Lazy::new(|| match FastEngine::load() {
        Ok(engine) => Some(Arc::new(engine)),
        Err(reason) => {
            warn!(
                "accelerated engine unavailable, conversions will use the \
                 reference pipeline: {}",
                reason
            );
            None
        }
    });

fn default_fast_path() -> Option<Arc<dyn IcoEngine>> {
    FAST_ENGINE
        .as_ref()
        .map(|engine| Arc::clone(engine) as Arc<dyn IcoEngine>)
}

//===========================================================================//

/// Orchestrates a conversion: gates the input on its format signature,
/// attempts the accelerated engine when one is available, and otherwise
/// runs the reference pipeline (decode once, compose per size, encode one
/// entry per size).
pub struct Converter {
    strategy: EncodingStrategy,
    fast: Option<Arc<dyn IcoEngine>>,
}

impl Converter {
    /// Creates a converter with the default PNG-entry strategy, backed by
    /// the process-wide accelerated engine if it loaded.
    pub fn new() -> Converter {
        Converter::with_strategy(EncodingStrategy::PngEntries)
    }

    /// Creates a converter with the given payload strategy, backed by the
    /// process-wide accelerated engine if it loaded.  The accelerated
    /// engine produces PNG payloads only, so raw-bitmap deployments always
    /// use the reference pipeline.
    pub fn with_strategy(strategy: EncodingStrategy) -> Converter {
        Converter { strategy, fast: default_fast_path() }
    }

    /// Creates a converter that always uses the reference pipeline.
    pub fn reference_only(strategy: EncodingStrategy) -> Converter {
        Converter { strategy, fast: None }
    }

    /// Creates a converter backed by a caller-supplied accelerated engine.
    pub fn with_engine(
        strategy: EncodingStrategy,
        engine: Arc<dyn IcoEngine>,
    ) -> Converter {
        Converter { strategy, fast: Some(engine) }
    }

    /// Converts a source image into an ICO file holding one entry per
    /// requested size.
    ///
    /// Fails with [`Error::UnsupportedFormat`] if the input does not carry
    /// a PNG, JPEG, BMP, or WebP signature, and with
    /// [`Error::InvalidInput`] if the bytes are malformed past the
    /// signature or the size list violates its contract.  An accelerated
    /// engine failure is never surfaced; the reference pipeline's verdict
    /// is final.
    pub fn convert(
        &self,
        bytes: &[u8],
        options: &IcoOptions,
    ) -> Result<IcoResult, Error> {
        let format = match SourceFormat::sniff(bytes) {
            Some(format) => format,
            None => {
                return Err(Error::UnsupportedFormat("unknown".to_string()))
            }
        };
        let sizes = options.sizes.clone();
        if sizes.contains(&0) {
            invalid_input!("icon sizes must be nonzero");
        }
        if sizes.len() > (u16::MAX as usize) {
            invalid_input!(
                "too many sizes (was {}, but max is {})",
                sizes.len(),
                u16::MAX
            );
        }
        debug!(
            "converting {} {} bytes into sizes {:?}",
            bytes.len(),
            format.name(),
            sizes
        );
        if self.strategy == EncodingStrategy::PngEntries {
            if let Some(engine) = &self.fast {
                match engine.convert(bytes, &sizes) {
                    Ok(data) => return Ok(IcoResult::new(data, sizes)),
                    Err(error) => warn!(
                        "accelerated engine failed, falling back to the \
                         reference pipeline: {}",
                        error
                    ),
                }
            }
        }
        let source = RasterImage::decode(bytes, format)?;
        let mut icondir = IconDir::new();
        for &size in &sizes {
            let canvas = compose(&source, size)?;
            let entry = match self.strategy {
                EncodingStrategy::PngEntries => {
                    IconDirEntry::encode_png(&canvas)?
                }
                EncodingStrategy::RawBitmapEntries => {
                    IconDirEntry::encode_bmp(&canvas)?
                }
            };
            icondir.add_entry(entry);
        }
        let mut data = Vec::new();
        icondir.write(&mut data)?;
        Ok(IcoResult::new(data, sizes))
    }
}

impl Default for Converter {
    fn default() -> Converter {
        Converter::new()
    }
}

//===========================================================================//


//===========================================================================//
