use std::io;

//===========================================================================//

/// The error type for image-to-ICO conversions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input bytes do not start with a recognized image signature.
    /// Carries the name of the detected format, or `"unknown"`.
    #[error(
        "unsupported image format: {0}. \
         Only PNG, JPEG, BMP, and WebP are supported"
    )]
    UnsupportedFormat(String),

    /// The input was malformed past the signature check, or a parameter
    /// (size list, image dimensions) violated the conversion contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Serializing an icon payload failed.  This indicates an internal
    /// invariant violation rather than a problem with the input.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// An underlying I/O operation failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

//===========================================================================//
