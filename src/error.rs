//! Unified error types for codec and raster I/O operations.

use alloc::boxed::Box;
use alloc::string::String;

use crate::format::ImageFormat;

/// Unified error type for zenrle operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RleError {
    /// Buffer or stream declares a channel count other than 1 or 3.
    #[error("unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannelCount(u32),

    /// Header or run tokens do not have the expected integer shape.
    #[error("malformed run-length stream at token {position}: {detail}")]
    MalformedStream {
        /// Zero-based index of the offending whitespace-separated token.
        position: usize,
        detail: String,
    },

    /// Runs cover fewer pixels than the header declares.
    ///
    /// Only returned under [`TruncationPolicy::Reject`](crate::TruncationPolicy::Reject);
    /// the default policy reports this through [`DecodeOutput::truncation`](crate::DecodeOutput)
    /// instead.
    #[error("run-length stream truncated: {decoded} of {expected} pixels present")]
    TruncatedStream { expected: u64, decoded: u64 },

    /// Input validation failed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Resource limit exceeded.
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Raster data not recognized from its magic bytes.
    #[error("unrecognized image format")]
    UnrecognizedFormat,

    /// Format recognized but its codec is not compiled in.
    #[error("format {0:?} not supported (codec not compiled in)")]
    UnsupportedFormat(ImageFormat),

    /// Underlying codec error.
    #[error("codec error ({format:?}): {source}")]
    Codec {
        format: ImageFormat,
        source: Box<dyn core::error::Error + Send + Sync>,
    },

    /// Filesystem error while loading or saving.
    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RleError {
    /// Wrap a codec-specific error.
    pub fn from_codec<E>(format: ImageFormat, error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        RleError::Codec {
            format,
            source: Box::new(error),
        }
    }

    pub(crate) fn malformed(position: usize, detail: impl Into<String>) -> Self {
        RleError::MalformedStream {
            position,
            detail: detail.into(),
        }
    }
}
