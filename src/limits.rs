//! Resource limits and decode policies.

/// Resource limits for decode/encode operations.
///
/// A run-length header is untrusted input: `4000000000 4000000000 3` is a
/// valid header that would ask for an absurd allocation. All limits are optional.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    /// Maximum image width in pixels.
    pub max_width: Option<u64>,
    /// Maximum image height in pixels.
    pub max_height: Option<u64>,
    /// Maximum total pixels (width × height).
    pub max_pixels: Option<u64>,
    /// Maximum memory allocation in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Create a new Limits with no restrictions.
    pub fn none() -> Self {
        Self::default()
    }

    /// Check if dimensions are within limits.
    ///
    /// Returns `Err` with a description if any limit is exceeded.
    pub fn check_dimensions(&self, width: u64, height: u64) -> Result<(), &'static str> {
        if let Some(max_width) = self.max_width {
            if width > max_width {
                return Err("width exceeds limit");
            }
        }

        if let Some(max_height) = self.max_height {
            if height > max_height {
                return Err("height exceeds limit");
            }
        }

        if let Some(max_pixels) = self.max_pixels {
            let pixels = width.saturating_mul(height);
            if pixels > max_pixels {
                return Err("pixel count exceeds limit");
            }
        }

        Ok(())
    }

    /// Check if a memory allocation is within limits.
    pub fn check_memory(&self, bytes: u64) -> Result<(), &'static str> {
        if let Some(max_memory) = self.max_memory_bytes {
            if bytes > max_memory {
                return Err("memory allocation exceeds limit");
            }
        }
        Ok(())
    }
}

/// What the decoder does when runs cover fewer pixels than the header declares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TruncationPolicy {
    /// Leave missing pixels at 0 and report the shortfall in
    /// [`DecodeOutput::truncation`](crate::DecodeOutput).
    #[default]
    ZeroFill,
    /// Fail with [`RleError::TruncatedStream`](crate::RleError::TruncatedStream).
    Reject,
}
