//! Run-length encoding.

use alloc::vec::Vec;

use crate::pixel::{PixelBuffer, Units};
use crate::stream::{Run, RunLengthStream, Runs};
use crate::{Limits, RleError};

/// Encode a buffer with default settings.
///
/// Shorthand for `EncodeRequest::new().encode(buffer)`.
pub fn encode(buffer: &PixelBuffer) -> Result<RunLengthStream, RleError> {
    EncodeRequest::new().encode(buffer)
}

/// Run-length encode request builder.
///
/// # Example
///
/// ```
/// use zenrle::{Channels, EncodeRequest, PixelBuffer};
///
/// let buffer = PixelBuffer::new(4, 1, Channels::Gray, vec![7, 7, 7, 7])?;
/// let stream = EncodeRequest::new().encode(&buffer)?;
/// assert_eq!(stream.to_string(), "4 1 1\n7 4\n");
/// # Ok::<(), zenrle::RleError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest<'a> {
    limits: Option<&'a Limits>,
}

impl<'a> EncodeRequest<'a> {
    pub fn new() -> Self {
        Self { limits: None }
    }

    /// Set resource limits.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Encode a pixel buffer.
    pub fn encode(&self, buffer: &PixelBuffer) -> Result<RunLengthStream, RleError> {
        if let Some(limits) = self.limits {
            limits
                .check_dimensions(u64::from(buffer.width()), u64::from(buffer.height()))
                .map_err(|e| RleError::LimitExceeded(e.into()))?;
        }

        let runs = match buffer.units() {
            Units::Gray(units) => Runs::Gray(collect_runs(units.iter().copied())),
            Units::Rgb(units) => Runs::Rgb(collect_runs(units.iter().copied())),
        };

        Ok(RunLengthStream::new(buffer.width(), buffer.height(), runs))
    }

    /// Encode raw row-major samples with an explicit channel count.
    ///
    /// Fails with [`RleError::UnsupportedChannelCount`] unless `channels` is 1 or 3.
    pub fn encode_samples(
        &self,
        samples: &[u8],
        width: u32,
        height: u32,
        channels: u8,
    ) -> Result<RunLengthStream, RleError> {
        let buffer = PixelBuffer::from_raw(width, height, u32::from(channels), samples.to_vec())?;
        self.encode(&buffer)
    }
}

/// Collapse a unit sequence into maximal runs.
fn collect_runs<T, I>(units: I) -> Vec<Run<T>>
where
    T: PartialEq + Copy,
    I: IntoIterator<Item = T>,
{
    let mut units = units.into_iter();
    let mut runs = Vec::new();
    let Some(first) = units.next() else {
        return runs;
    };

    let mut current = first;
    let mut count: u64 = 1;
    for unit in units {
        if unit == current {
            count += 1;
        } else {
            runs.push(Run::new(current, count));
            current = unit;
            count = 1;
        }
    }
    runs.push(Run::new(current, count));
    runs
}
