//! Run-length decoding.

use rgb::Rgb;

use crate::pixel::{PixelBuffer, sample_len};
use crate::stream::{Run, RunLengthStream, Runs};
use crate::{Limits, RleError, TruncationPolicy};

/// Runs covered fewer pixels than the header declared.
///
/// The missing tail of the buffer was left at 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Truncation {
    /// Pixels declared by the header (`width * height`).
    pub expected: u64,
    /// Pixels actually present in the runs.
    pub decoded: u64,
}

impl Truncation {
    /// Number of zero-filled pixels.
    pub fn missing(&self) -> u64 {
        self.expected - self.decoded
    }
}

/// Decoded run-length output.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    /// Reconstructed raster.
    pub pixels: PixelBuffer,
    /// Set when the stream was short and the remainder was zero-filled.
    pub truncation: Option<Truncation>,
    /// Pixels present in the runs beyond `width * height` (ignored).
    pub excess_units: u64,
}

impl DecodeOutput {
    /// Image width in pixels (convenience accessor).
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Image height in pixels (convenience accessor).
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Whether the stream described the raster exactly.
    pub fn is_exact(&self) -> bool {
        self.truncation.is_none() && self.excess_units == 0
    }

    pub fn into_pixels(self) -> PixelBuffer {
        self.pixels
    }
}

/// Decode a stream with default settings (no limits, zero-fill on truncation).
pub fn decode(stream: &RunLengthStream) -> Result<DecodeOutput, RleError> {
    DecodeRequest::new(stream).decode()
}

/// Run-length decode request builder.
///
/// # Example
///
/// ```
/// use zenrle::{DecodeRequest, RunLengthStream};
///
/// let stream: RunLengthStream = "2 2 1\n5 3".parse()?;
/// let output = DecodeRequest::new(&stream).decode()?;
/// assert_eq!(output.pixels.samples(), &[5, 5, 5, 0]);
/// assert_eq!(output.truncation.map(|t| t.missing()), Some(1));
/// # Ok::<(), zenrle::RleError>(())
/// ```
pub struct DecodeRequest<'a> {
    stream: &'a RunLengthStream,
    limits: Option<&'a Limits>,
    truncation: TruncationPolicy,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(stream: &'a RunLengthStream) -> Self {
        Self {
            stream,
            limits: None,
            truncation: TruncationPolicy::default(),
        }
    }

    /// Set resource limits, checked before the output is allocated.
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Choose how a short stream is handled.
    pub fn with_truncation(mut self, policy: TruncationPolicy) -> Self {
        self.truncation = policy;
        self
    }

    /// Expand the runs into a pixel buffer.
    pub fn decode(self) -> Result<DecodeOutput, RleError> {
        let stream = self.stream;
        let channels = stream.channels();

        if let Some(limits) = self.limits {
            limits
                .check_dimensions(u64::from(stream.width), u64::from(stream.height))
                .map_err(|e| RleError::LimitExceeded(e.into()))?;
        }
        let len = sample_len(stream.width, stream.height, channels)?;
        if let Some(limits) = self.limits {
            limits
                .check_memory(len as u64)
                .map_err(|e| RleError::LimitExceeded(e.into()))?;
        }

        let mut samples =
            PixelBuffer::zeroed(stream.width, stream.height, channels)?.into_samples();
        let written = match &stream.runs {
            Runs::Gray(runs) => expand(runs, &mut samples, |v| [v]),
            Runs::Rgb(runs) => expand(runs, &mut samples, |p: Rgb<u8>| [p.r, p.g, p.b]),
        };

        let declared = stream.declared_units();
        let present = stream.unit_count();
        debug_assert_eq!(written as u64, present.min(declared));

        let truncation = (present < declared).then_some(Truncation {
            expected: declared,
            decoded: present,
        });
        if let (Some(t), TruncationPolicy::Reject) = (truncation, self.truncation) {
            return Err(RleError::TruncatedStream {
                expected: t.expected,
                decoded: t.decoded,
            });
        }

        Ok(DecodeOutput {
            pixels: PixelBuffer::new(stream.width, stream.height, channels, samples)?,
            truncation,
            excess_units: present.saturating_sub(declared),
        })
    }
}

/// Write runs into `out` in order, stopping once it is full.
///
/// Returns the number of units written.
fn expand<T, const N: usize>(
    runs: &[Run<T>],
    out: &mut [u8],
    unit_samples: impl Fn(T) -> [u8; N],
) -> usize
where
    T: Copy,
{
    let mut chunks = out.chunks_exact_mut(N);
    let mut written = 0;
    'runs: for run in runs {
        let samples = unit_samples(run.value);
        for _ in 0..run.count {
            match chunks.next() {
                Some(chunk) => chunk.copy_from_slice(&samples),
                None => break 'runs,
            }
            written += 1;
        }
    }
    written
}
