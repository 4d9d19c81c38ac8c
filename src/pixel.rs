//! In-memory raster: dimensions, channel count and row-major samples.
//!
//! RGB samples are always interleaved (`r g b r g b ...`), never planar, so the
//! codec can view them as `&[Rgb<u8>]` without copying.

use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::Rgb;

use crate::RleError;

/// Number of interleaved 8-bit channels per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channels {
    /// One luminance sample per pixel.
    Gray,
    /// An `(r, g, b)` triple per pixel.
    Rgb,
}

impl Channels {
    /// Map a raw channel count to a layout.
    pub fn from_count(count: u32) -> Result<Self, RleError> {
        match count {
            1 => Ok(Channels::Gray),
            3 => Ok(Channels::Rgb),
            other => Err(RleError::UnsupportedChannelCount(other)),
        }
    }

    /// Samples per pixel (1 or 3).
    pub fn count(self) -> u32 {
        match self {
            Channels::Gray => 1,
            Channels::Rgb => 3,
        }
    }
}

/// Decoded 8-bit raster.
///
/// Immutable once constructed; the sample vector length always equals
/// `width * height * channels`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    samples: Vec<u8>,
}

/// Borrowed pixel units of a [`PixelBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Units<'a> {
    Gray(&'a [u8]),
    Rgb(&'a [Rgb<u8>]),
}

impl PixelBuffer {
    /// Wrap row-major samples.
    ///
    /// Fails with [`RleError::InvalidInput`] when the sample count does not
    /// match the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        samples: Vec<u8>,
    ) -> Result<Self, RleError> {
        let expected = sample_len(width, height, channels)?;
        if samples.len() != expected {
            return Err(RleError::InvalidInput(alloc::format!(
                "{}x{} {:?} needs {} samples, got {}",
                width,
                height,
                channels,
                expected,
                samples.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// Wrap row-major samples with a raw channel count.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u32,
        samples: Vec<u8>,
    ) -> Result<Self, RleError> {
        Self::new(width, height, Channels::from_count(channels)?, samples)
    }

    /// Crate-internal constructor for callers that preserve the pixel count.
    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        channels: Channels,
        samples: Vec<u8>,
    ) -> Self {
        debug_assert_eq!(
            sample_len(width, height, channels).ok(),
            Some(samples.len())
        );
        Self {
            width,
            height,
            channels,
            samples,
        }
    }

    /// All-zero buffer of the given shape.
    ///
    /// The allocation is fallible: a shape the allocator cannot satisfy is
    /// [`RleError::LimitExceeded`], never an abort.
    pub fn zeroed(width: u32, height: u32, channels: Channels) -> Result<Self, RleError> {
        let len = sample_len(width, height, channels)?;
        let mut samples = Vec::new();
        samples.try_reserve_exact(len).map_err(|_| {
            RleError::LimitExceeded(alloc::format!(
                "cannot allocate {len} bytes for {width}x{height}"
            ))
        })?;
        samples.resize(len, 0);
        Ok(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn from_rgb_img(img: ImgRef<'_, Rgb<u8>>) -> Result<Self, RleError> {
        let (buf, width, height) = img.to_contiguous_buf();
        let samples: &[u8] = bytemuck::cast_slice(&*buf);
        Self::new(
            dim_u32(width)?,
            dim_u32(height)?,
            Channels::Rgb,
            samples.to_vec(),
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.samples.len() / self.channels.count() as usize
    }

    /// Whether the buffer holds no pixels.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Raw interleaved samples in row-major order.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<u8> {
        self.samples
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    pub fn row(&self, y: u32) -> &[u8] {
        let stride = self.width as usize * self.channels.count() as usize;
        let start = y as usize * stride;
        &self.samples[start..start + stride]
    }

    /// Typed view of the pixels: bytes for gray, triples for RGB.
    pub fn units(&self) -> Units<'_> {
        match self.channels {
            Channels::Gray => Units::Gray(self.samples.as_slice()),
            Channels::Rgb => Units::Rgb(bytemuck::cast_slice(self.samples.as_slice())),
        }
    }

    /// Copy into an `imgref` image, broadcasting gray to RGB when needed.
    pub fn to_rgb_img(&self) -> ImgVec<Rgb<u8>> {
        let pixels: Vec<Rgb<u8>> = match self.channels {
            Channels::Rgb => bytemuck::cast_slice(self.samples.as_slice()).to_vec(),
            Channels::Gray => self.samples.iter().map(|&v| Rgb::new(v, v, v)).collect(),
        };
        ImgVec::new(pixels, self.width as usize, self.height as usize)
    }
}

/// `width * height * channels`, bounded by the largest allocation Rust
/// permits (`isize::MAX` bytes).
pub(crate) fn sample_len(width: u32, height: u32, channels: Channels) -> Result<usize, RleError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels.count() as usize))
        .filter(|&n| n <= isize::MAX as usize)
        .ok_or_else(|| {
            RleError::LimitExceeded(alloc::format!(
                "{}x{}x{} overflows the address space",
                width,
                height,
                channels.count()
            ))
        })
}

fn dim_u32(value: usize) -> Result<u32, RleError> {
    u32::try_from(value)
        .map_err(|_| RleError::InvalidInput(alloc::format!("dimension {} exceeds u32", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_sample_count() {
        let err = PixelBuffer::new(2, 2, Channels::Rgb, alloc::vec![0; 11]).unwrap_err();
        assert!(matches!(err, RleError::InvalidInput(_)));
    }

    #[test]
    fn rejects_four_channels() {
        let err = PixelBuffer::from_raw(1, 1, 4, alloc::vec![0; 4]).unwrap_err();
        assert!(matches!(err, RleError::UnsupportedChannelCount(4)));
    }

    #[test]
    fn empty_buffer_is_allowed() {
        let buf = PixelBuffer::new(0, 0, Channels::Gray, Vec::new()).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.pixel_count(), 0);
    }

    #[test]
    fn rgb_units_are_interleaved_triples() {
        let buf =
            PixelBuffer::new(2, 1, Channels::Rgb, alloc::vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(
            buf.units(),
            Units::Rgb(&[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)])
        );
    }

    #[test]
    fn gray_units_are_the_samples() {
        let buf = PixelBuffer::new(3, 1, Channels::Gray, alloc::vec![7, 8, 9]).unwrap();
        assert_eq!(buf.units(), Units::Gray(&[7, 8, 9]));
    }

    #[test]
    fn zeroed_has_the_declared_shape() {
        let buf = PixelBuffer::zeroed(3, 2, Channels::Rgb).unwrap();
        assert_eq!(buf.samples(), &[0; 18]);
        assert_eq!(buf.pixel_count(), 6);
    }

    #[test]
    fn lengths_beyond_isize_are_refused() {
        let result = PixelBuffer::zeroed(4_000_000_000, 4_000_000_000, Channels::Gray);
        assert!(matches!(result, Err(RleError::LimitExceeded(_))));
        assert!(sample_len(u32::MAX, u32::MAX, Channels::Rgb).is_err());
    }

    #[test]
    fn rows_are_row_major() {
        let buf = PixelBuffer::new(2, 2, Channels::Gray, alloc::vec![1, 2, 3, 4]).unwrap();
        assert_eq!(buf.row(0), &[1, 2]);
        assert_eq!(buf.row(1), &[3, 4]);
    }

    #[test]
    fn imgref_roundtrip() {
        let buf =
            PixelBuffer::new(1, 2, Channels::Rgb, alloc::vec![9, 8, 7, 6, 5, 4]).unwrap();
        let img = buf.to_rgb_img();
        assert_eq!(img.width(), 1);
        assert_eq!(img.height(), 2);
        let back = PixelBuffer::from_rgb_img(img.as_ref()).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn gray_broadcasts_to_rgb() {
        let buf = PixelBuffer::new(1, 1, Channels::Gray, alloc::vec![42]).unwrap();
        let img = buf.to_rgb_img();
        assert_eq!(img.buf()[0], Rgb::new(42, 42, 42));
    }
}
