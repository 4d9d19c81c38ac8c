//! Raster operations: grayscale conversion and bilinear resize.

use crate::pixel::{Channels, PixelBuffer, Units};
#[cfg(feature = "resize")]
use crate::RleError;

/// Output range of [`to_grayscale_with`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LumaRange {
    /// BT.601 studio swing: `Y = ((66 R + 129 G + 25 B + 128) >> 8) + 16`,
    /// white is 235 and black is 16.
    #[default]
    Studio,
    /// Full swing: `Y = (77 R + 150 G + 29 B + 128) >> 8`, white is 255 and
    /// black is 0.
    Full,
}

impl LumaRange {
    fn luma(self, r: u8, g: u8, b: u8) -> u8 {
        let (r, g, b) = (u32::from(r), u32::from(g), u32::from(b));
        match self {
            LumaRange::Studio => (((66 * r + 129 * g + 25 * b + 128) >> 8) + 16) as u8,
            LumaRange::Full => ((77 * r + 150 * g + 29 * b + 128) >> 8) as u8,
        }
    }
}

/// Convert to a single-channel buffer with BT.601 studio-range luma.
///
/// Grayscale input is returned unchanged.
pub fn to_grayscale(buffer: &PixelBuffer) -> PixelBuffer {
    to_grayscale_with(buffer, LumaRange::Studio)
}

/// Convert to a single-channel buffer with BT.601 weights in `range`.
pub fn to_grayscale_with(buffer: &PixelBuffer, range: LumaRange) -> PixelBuffer {
    match buffer.units() {
        Units::Gray(_) => buffer.clone(),
        Units::Rgb(units) => {
            let samples = units.iter().map(|p| range.luma(p.r, p.g, p.b)).collect();
            PixelBuffer::from_parts(buffer.width(), buffer.height(), Channels::Gray, samples)
        }
    }
}

/// Resample to `width × height` with bilinear (triangle) filtering.
///
/// Interpolation is delegated to `image::imageops`.
#[cfg(feature = "resize")]
pub fn resize(buffer: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer, RleError> {
    use image::imageops::{self, FilterType};
    use image::{ImageBuffer, Luma, Rgb};

    if width == 0 || height == 0 {
        return Err(RleError::InvalidInput(alloc::format!(
            "resize target {width}x{height} has no pixels"
        )));
    }
    if buffer.is_empty() {
        return Err(RleError::InvalidInput(
            "cannot resize an image with no pixels".into(),
        ));
    }

    let shape_error = || RleError::InvalidInput("sample count does not match dimensions".into());
    let samples = buffer.samples().to_vec();
    let resized = match buffer.channels() {
        Channels::Gray => {
            let img = ImageBuffer::<Luma<u8>, _>::from_raw(buffer.width(), buffer.height(), samples)
                .ok_or_else(shape_error)?;
            imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
        }
        Channels::Rgb => {
            let img = ImageBuffer::<Rgb<u8>, _>::from_raw(buffer.width(), buffer.height(), samples)
                .ok_or_else(shape_error)?;
            imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
        }
    };

    PixelBuffer::new(width, height, buffer.channels(), resized)
}
