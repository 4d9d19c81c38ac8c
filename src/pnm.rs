//! Netpbm PGM/PPM adapter using image's pnm codec.
//!
//! Any maxval is accepted: 16-bit samples are scaled to 8 bits and PAM alpha
//! is dropped, so the result is always 8-bit gray or RGB.

extern crate std;

use std::io::Cursor;

use alloc::vec::Vec;
use image::codecs::pnm::{PnmDecoder, PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ColorType, ExtendedColorType, ImageDecoder, ImageEncoder};

use crate::pixel::{Channels, PixelBuffer, sample_len};
use crate::{ImageFormat, Limits, PnmEncoding, RleError};

/// Parse a PGM or PPM file.
pub fn decode(data: &[u8], limits: Option<&Limits>) -> Result<PixelBuffer, RleError> {
    let decoder =
        PnmDecoder::new(Cursor::new(data)).map_err(|e| RleError::from_codec(ImageFormat::Pnm, e))?;

    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();
    let channels = if color.has_color() {
        Channels::Rgb
    } else {
        Channels::Gray
    };

    if let Some(limits) = limits {
        limits
            .check_dimensions(u64::from(width), u64::from(height))
            .map_err(|e| RleError::LimitExceeded(e.into()))?;
    }
    sample_len(width, height, channels)?;
    let total = decoder.total_bytes();
    if let Some(limits) = limits {
        limits
            .check_memory(total)
            .map_err(|e| RleError::LimitExceeded(e.into()))?;
    }
    // The pnm decoder sizes its raster in u32.
    if total > u64::from(u32::MAX) {
        return Err(RleError::LimitExceeded(alloc::format!(
            "PNM raster of {total} bytes exceeds 4 GiB"
        )));
    }

    let mut raw = try_alloc(total)?;
    decoder
        .read_image(&mut raw)
        .map_err(|e| RleError::from_codec(ImageFormat::Pnm, e))?;

    let samples = narrow(&raw, color, channels)?;
    PixelBuffer::new(width, height, channels, samples)
}

/// Serialize a buffer as PGM (gray) or PPM (color) with maxval 255.
pub fn encode(buffer: &PixelBuffer, encoding: PnmEncoding) -> Result<Vec<u8>, RleError> {
    let samples = match encoding {
        PnmEncoding::Plain => SampleEncoding::Ascii,
        PnmEncoding::Binary => SampleEncoding::Binary,
    };
    let (subtype, color) = match buffer.channels() {
        Channels::Gray => (PnmSubtype::Graymap(samples), ExtendedColorType::L8),
        Channels::Rgb => (PnmSubtype::Pixmap(samples), ExtendedColorType::Rgb8),
    };

    let mut out = Vec::new();
    PnmEncoder::new(&mut out)
        .with_subtype(subtype)
        .write_image(buffer.samples(), buffer.width(), buffer.height(), color)
        .map_err(|e| RleError::from_codec(ImageFormat::Pnm, e))?;
    Ok(out)
}

fn try_alloc(total: u64) -> Result<Vec<u8>, RleError> {
    let too_large = || RleError::LimitExceeded(alloc::format!("cannot allocate {total} bytes"));
    let len = usize::try_from(total).map_err(|_| too_large())?;
    let mut raw = Vec::new();
    raw.try_reserve_exact(len).map_err(|_| too_large())?;
    raw.resize(len, 0);
    Ok(raw)
}

/// Drop alpha and scale 16-bit samples to 8 bits.
fn narrow(raw: &[u8], color: ColorType, channels: Channels) -> Result<Vec<u8>, RleError> {
    let pixel_bytes = usize::from(color.bytes_per_pixel());
    let sample_bytes = pixel_bytes / usize::from(color.channel_count());
    let to_u8: fn(&[u8]) -> u8 = match sample_bytes {
        1 => |s: &[u8]| s[0],
        2 => |s: &[u8]| ((u32::from(u16::from_ne_bytes([s[0], s[1]])) + 128) / 257) as u8,
        _ => return Err(RleError::UnsupportedFormat(ImageFormat::Pnm)),
    };
    let keep = channels.count() as usize;
    let out = raw
        .chunks_exact(pixel_bytes)
        .flat_map(|pixel| pixel.chunks_exact(sample_bytes).take(keep).map(to_u8))
        .collect();
    Ok(out)
}
