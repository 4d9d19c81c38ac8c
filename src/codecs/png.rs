//! PNG codec adapter using png crate.
//!
//! Note: PNG codec requires std due to png crate's use of std::io traits.

extern crate std;

use std::io::Cursor;

use alloc::vec::Vec;

use crate::pixel::{Channels, PixelBuffer};
use crate::{ImageFormat, Limits, RleError};

/// Decode PNG to an 8-bit gray or RGB buffer.
///
/// Palettes are expanded and 16-bit samples stripped to 8 bits. Alpha is
/// dropped: gray+alpha becomes gray, RGBA becomes RGB.
pub(crate) fn decode(data: &[u8], limits: Option<&Limits>) -> Result<PixelBuffer, RleError> {
    let cursor = Cursor::new(data);
    let mut decoder = png::Decoder::new(cursor);
    decoder.set_transformations(png::Transformations::normalize_to_color8());

    let mut reader = decoder
        .read_info()
        .map_err(|e| RleError::from_codec(ImageFormat::Png, e))?;

    let info = reader.info();
    let width = info.width;
    let height = info.height;

    if let Some(limits) = limits {
        limits
            .check_dimensions(u64::from(width), u64::from(height))
            .map_err(|e| RleError::LimitExceeded(e.into()))?;
    }

    let buffer_size = reader
        .output_buffer_size()
        .ok_or_else(|| RleError::InvalidInput("cannot determine PNG output buffer size".into()))?;
    if let Some(limits) = limits {
        limits
            .check_memory(buffer_size as u64)
            .map_err(|e| RleError::LimitExceeded(e.into()))?;
    }
    let mut raw_pixels = alloc::vec![0u8; buffer_size];

    let output_info = reader
        .next_frame(&mut raw_pixels)
        .map_err(|e| RleError::from_codec(ImageFormat::Png, e))?;

    raw_pixels.truncate(output_info.buffer_size());

    let (decoded_color_type, _bit_depth) = reader.output_color_type();
    let stride = output_info.line_size;
    let rows = raw_pixels.chunks_exact(stride).take(height as usize);

    let (channels, samples): (Channels, Vec<u8>) = match decoded_color_type {
        png::ColorType::Grayscale => (Channels::Gray, packed_rows(rows, width, 1, 1)),
        png::ColorType::GrayscaleAlpha => (Channels::Gray, packed_rows(rows, width, 2, 1)),
        png::ColorType::Rgb => (Channels::Rgb, packed_rows(rows, width, 3, 3)),
        png::ColorType::Rgba => (Channels::Rgb, packed_rows(rows, width, 4, 3)),
        png::ColorType::Indexed => {
            return Err(RleError::InvalidInput(
                "PNG palette was not expanded".into(),
            ));
        }
    };

    PixelBuffer::new(width, height, channels, samples)
}

/// Copy the first `keep` samples of each `step`-sample pixel, row by row.
fn packed_rows<'a>(
    rows: impl Iterator<Item = &'a [u8]>,
    width: u32,
    step: usize,
    keep: usize,
) -> Vec<u8> {
    let mut out = Vec::new();
    for row in rows {
        for px in row.chunks_exact(step).take(width as usize) {
            out.extend_from_slice(&px[..keep]);
        }
    }
    out
}

/// Encode an 8-bit gray or RGB buffer to PNG.
pub(crate) fn encode(buffer: &PixelBuffer) -> Result<Vec<u8>, RleError> {
    let mut output = Vec::new();
    let mut encoder = png::Encoder::new(&mut output, buffer.width(), buffer.height());
    encoder.set_color(match buffer.channels() {
        Channels::Gray => png::ColorType::Grayscale,
        Channels::Rgb => png::ColorType::Rgb,
    });
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .map_err(|e| RleError::from_codec(ImageFormat::Png, e))?;

    writer
        .write_image_data(buffer.samples())
        .map_err(|e| RleError::from_codec(ImageFormat::Png, e))?;

    writer
        .finish()
        .map_err(|e| RleError::from_codec(ImageFormat::Png, e))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray_roundtrip() {
        let buf = PixelBuffer::new(3, 2, Channels::Gray, alloc::vec![0, 50, 100, 150, 200, 250])
            .unwrap();
        let png = encode(&buf).unwrap();
        assert_eq!(ImageFormat::detect(&png), Some(ImageFormat::Png));
        assert_eq!(decode(&png, None).unwrap(), buf);
    }

    #[test]
    fn rgb_roundtrip() {
        let buf = PixelBuffer::new(2, 2, Channels::Rgb, (0..12).map(|i| i * 20).collect())
            .unwrap();
        assert_eq!(decode(&encode(&buf).unwrap(), None).unwrap(), buf);
    }

    #[test]
    fn rgba_drops_alpha() {
        let mut output = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut output, 2, 1);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&[1, 2, 3, 0, 4, 5, 6, 255])
                .unwrap();
            writer.finish().unwrap();
        }
        let buf = decode(&output, None).unwrap();
        assert_eq!(buf.channels(), Channels::Rgb);
        assert_eq!(buf.samples(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn garbage_is_codec_error() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert!(matches!(
            decode(&data, None),
            Err(RleError::Codec {
                format: ImageFormat::Png,
                ..
            })
        ));
    }
}
