//! Raster and stream file I/O.
//!
//! These are the collaborators around the codec: they turn files into
//! [`PixelBuffer`]s and back, and move [`RunLengthStream`]s to and from disk.

extern crate std;

use std::fs;
use std::path::Path;

use alloc::vec::Vec;

use crate::pixel::PixelBuffer;
use crate::stream::RunLengthStream;
use crate::{ImageFormat, Limits, PnmEncoding, RleError};

/// Target format for [`save_image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    /// PGM for gray, PPM for color.
    Pnm(PnmEncoding),
    /// 8-bit PNG.
    Png,
}

impl Default for SaveFormat {
    fn default() -> Self {
        SaveFormat::Pnm(PnmEncoding::Plain)
    }
}

impl SaveFormat {
    /// File extension for a buffer with the given layout.
    pub fn extension(self, buffer: &PixelBuffer) -> &'static str {
        match self {
            SaveFormat::Pnm(_) => PnmEncoding::extension(buffer.channels()),
            SaveFormat::Png => "png",
        }
    }

    /// Pick a format from a path's extension; `None` if it is not a raster
    /// extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ImageFormat::from_extension(ext)? {
            ImageFormat::Pnm => Some(SaveFormat::Pnm(PnmEncoding::Plain)),
            ImageFormat::Png => Some(SaveFormat::Png),
            _ => None,
        }
    }
}

/// Decode raster bytes, detecting the format from magic bytes.
pub fn decode_image(data: &[u8], limits: Option<&Limits>) -> Result<PixelBuffer, RleError> {
    match ImageFormat::detect(data).ok_or(RleError::UnrecognizedFormat)? {
        #[cfg(feature = "pnm")]
        ImageFormat::Pnm => crate::pnm::decode(data, limits),
        #[cfg(not(feature = "pnm"))]
        ImageFormat::Pnm => Err(RleError::UnsupportedFormat(ImageFormat::Pnm)),
        #[cfg(feature = "png")]
        ImageFormat::Png => crate::codecs::png::decode(data, limits),
        #[cfg(not(feature = "png"))]
        ImageFormat::Png => Err(RleError::UnsupportedFormat(ImageFormat::Png)),
        ImageFormat::Rle => Err(RleError::InvalidInput(
            "data is a run-length stream, not a raster; decode it with DecodeRequest".into(),
        )),
    }
}

/// Encode a buffer to raster bytes.
pub fn encode_image(buffer: &PixelBuffer, format: SaveFormat) -> Result<Vec<u8>, RleError> {
    match format {
        #[cfg(feature = "pnm")]
        SaveFormat::Pnm(encoding) => crate::pnm::encode(buffer, encoding),
        #[cfg(not(feature = "pnm"))]
        SaveFormat::Pnm(_) => Err(RleError::UnsupportedFormat(ImageFormat::Pnm)),
        #[cfg(feature = "png")]
        SaveFormat::Png => crate::codecs::png::encode(buffer),
        #[cfg(not(feature = "png"))]
        SaveFormat::Png => Err(RleError::UnsupportedFormat(ImageFormat::Png)),
    }
}

/// Load a PGM, PPM or PNG file.
pub fn load_image(path: impl AsRef<Path>) -> Result<PixelBuffer, RleError> {
    let data = fs::read(path.as_ref())?;
    decode_image(&data, None)
}

/// Load a raster, refusing headers beyond `limits` before the pixels are
/// allocated.
pub fn load_image_with_limits(
    path: impl AsRef<Path>,
    limits: &Limits,
) -> Result<PixelBuffer, RleError> {
    let data = fs::read(path.as_ref())?;
    decode_image(&data, Some(limits))
}

/// Save a buffer in the given format, writing the file in one pass.
pub fn save_image(
    buffer: &PixelBuffer,
    path: impl AsRef<Path>,
    format: SaveFormat,
) -> Result<(), RleError> {
    let bytes = encode_image(buffer, format)?;
    fs::write(path.as_ref(), bytes)?;
    Ok(())
}

/// Read and parse a run-length stream file.
pub fn load_stream(path: impl AsRef<Path>) -> Result<RunLengthStream, RleError> {
    let file = fs::File::open(path.as_ref())?;
    crate::text::read_from(file)
}

/// Serialize a run-length stream to a file.
pub fn save_stream(stream: &RunLengthStream, path: impl AsRef<Path>) -> Result<(), RleError> {
    let file = fs::File::create(path.as_ref())?;
    crate::text::write_to(stream, file)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::Channels;

    #[test]
    fn default_save_format_is_plain_pnm() {
        assert_eq!(SaveFormat::default(), SaveFormat::Pnm(PnmEncoding::Plain));
    }

    #[test]
    fn save_format_from_path() {
        assert_eq!(
            SaveFormat::from_path(Path::new("a/b.PGM")),
            Some(SaveFormat::Pnm(PnmEncoding::Plain))
        );
        assert_eq!(SaveFormat::from_path(Path::new("x.png")), Some(SaveFormat::Png));
        assert_eq!(SaveFormat::from_path(Path::new("x.rle")), None);
        assert_eq!(SaveFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn extension_follows_channels() {
        let gray = PixelBuffer::new(1, 1, Channels::Gray, alloc::vec![0]).unwrap();
        let rgb = PixelBuffer::new(1, 1, Channels::Rgb, alloc::vec![0, 0, 0]).unwrap();
        let plain = SaveFormat::default();
        assert_eq!(plain.extension(&gray), "pgm");
        assert_eq!(plain.extension(&rgb), "ppm");
        assert_eq!(SaveFormat::Png.extension(&rgb), "png");
    }

    #[cfg(feature = "pnm")]
    #[test]
    fn decode_image_dispatches_on_magic() {
        let buf = decode_image(b"P2\n1 1\n255\n9\n", None).unwrap();
        assert_eq!(buf.samples(), &[9]);
        assert!(matches!(
            decode_image(b"GIF89a", None),
            Err(RleError::UnrecognizedFormat)
        ));
        assert!(matches!(
            decode_image(b"1 1 1\n9 1\n", None),
            Err(RleError::InvalidInput(_))
        ));
    }
}
