//! Image format detection and metadata.

use crate::pixel::Channels;

/// Formats zenrle reads and writes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Netpbm PGM/PPM, plain (`P2`/`P3`) or binary (`P5`/`P6`).
    Pnm,
    /// PNG, through the `png` crate.
    Png,
    /// Textual run-length stream.
    Rle,
}

impl ImageFormat {
    /// Detect format from magic bytes. Returns None if unrecognized.
    ///
    /// A run-length stream has no magic; it is recognized by a leading
    /// decimal digit (its width), after optional whitespace.
    pub fn detect(data: &[u8]) -> Option<Self> {
        // PNM: "P2", "P3", "P5" or "P6" followed by whitespace
        if data.len() >= 3
            && data[0] == b'P'
            && matches!(data[1], b'2' | b'3' | b'5' | b'6')
            && data[2].is_ascii_whitespace()
        {
            return Some(ImageFormat::Pnm);
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.len() >= 8
            && data[0] == 0x89
            && data[1] == 0x50
            && data[2] == 0x4E
            && data[3] == 0x47
            && data[4] == 0x0D
            && data[5] == 0x0A
            && data[6] == 0x1A
            && data[7] == 0x0A
        {
            return Some(ImageFormat::Png);
        }

        let first = data.iter().find(|b| !b.is_ascii_whitespace())?;
        if first.is_ascii_digit() {
            return Some(ImageFormat::Rle);
        }

        None
    }

    /// Detect format from file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            "png" => Some(ImageFormat::Png),
            "rle" => Some(ImageFormat::Rle),
            _ => None,
        }
    }

    /// MIME type string.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Pnm => "image/x-portable-anymap",
            ImageFormat::Png => "image/png",
            ImageFormat::Rle => "text/plain",
        }
    }

    /// Common file extensions.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Pnm => &["pnm", "pgm", "ppm"],
            ImageFormat::Png => &["png"],
            ImageFormat::Rle => &["rle"],
        }
    }

    /// Whether this format holds raster pixels (as opposed to runs).
    pub fn is_raster(self) -> bool {
        match self {
            ImageFormat::Pnm => true,
            ImageFormat::Png => true,
            ImageFormat::Rle => false,
        }
    }
}

/// Sample encoding of a PNM file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PnmEncoding {
    /// ASCII decimal samples (`P2` gray, `P3` color).
    #[default]
    Plain,
    /// Raw bytes (`P5` gray, `P6` color).
    Binary,
}

impl PnmEncoding {
    /// Conventional file extension (`pgm` or `ppm`).
    pub fn extension(channels: Channels) -> &'static str {
        match channels {
            Channels::Gray => "pgm",
            Channels::Rgb => "ppm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_plain_pgm() {
        assert_eq!(ImageFormat::detect(b"P2\n2 2\n255\n"), Some(ImageFormat::Pnm));
    }

    #[test]
    fn detect_binary_ppm() {
        assert_eq!(ImageFormat::detect(b"P6 1 1 255 \x00\x00\x00"), Some(ImageFormat::Pnm));
    }

    #[test]
    fn detect_png() {
        let data = [
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
        ];
        assert_eq!(ImageFormat::detect(&data), Some(ImageFormat::Png));
    }

    #[test]
    fn detect_rle() {
        assert_eq!(ImageFormat::detect(b"4 1 1\n7 4\n"), Some(ImageFormat::Rle));
        assert_eq!(ImageFormat::detect(b"\n 0 0 3\n"), Some(ImageFormat::Rle));
    }

    #[test]
    fn detect_unrecognized() {
        assert_eq!(ImageFormat::detect(b"P7\n"), None);
        assert_eq!(ImageFormat::detect(b"GIF89a"), None);
        assert_eq!(ImageFormat::detect(b""), None);
    }

    #[test]
    fn from_extension_case_insensitive() {
        assert_eq!(ImageFormat::from_extension("PPM"), Some(ImageFormat::Pnm));
        assert_eq!(ImageFormat::from_extension("Png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("rle"), Some(ImageFormat::Rle));
        assert_eq!(ImageFormat::from_extension("jpg"), None);
    }

    #[test]
    fn pnm_extension_follows_channels() {
        assert_eq!(PnmEncoding::extension(Channels::Gray), "pgm");
        assert_eq!(PnmEncoding::extension(Channels::Rgb), "ppm");
        assert_eq!(PnmEncoding::default(), PnmEncoding::Plain);
    }
}
