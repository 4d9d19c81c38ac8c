//! Image inspection: the "display" operation.

use std::io::{self, Write};
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use zenrle::{ImageFormat, text};

use crate::InfoArgs;
use crate::batch;

/// Run the `info` subcommand.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let files = batch::expand_inputs(&args.files, batch::is_any)?;

    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let multi = files.len() > 1;
    let mut failed = 0usize;

    for (i, path) in files.iter().enumerate() {
        if multi && !args.json {
            if i > 0 {
                println!();
            }
            println!("{}:", path.display());
        }

        match describe(path) {
            Ok(info) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    write_info(&mut std::io::stdout().lock(), &info)?;
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("  error: {e:#}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} files could not be read", files.len());
    }
    Ok(())
}

/// Describe a raster or run-length file.
pub fn describe(path: &Path) -> anyhow::Result<ImageDescription> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let file_size = data.len() as u64;
    let format = ImageFormat::detect(&data)
        .ok_or_else(|| anyhow::anyhow!("unrecognized image format: {}", path.display()))?;

    let mut info = ImageDescription {
        path: path.display().to_string(),
        format: format!("{format:?}"),
        mime_type: format.mime_type().to_string(),
        width: 0,
        height: 0,
        channels: 0,
        file_size,
        stream: None,
    };

    if format == ImageFormat::Rle {
        let text = std::str::from_utf8(&data)
            .with_context(|| format!("{} is not valid text", path.display()))?;
        let stream = text::parse(text)?;
        info.width = stream.width;
        info.height = stream.height;
        info.channels = stream.channels().count() as u8;
        let raw_bytes = stream.declared_units() * u64::from(info.channels);
        info.stream = Some(StreamDescription {
            runs: stream.runs.len(),
            pixels_covered: stream.unit_count(),
            raw_bytes,
            ratio: (raw_bytes > 0).then(|| file_size as f64 / raw_bytes as f64),
        });
    } else {
        let pixels = zenrle::io::decode_image(&data, Some(&crate::default_limits()))?;
        info.width = pixels.width();
        info.height = pixels.height();
        info.channels = pixels.channels().count() as u8;
    }

    Ok(info)
}

#[derive(Debug, Serialize)]
pub struct ImageDescription {
    pub path: String,
    pub format: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<StreamDescription>,
}

#[derive(Debug, Serialize)]
pub struct StreamDescription {
    pub runs: usize,
    pub pixels_covered: u64,
    /// Uncompressed 8-bit sample bytes the header declares.
    pub raw_bytes: u64,
    /// File size over `raw_bytes`.
    pub ratio: Option<f64>,
}

/// Write the human-readable description.
pub fn write_info(out: &mut impl Write, info: &ImageDescription) -> io::Result<()> {
    writeln!(out, "  Format:       {} ({})", info.format, info.mime_type)?;
    writeln!(out, "  Dimensions:   {}x{}", info.width, info.height)?;
    writeln!(
        out,
        "  Channels:     {} ({})",
        info.channels,
        if info.channels == 1 { "gray" } else { "rgb" }
    )?;
    if let Some(ref stream) = info.stream {
        writeln!(out, "  Runs:         {}", stream.runs)?;
        let declared = u64::from(info.width) * u64::from(info.height);
        if stream.pixels_covered != declared {
            writeln!(
                out,
                "  Coverage:     {} of {} pixels",
                stream.pixels_covered, declared
            )?;
        }
        writeln!(out, "  Raw size:     {}", batch::format_size(stream.raw_bytes))?;
        if let Some(ratio) = stream.ratio {
            writeln!(out, "  Ratio:        {:.3}", ratio)?;
        }
    }
    writeln!(out, "  File size:    {}", batch::format_size(info.file_size))
}
