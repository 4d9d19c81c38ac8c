//! `gray` and `resize`: single-image raster operations.

use std::path::Path;

use anyhow::Context;
use zenrle::io::{self, SaveFormat};
use zenrle::{PixelBuffer, PnmEncoding, ops};

use crate::output::OutputConfig;
use crate::{GrayArgs, ResizeArgs, default_limits};

/// Run the `gray` subcommand.
pub fn gray(args: GrayArgs) -> anyhow::Result<()> {
    let pixels = load(&args.input)?;
    let gray = ops::to_grayscale_with(&pixels, args.luma_range());
    write(&args.input, args.output.as_deref(), "_gray", args.force, args.binary, &gray)
}

/// Run the `resize` subcommand.
pub fn resize(args: ResizeArgs) -> anyhow::Result<()> {
    let (width, height) = args.resolve_dimensions()?;
    let pixels = load(&args.input)?;
    let resized = ops::resize(&pixels, width, height)
        .with_context(|| format!("resizing {}", args.input.display()))?;
    write(&args.input, args.output.as_deref(), "_resized", args.force, args.binary, &resized)
}

/// Grayscale `input` into `output` (menu entry point).
pub fn gray_to(input: &Path, output: &Path) -> anyhow::Result<()> {
    let gray = ops::to_grayscale(&load(input)?);
    save(&gray, output)
}

/// Resize `input` into `output` (menu entry point).
pub fn resize_to(input: &Path, output: &Path, width: u32, height: u32) -> anyhow::Result<()> {
    let resized = ops::resize(&load(input)?, width, height)
        .with_context(|| format!("resizing {}", input.display()))?;
    save(&resized, output)
}

fn load(input: &Path) -> anyhow::Result<PixelBuffer> {
    io::load_image_with_limits(input, &default_limits())
        .with_context(|| format!("decoding {}", input.display()))
}

fn save(pixels: &PixelBuffer, output: &Path) -> anyhow::Result<()> {
    let format = SaveFormat::from_path(output).unwrap_or_default();
    io::save_image(pixels, output, format)
        .with_context(|| format!("writing {}", output.display()))
}

/// Output format: the -o extension, else the input's, else plain PNM.
fn target_format(input: &Path, output: Option<&Path>, binary: bool) -> SaveFormat {
    let format = output
        .and_then(SaveFormat::from_path)
        .or_else(|| SaveFormat::from_path(input))
        .unwrap_or_default();
    match format {
        SaveFormat::Pnm(_) if binary => SaveFormat::Pnm(PnmEncoding::Binary),
        other => other,
    }
}

fn write(
    input: &Path,
    output: Option<&str>,
    suffix: &str,
    force: bool,
    binary: bool,
    pixels: &PixelBuffer,
) -> anyhow::Result<()> {
    let config = OutputConfig::new(output, suffix, force, false);
    let format = target_format(input, config.target_file.as_deref(), binary);
    let path = config.resolve(input, 1, format.extension(pixels))?;
    let bytes = io::encode_image(pixels, format)
        .with_context(|| format!("encoding {}", path.display()))?;
    let size = config.write(input, &path, &bytes)?;
    tracing::info!(
        input = %input.display(),
        output = %path.display(),
        width = pixels.width(),
        height = pixels.height(),
        size,
        "wrote"
    );
    Ok(())
}
