//! `compress` and `decompress`: raster files to run-length text and back.

use std::path::Path;

use anyhow::Context;
use zenrle::io::{self, SaveFormat};
use zenrle::{DecodeRequest, EncodeRequest, Limits, PixelBuffer, TruncationPolicy};

use crate::{batch, default_limits};
use crate::{CompressArgs, DecompressArgs};

/// Run the `compress` subcommand.
pub fn compress(args: CompressArgs) -> anyhow::Result<()> {
    let files = batch::expand_inputs(&args.batch.files, batch::is_raster)?;
    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let output_config = args.batch.output_config();
    let count = files.len();
    let summary = batch::run(&files, args.batch.jobs, |input| {
        let text = compress_file(input)?;
        let output = output_config.resolve(input, count, "rle")?;
        let size = output_config.write(input, &output, text.as_bytes())?;
        Ok((output, size))
    })?;

    batch::finish(&summary, args.batch.report)
}

/// Run the `decompress` subcommand.
pub fn decompress(args: DecompressArgs) -> anyhow::Result<()> {
    let files = batch::expand_inputs(&args.batch.files, batch::is_stream)?;
    if files.is_empty() {
        anyhow::bail!("no run-length files found");
    }

    let output_config = args.batch.output_config();
    let format = args.format.save_format(args.binary);
    let policy = args.truncation_policy();
    let limits = args.limits();
    let count = files.len();
    let summary = batch::run(&files, args.batch.jobs, |input| {
        let pixels = decompress_file(input, policy, &limits)?;
        let bytes = io::encode_image(&pixels, format)
            .with_context(|| format!("encoding {}", input.display()))?;
        let output = output_config.resolve(input, count, format.extension(&pixels))?;
        let size = output_config.write(input, &output, &bytes)?;
        Ok((output, size))
    })?;

    batch::finish(&summary, args.batch.report)
}

/// Load a raster and return its run-length text.
pub fn compress_file(input: &Path) -> anyhow::Result<String> {
    let pixels = io::load_image_with_limits(input, &default_limits())
        .with_context(|| format!("decoding {}", input.display()))?;
    let stream = EncodeRequest::new()
        .encode(&pixels)
        .with_context(|| format!("encoding {}", input.display()))?;
    tracing::debug!(
        input = %input.display(),
        width = stream.width,
        height = stream.height,
        runs = stream.runs.len(),
        "compressed"
    );
    Ok(stream.to_string())
}

/// Parse a run-length file and expand it.
///
/// A short stream is zero-filled and logged as a warning unless `policy`
/// rejects it.
pub fn decompress_file(
    input: &Path,
    policy: TruncationPolicy,
    limits: &Limits,
) -> anyhow::Result<PixelBuffer> {
    let stream =
        io::load_stream(input).with_context(|| format!("reading {}", input.display()))?;
    let decoded = DecodeRequest::new(&stream)
        .with_limits(limits)
        .with_truncation(policy)
        .decode()
        .with_context(|| format!("decoding {}", input.display()))?;

    if let Some(t) = decoded.truncation {
        tracing::warn!(
            input = %input.display(),
            expected = t.expected,
            decoded = t.decoded,
            "stream is truncated; {} missing pixels set to 0",
            t.missing()
        );
    }
    if decoded.excess_units > 0 {
        tracing::warn!(
            input = %input.display(),
            excess = decoded.excess_units,
            "stream has more pixels than its header declares; extra runs ignored"
        );
    }

    Ok(decoded.into_pixels())
}

/// Decompress one file into an explicit output path (menu entry point).
pub fn decompress_to(input: &Path, output: &Path, policy: TruncationPolicy) -> anyhow::Result<()> {
    let pixels = decompress_file(input, policy, &default_limits())?;
    let format = SaveFormat::from_path(output).unwrap_or_default();
    io::save_image(&pixels, output, format)
        .with_context(|| format!("writing {}", output.display()))
}
