//! zrimg: run-length image compressor.
//!
//! Compresses PGM/PPM/PNG rasters into the textual run-length format, expands
//! them back, and offers the small raster toolbox around it (grayscale,
//! resize, inspect). With no subcommand it starts the interactive menu.

mod batch;
mod codec;
mod info;
mod logging;
mod menu;
mod output;
mod transform;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use zenrle::io::SaveFormat;
use zenrle::ops::LumaRange;
use zenrle::{Limits, PnmEncoding, TruncationPolicy};

use crate::logging::{LogFormat, LogLevel, init_logging};
use crate::output::OutputConfig;

/// Pixel cap for every header read from disk unless `--max-pixels` overrides it.
pub const DEFAULT_MAX_PIXELS: u64 = 100_000_000;

/// Limits capping the declared pixel count.
pub fn pixel_limits(max_pixels: u64) -> Limits {
    Limits {
        max_pixels: Some(max_pixels),
        ..Limits::none()
    }
}

/// Limits used where no flag is available (menu, raster inputs).
pub fn default_limits() -> Limits {
    pixel_limits(DEFAULT_MAX_PIXELS)
}

#[derive(Parser, Debug)]
#[command(name = "zrimg", version, about = "Run-length image compressor and raster toolbox")]
struct Cli {
    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        global = true,
        env = "ZRIMG_LOG_LEVEL"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress rasters into run-length text files (.rle).
    Compress(CompressArgs),

    /// Expand run-length files back into rasters.
    Decompress(DecompressArgs),

    /// Convert a color image to grayscale.
    Gray(GrayArgs),

    /// Resample an image to new dimensions (bilinear).
    Resize(ResizeArgs),

    /// Describe images and run-length files.
    Info(InfoArgs),

    /// Interactive menu (default when no subcommand is given).
    Menu,
}

/// Input and output options shared by the batch subcommands.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input files, directories or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Output file or directory (dir/ with trailing slash for batch).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Filename suffix before extension (default: none).
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Allow overwriting existing files.
    #[arg(long)]
    pub force: bool,

    /// Show what would be done without writing files.
    #[arg(long)]
    pub dry_run: bool,

    /// Number of parallel workers (default: CPU count).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Print summary report after batch processing.
    #[arg(long)]
    pub report: bool,
}

impl BatchArgs {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::new(self.output.as_deref(), &self.suffix, self.force, self.dry_run)
    }
}

/// Arguments for the `compress` subcommand.
#[derive(Args, Debug)]
pub struct CompressArgs {
    #[command(flatten)]
    pub batch: BatchArgs,
}

/// Arguments for the `decompress` subcommand.
#[derive(Args, Debug)]
pub struct DecompressArgs {
    #[command(flatten)]
    pub batch: BatchArgs,

    /// Raster format to write.
    #[arg(short, long, value_enum, default_value = "pnm")]
    pub format: RasterArg,

    /// Write binary P5/P6 instead of plain P2/P3.
    #[arg(long)]
    pub binary: bool,

    /// Fail on streams that cover fewer pixels than their header declares.
    #[arg(long)]
    pub strict: bool,

    /// Refuse streams whose header declares more pixels than this.
    #[arg(long, default_value_t = DEFAULT_MAX_PIXELS)]
    pub max_pixels: u64,
}

impl DecompressArgs {
    pub fn truncation_policy(&self) -> TruncationPolicy {
        if self.strict {
            TruncationPolicy::Reject
        } else {
            TruncationPolicy::ZeroFill
        }
    }

    pub fn limits(&self) -> Limits {
        pixel_limits(self.max_pixels)
    }
}

/// Arguments for the `gray` subcommand.
#[derive(Args, Debug)]
pub struct GrayArgs {
    /// Input image.
    pub input: PathBuf,

    /// Output file (default: <stem>_gray.<ext> next to the input).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Allow overwriting an existing output.
    #[arg(long)]
    pub force: bool,

    /// Write binary PNM.
    #[arg(long)]
    pub binary: bool,

    /// Use full-range luma (black 0, white 255) instead of studio range (16..=235).
    #[arg(long)]
    pub full_range: bool,
}

impl GrayArgs {
    pub fn luma_range(&self) -> LumaRange {
        if self.full_range {
            LumaRange::Full
        } else {
            LumaRange::Studio
        }
    }
}

/// Arguments for the `resize` subcommand.
#[derive(Args, Debug)]
pub struct ResizeArgs {
    /// Input image.
    pub input: PathBuf,

    /// Target width in pixels.
    #[arg(short = 'w', long, requires = "height")]
    pub width: Option<u32>,

    /// Target height in pixels.
    #[arg(short = 'H', long, requires = "width")]
    pub height: Option<u32>,

    /// Target size as WxH (e.g., 800x600).
    #[arg(long, conflicts_with_all = ["width", "height"])]
    pub size: Option<String>,

    /// Output file (default: <stem>_resized.<ext> next to the input).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Allow overwriting an existing output.
    #[arg(long)]
    pub force: bool,

    /// Write binary PNM.
    #[arg(long)]
    pub binary: bool,
}

impl ResizeArgs {
    /// Parse --size WxH or -w/-H into (width, height).
    pub fn resolve_dimensions(&self) -> anyhow::Result<(u32, u32)> {
        if let Some(ref size) = self.size {
            return parse_size(size);
        }
        match (self.width, self.height) {
            (Some(w), Some(h)) => Ok((w, h)),
            _ => anyhow::bail!("give the target size with --size WxH or -w W -H H"),
        }
    }
}

/// Parse `WxH` (e.g. `800x600`).
pub fn parse_size(size: &str) -> anyhow::Result<(u32, u32)> {
    let Some((w, h)) = size.split_once(['x', 'X']) else {
        anyhow::bail!("--size must be WxH (e.g., 800x600), got: {}", size);
    };
    let w: u32 = w
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid width in --size: {}", w))?;
    let h: u32 = h
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid height in --size: {}", h))?;
    Ok((w, h))
}

/// Arguments for the `info` subcommand.
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input files or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Raster output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RasterArg {
    Pnm,
    Png,
}

impl RasterArg {
    pub fn save_format(self, binary: bool) -> SaveFormat {
        match self {
            RasterArg::Pnm if binary => SaveFormat::Pnm(PnmEncoding::Binary),
            RasterArg::Pnm => SaveFormat::Pnm(PnmEncoding::Plain),
            RasterArg::Png => SaveFormat::Png,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    match cli.command.unwrap_or(Command::Menu) {
        Command::Compress(args) => codec::compress(args),
        Command::Decompress(args) => codec::decompress(args),
        Command::Gray(args) => transform::gray(args),
        Command::Resize(args) => transform::resize(args),
        Command::Info(args) => info::run(args),
        Command::Menu => menu::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_menu() {
        let cli = Cli::try_parse_from(["zrimg"]).expect("bare invocation should parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn parses_compress_batch() {
        let cli = Cli::try_parse_from(["zrimg", "compress", "a.ppm", "b.pgm", "-o", "out/", "-j", "2"])
            .expect("compress args should parse");
        let Some(Command::Compress(args)) = cli.command else {
            panic!("expected compress");
        };
        assert_eq!(args.batch.files, ["a.ppm", "b.pgm"]);
        assert_eq!(args.batch.output.as_deref(), Some("out/"));
        assert_eq!(args.batch.jobs, Some(2));
    }

    #[test]
    fn parses_strict_binary_decompress() {
        let cli = Cli::try_parse_from(["zrimg", "decompress", "x.rle", "--strict", "--binary"])
            .expect("decompress args should parse");
        let Some(Command::Decompress(args)) = cli.command else {
            panic!("expected decompress");
        };
        assert_eq!(args.truncation_policy(), TruncationPolicy::Reject);
        assert_eq!(
            args.format.save_format(args.binary),
            SaveFormat::Pnm(PnmEncoding::Binary)
        );
    }

    #[test]
    fn decompress_defaults_to_plain_pnm_and_zero_fill() {
        let cli = Cli::try_parse_from(["zrimg", "decompress", "x.rle"]).unwrap();
        let Some(Command::Decompress(args)) = cli.command else {
            panic!("expected decompress");
        };
        assert_eq!(args.truncation_policy(), TruncationPolicy::ZeroFill);
        assert_eq!(args.format.save_format(args.binary), SaveFormat::default());
        assert_eq!(args.limits().max_pixels, Some(DEFAULT_MAX_PIXELS));
    }

    #[test]
    fn max_pixels_overrides_the_default() {
        let cli =
            Cli::try_parse_from(["zrimg", "decompress", "x.rle", "--max-pixels", "64"]).unwrap();
        let Some(Command::Decompress(args)) = cli.command else {
            panic!("expected decompress");
        };
        assert_eq!(args.limits().max_pixels, Some(64));
    }

    #[test]
    fn gray_defaults_to_studio_range() {
        let cli = Cli::try_parse_from(["zrimg", "gray", "a.ppm"]).unwrap();
        let Some(Command::Gray(args)) = cli.command else {
            panic!("expected gray");
        };
        assert_eq!(args.luma_range(), LumaRange::Studio);

        let cli = Cli::try_parse_from(["zrimg", "gray", "a.ppm", "--full-range"]).unwrap();
        let Some(Command::Gray(args)) = cli.command else {
            panic!("expected gray");
        };
        assert_eq!(args.luma_range(), LumaRange::Full);
    }

    #[test]
    fn global_log_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zrimg",
            "info",
            "a.pgm",
            "--log-format",
            "json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.log_level, LogLevel::Debug);
    }

    #[test]
    fn resize_size_conflicts_with_width() {
        let err = Cli::try_parse_from(["zrimg", "resize", "a.ppm", "--size", "4x4", "-w", "3", "-H", "3"])
            .expect_err("conflicting size args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn resize_dimensions() {
        let cli = Cli::try_parse_from(["zrimg", "resize", "a.ppm", "-w", "30", "-H", "20"]).unwrap();
        let Some(Command::Resize(args)) = cli.command else {
            panic!("expected resize");
        };
        assert_eq!(args.resolve_dimensions().unwrap(), (30, 20));
    }

    #[test]
    fn parse_size_forms() {
        assert_eq!(parse_size("800x600").unwrap(), (800, 600));
        assert_eq!(parse_size("3X2").unwrap(), (3, 2));
        assert!(parse_size("800").is_err());
        assert!(parse_size("ax2").is_err());
    }
}
