//! File expansion, parallel execution, and batch reporting.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use zenrle::ImageFormat;

/// Expand input patterns into a deduplicated, sorted list of files.
///
/// Glob matches and directory contents are filtered by extension through
/// `accept`; explicitly named files are always taken. Results are sorted by
/// file size descending for better parallel load balancing.
pub fn expand_inputs(
    patterns: &[String],
    accept: fn(ImageFormat) -> bool,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if path.is_file() && has_format(&path, accept) {
                    push_unique(path, &mut seen, &mut files);
                }
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                for_each_file_in_dir(&path, accept, &mut seen, &mut files);
            } else if path.is_file() {
                push_unique(path, &mut seen, &mut files);
            } else {
                anyhow::bail!("not a file or directory: {}", path.display());
            }
        }
    }

    files.sort_by(|a, b| {
        let size_a = a.metadata().map(|m| m.len()).unwrap_or(0);
        let size_b = b.metadata().map(|m| m.len()).unwrap_or(0);
        size_b.cmp(&size_a)
    });

    Ok(files)
}

/// Raster inputs (`compress`, `info`, `gray`, `resize`).
pub fn is_raster(format: ImageFormat) -> bool {
    format.is_raster()
}

/// Run-length stream inputs (`decompress`).
pub fn is_stream(format: ImageFormat) -> bool {
    format == ImageFormat::Rle
}

/// Anything zrimg can open.
pub fn is_any(_: ImageFormat) -> bool {
    true
}

fn has_format(path: &Path, accept: fn(ImageFormat) -> bool) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some_and(accept)
}

fn push_unique(path: PathBuf, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    if let Ok(canonical) = path.canonicalize() {
        if seen.insert(canonical) {
            files.push(path);
        }
    }
}

fn for_each_file_in_dir(
    dir: &Path,
    accept: fn(ImageFormat) -> bool,
    seen: &mut HashSet<PathBuf>,
    files: &mut Vec<PathBuf>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            for_each_file_in_dir(&path, accept, seen, files);
        } else if path.is_file() && has_format(&path, accept) {
            push_unique(path, seen, files);
        }
    }
}

/// Result of processing a single file.
#[derive(Debug)]
pub struct FileResult {
    pub input_path: PathBuf,
    pub input_size: u64,
    pub output_size: Option<u64>,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
    pub duration: Duration,
}

/// Accumulated batch summary.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<FileResult>,
}

impl BatchSummary {
    pub fn total_input_size(&self) -> u64 {
        self.results.iter().map(|r| r.input_size).sum()
    }

    pub fn total_output_size(&self) -> u64 {
        self.results.iter().filter_map(|r| r.output_size).sum()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_none()).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    /// Print a human-readable summary table.
    pub fn print_report(&self) {
        if self.results.is_empty() {
            println!("No files processed.");
            return;
        }

        println!(
            "{:<40} {:>10} {:>10} {:>8} {:>8}",
            "File", "Input", "Output", "Change", "Time"
        );
        println!("{}", "-".repeat(80));

        for r in &self.results {
            let name = r
                .input_path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("?");
            let name = if name.chars().count() > 38 {
                let tail: String = name.chars().rev().take(36).collect();
                format!("..{}", tail.chars().rev().collect::<String>())
            } else {
                name.to_string()
            };

            if let Some(err) = &r.error {
                println!("{:<40} {:>10} {}", name, format_size(r.input_size), err);
            } else if let Some(out_size) = r.output_size {
                let time_ms = r.duration.as_millis();
                let time_str = if time_ms >= 1000 {
                    format!("{:.1}s", time_ms as f64 / 1000.0)
                } else {
                    format!("{}ms", time_ms)
                };
                println!(
                    "{:<40} {:>10} {:>10} {:>8} {:>8}",
                    name,
                    format_size(r.input_size),
                    format_size(out_size),
                    format_change(r.input_size, out_size),
                    time_str,
                );
            }
        }

        println!("{}", "-".repeat(80));
        let total_in = self.total_input_size();
        let total_out = self.total_output_size();
        println!(
            "{} processed, {} errors | {} -> {} ({})",
            self.success_count(),
            self.error_count(),
            format_size(total_in),
            format_size(total_out),
            format_change(total_in, total_out),
        );
    }
}

/// Run `op` over every file, in parallel when there is more than one.
///
/// `op` returns the written path and its size; errors are captured per file
/// and never stop the batch.
pub fn run<F>(files: &[PathBuf], jobs: Option<usize>, op: F) -> anyhow::Result<BatchSummary>
where
    F: Fn(&Path) -> anyhow::Result<(PathBuf, u64)> + Sync,
{
    let timed = |path: &Path| -> FileResult {
        let start = Instant::now();
        let input_size = path.metadata().map(|m| m.len()).unwrap_or(0);
        match op(path) {
            Ok((output_path, output_size)) => {
                tracing::info!(
                    input = %path.display(),
                    output = %output_path.display(),
                    input_size,
                    output_size,
                    "wrote"
                );
                FileResult {
                    input_path: path.to_path_buf(),
                    input_size,
                    output_size: Some(output_size),
                    output_path: Some(output_path),
                    error: None,
                    duration: start.elapsed(),
                }
            }
            Err(e) => FileResult {
                input_path: path.to_path_buf(),
                input_size,
                output_size: None,
                output_path: None,
                error: Some(format!("{e:#}")),
                duration: start.elapsed(),
            },
        }
    };

    if files.len() == 1 {
        let result = timed(&files[0]);
        if let Some(ref err) = result.error {
            tracing::error!(input = %files[0].display(), "{err}");
        }
        return Ok(BatchSummary {
            results: vec![result],
        });
    }

    let jobs = jobs.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("=>-"),
    );

    let results: Vec<FileResult> = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let result = timed(path);
                if let Some(ref err) = result.error {
                    pb.println(format!("error: {}: {}", path.display(), err));
                }
                pb.inc(1);
                result
            })
            .collect()
    });

    pb.finish_and_clear();
    Ok(BatchSummary { results })
}

/// Print the report if asked, and fail when any file failed.
pub fn finish(summary: &BatchSummary, report: bool) -> anyhow::Result<()> {
    if report {
        summary.print_report();
    }
    let errors = summary.error_count();
    if errors > 0 {
        anyhow::bail!("{} of {} files had errors", errors, summary.results.len());
    }
    Ok(())
}

fn format_change(input: u64, output: u64) -> String {
    if input > 0 {
        let pct = (output as f64 - input as f64) / input as f64 * 100.0;
        format!("{:+.1}%", pct)
    } else {
        "N/A".to_string()
    }
}

/// Format a byte size into a human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn change_is_signed_percentage() {
        assert_eq!(format_change(200, 50), "-75.0%");
        assert_eq!(format_change(0, 10), "N/A");
    }

    #[test]
    fn expand_filters_directories_by_format() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pgm"), b"P2 1 1 255 0").unwrap();
        std::fs::write(dir.path().join("b.rle"), b"1 1 1\n0 1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        let pattern = vec![dir.path().display().to_string()];

        let rasters = expand_inputs(&pattern, is_raster).unwrap();
        assert_eq!(rasters.len(), 1);
        assert!(rasters[0].ends_with("a.pgm"));

        let streams = expand_inputs(&pattern, is_stream).unwrap();
        assert_eq!(streams.len(), 1);
        assert!(streams[0].ends_with("b.rle"));
    }

    #[test]
    fn missing_path_is_an_error() {
        let err = expand_inputs(&["/definitely/not/here.pgm".into()], is_any).unwrap_err();
        assert!(err.to_string().contains("not a file or directory"));
    }

    #[test]
    fn run_captures_per_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pgm");
        let b = dir.path().join("b.pgm");
        std::fs::write(&a, b"x").unwrap();
        std::fs::write(&b, b"y").unwrap();
        let files = vec![a.clone(), b];

        let summary = run(&files, Some(2), |path| {
            if path == a {
                Ok((path.with_extension("rle"), 3))
            } else {
                anyhow::bail!("boom")
            }
        })
        .unwrap();

        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.error_count(), 1);
        assert_eq!(summary.total_output_size(), 3);
        assert!(finish(&summary, false).is_err());
    }
}
