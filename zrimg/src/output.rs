//! Output path resolution and guarded writes.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    pub target_dir: Option<PathBuf>,
    pub target_file: Option<PathBuf>,
    pub suffix: String,
    pub force: bool,
    pub dry_run: bool,
}

impl OutputConfig {
    /// Create from CLI args. A trailing slash or an existing directory
    /// selects directory mode.
    pub fn new(output: Option<&str>, suffix: &str, force: bool, dry_run: bool) -> Self {
        let (target_dir, target_file) = match output {
            Some(o) => {
                let path = PathBuf::from(o);
                if o.ends_with('/') || o.ends_with('\\') || path.is_dir() {
                    (Some(path), None)
                } else {
                    (None, Some(path))
                }
            }
            None => (None, None),
        };

        Self {
            target_dir,
            target_file,
            suffix: suffix.to_string(),
            force,
            dry_run,
        }
    }

    /// Resolve the output path for an input file and the extension of the
    /// format being written.
    pub fn resolve(&self, input: &Path, input_count: usize, ext: &str) -> anyhow::Result<PathBuf> {
        if let Some(ref target) = self.target_file {
            if input_count > 1 {
                bail!("-o with a file path only works for a single input file (got {input_count})");
            }
            return Ok(target.clone());
        }

        let filename = self.output_filename(input, ext);
        if let Some(ref dir) = self.target_dir {
            return Ok(dir.join(filename));
        }

        let parent = input.parent().unwrap_or(Path::new("."));
        Ok(parent.join(filename))
    }

    fn output_filename(&self, input: &Path, ext: &str) -> String {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        format!("{stem}{}.{ext}", self.suffix)
    }

    /// Refuse to clobber the input, or an existing file without --force.
    pub fn check_writable(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        if self.dry_run {
            return Ok(());
        }

        if let (Ok(ci), Ok(co)) = (input.canonicalize(), output.canonicalize()) {
            if ci == co {
                bail!("output would overwrite input: {}", input.display());
            }
        }

        if output.exists() && !self.force {
            bail!(
                "output already exists: {}\nUse --force to overwrite",
                output.display()
            );
        }

        Ok(())
    }

    /// Create parent directories for the output path.
    pub fn ensure_parent(output: &Path) -> anyhow::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }

    /// Check, then write `bytes` to `output` (or report it under --dry-run).
    /// Returns the number of bytes.
    pub fn write(&self, input: &Path, output: &Path, bytes: &[u8]) -> anyhow::Result<u64> {
        self.check_writable(input, output)?;
        let size = bytes.len() as u64;
        if self.dry_run {
            eprintln!(
                "dry-run: {} -> {} ({})",
                input.display(),
                output.display(),
                crate::batch::format_size(size),
            );
        } else {
            Self::ensure_parent(output)?;
            std::fs::write(output, bytes)
                .with_context(|| format!("writing {}", output.display()))?;
        }
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_next_to_input_with_new_extension() {
        let cfg = OutputConfig::new(None, "", false, false);
        let out = cfg.resolve(Path::new("img/cat.ppm"), 1, "rle").unwrap();
        assert_eq!(out, PathBuf::from("img/cat.rle"));
    }

    #[test]
    fn suffix_goes_before_extension() {
        let cfg = OutputConfig::new(None, "_gray", false, false);
        let out = cfg.resolve(Path::new("cat.ppm"), 1, "pgm").unwrap();
        assert_eq!(out, PathBuf::from("cat_gray.pgm"));
    }

    #[test]
    fn trailing_slash_selects_directory() {
        let cfg = OutputConfig::new(Some("out/"), "", false, false);
        let out = cfg.resolve(Path::new("a/cat.rle"), 3, "ppm").unwrap();
        assert_eq!(out, PathBuf::from("out/cat.ppm"));
    }

    #[test]
    fn file_target_needs_single_input() {
        let cfg = OutputConfig::new(Some("one.rle"), "", false, false);
        assert!(cfg.resolve(Path::new("a.pgm"), 1, "rle").is_ok());
        assert!(cfg.resolve(Path::new("a.pgm"), 2, "rle").is_err());
    }

    #[test]
    fn existing_output_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pgm");
        let output = dir.path().join("out.rle");
        std::fs::write(&input, b"x").unwrap();
        std::fs::write(&output, b"old").unwrap();

        let cfg = OutputConfig::new(None, "", false, false);
        assert!(cfg.write(&input, &output, b"new").is_err());

        let forced = OutputConfig::new(None, "", true, false);
        assert_eq!(forced.write(&input, &output, b"new").unwrap(), 3);
        assert_eq!(std::fs::read(&output).unwrap(), b"new");
    }

    #[test]
    fn never_overwrites_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pgm");
        std::fs::write(&input, b"x").unwrap();
        let cfg = OutputConfig::new(None, "", true, false);
        assert!(cfg.write(&input, &input, b"y").is_err());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pgm");
        let output = dir.path().join("sub/out.rle");
        let cfg = OutputConfig::new(None, "", false, true);
        assert_eq!(cfg.write(&input, &output, b"abc").unwrap(), 3);
        assert!(!output.exists());
    }
}
