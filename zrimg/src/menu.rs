//! Interactive menu over stdin.
//!
//! Answers are read as whitespace-separated tokens, so several answers may be
//! typed on one line. End of input quits.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use zenrle::TruncationPolicy;

use crate::{codec, info, transform};

/// Run the menu on the process's stdin and stdout.
pub fn run() -> anyhow::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with(stdin.lock(), stdout.lock())
}

/// Run the menu until `0` or end of input.
///
/// A failed operation is reported and the menu continues.
pub fn run_with<R: BufRead, W: Write>(input: R, out: W) -> anyhow::Result<()> {
    let mut session = Session {
        input,
        out,
        pending: VecDeque::new(),
    };

    writeln!(session.out, "==============================")?;
    writeln!(session.out, "  zrimg {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(session.out, "==============================")?;

    loop {
        writeln!(session.out)?;
        writeln!(session.out, "Choose an operation:")?;
        writeln!(session.out, "1. Display image")?;
        writeln!(session.out, "2. Convert color image to grayscale")?;
        writeln!(session.out, "3. Resize image")?;
        writeln!(session.out, "4. Compress image")?;
        writeln!(session.out, "5. Decompress image")?;
        writeln!(session.out, "0. Quit")?;

        let Some(choice) = session.ask("Option: ")? else {
            break;
        };

        let outcome = match choice.as_str() {
            "0" => break,
            "1" => session.display(),
            "2" => session.gray(),
            "3" => session.resize(),
            "4" => session.compress(),
            "5" => session.decompress(),
            _ => {
                writeln!(session.out, "Invalid option, try again.")?;
                continue;
            }
        };

        match outcome {
            Ok(Some(message)) => writeln!(session.out, "{message}")?,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("{e:#}");
                writeln!(session.out, "error: {e:#}")?;
                session.pending.clear();
            }
        }
    }

    writeln!(session.out, "Bye.")?;
    Ok(())
}

struct Session<R, W> {
    input: R,
    out: W,
    pending: VecDeque<String>,
}

/// `Ok(None)` from an operation means input ended mid-prompt.
type Step = anyhow::Result<Option<String>>;

macro_rules! answer {
    ($session:expr, $question:expr) => {
        match $session.ask($question)? {
            Some(token) => token,
            None => return Ok(None),
        }
    };
}

impl<R: BufRead, W: Write> Session<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        write!(self.out, "{question}")?;
        self.out.flush()?;
        self.next_token()
    }

    fn next_token(&mut self) -> io::Result<Option<String>> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }

    fn display(&mut self) -> Step {
        let path = PathBuf::from(answer!(self, "Image file: "));
        let description = info::describe(&path)?;
        info::write_info(&mut self.out, &description)?;
        Ok(Some(String::new()))
    }

    fn gray(&mut self) -> Step {
        let input = PathBuf::from(answer!(self, "Color image file: "));
        let output = PathBuf::from(answer!(self, "Grayscale output file: "));
        transform::gray_to(&input, &output)?;
        Ok(Some(format!("Saved grayscale image: {}", output.display())))
    }

    fn resize(&mut self) -> Step {
        let input = PathBuf::from(answer!(self, "Source image file: "));
        let width = answer!(self, "Target width and height: ");
        let Some(height) = self.next_token()? else {
            return Ok(None);
        };
        let width: u32 = width
            .parse()
            .with_context(|| format!("invalid width: {width}"))?;
        let height: u32 = height
            .parse()
            .with_context(|| format!("invalid height: {height}"))?;
        let output = PathBuf::from(answer!(self, "Output file: "));
        transform::resize_to(&input, &output, width, height)?;
        Ok(Some(format!(
            "Saved {width}x{height} image: {}",
            output.display()
        )))
    }

    fn compress(&mut self) -> Step {
        let input = PathBuf::from(answer!(self, "Source image file: "));
        let output = PathBuf::from(answer!(self, "Compressed output file: "));
        let text = codec::compress_file(&input)?;
        std::fs::write(&output, text)
            .with_context(|| format!("writing {}", output.display()))?;
        Ok(Some(format!("Compressed to {}", output.display())))
    }

    fn decompress(&mut self) -> Step {
        let input = PathBuf::from(answer!(self, "Compressed file: "));
        let output = PathBuf::from(answer!(self, "Decompressed output file: "));
        codec::decompress_to(&input, &output, TruncationPolicy::ZeroFill)?;
        Ok(Some(format!(
            "Decompressed to {}; use option 1 to display it.",
            output.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(script: &str) -> String {
        let mut out = Vec::new();
        run_with(script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn invalid_choice_reprompts() {
        let out = session("9\nabc\n0\n");
        assert_eq!(out.matches("Invalid option").count(), 2);
        assert!(out.ends_with("Bye.\n"));
    }

    #[test]
    fn end_of_input_quits() {
        assert!(session("").ends_with("Bye.\n"));
        assert!(session("4 only-input.ppm").ends_with("Bye.\n"));
    }

    #[test]
    fn failure_keeps_the_loop_running() {
        let out = session("1 /no/such/file.ppm\n0\n");
        assert!(out.contains("error: reading /no/such/file.ppm"));
        assert!(out.ends_with("Bye.\n"));
    }

    #[test]
    fn compress_decompress_display_round() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.pgm");
        let rle = dir.path().join("in.rle");
        let back = dir.path().join("back.pgm");
        std::fs::write(&src, b"P2\n4 1\n255\n7 7 7 7\n").unwrap();

        let script = format!(
            "4\n{}\n{}\n5\n{}\n{}\n1\n{}\n0\n",
            src.display(),
            rle.display(),
            rle.display(),
            back.display(),
            back.display()
        );
        let out = session(&script);

        assert_eq!(std::fs::read_to_string(&rle).unwrap(), "4 1 1\n7 4\n");
        let restored = zenrle::io::load_image(&back).unwrap();
        assert_eq!(restored, zenrle::io::load_image(&src).unwrap());
        assert!(out.contains("Dimensions:   4x1"));
    }

    #[test]
    fn gray_and_resize() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("c.ppm");
        let gray = dir.path().join("g.pgm");
        let big = dir.path().join("big.ppm");
        std::fs::write(&src, b"P3 1 1 255\n0 0 0\n").unwrap();

        let script = format!(
            "2 {} {}\n3 {} 3 2 {}\n0\n",
            src.display(),
            gray.display(),
            src.display(),
            big.display()
        );
        let out = session(&script);

        assert!(out.contains("Saved grayscale image"));
        let gray = zenrle::io::load_image(&gray).unwrap();
        assert_eq!(gray.samples(), &[16]);
        let resized = zenrle::io::load_image(&big).unwrap();
        assert_eq!((resized.width(), resized.height()), (3, 2));
    }

    #[test]
    fn resize_rejects_non_numeric_size() {
        let out = session("3 a.ppm wide 2 out.ppm\n0\n");
        assert!(out.contains("invalid width: wide"));
        assert!(!out.contains("Invalid option"));
        assert!(out.ends_with("Bye.\n"));
    }

    #[test]
    fn absurd_header_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let rle = dir.path().join("absurd.rle");
        std::fs::write(&rle, "4000000000 4000000000 3\n").unwrap();
        let script = format!("5 {} {}\n0\n", rle.display(), dir.path().join("x.ppm").display());
        let out = session(&script);
        assert!(out.contains("error: decoding"));
        assert!(out.ends_with("Bye.\n"));
    }
}
