//! Textual run-length wire format.
//!
//! ```text
//! <width> <height> <channels>
//! <run> <run> ...
//! ```
//!
//! A grayscale run is `<value> <count>`, a color run `<r> <g> <b> <count>`.
//! All numbers are base-10 ASCII. The writer separates tokens with single
//! spaces and puts the header and the run body on their own lines; the parser
//! accepts any ASCII whitespace, so runs may be spread over several lines.

use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use rgb::Rgb;

use crate::pixel::Channels;
use crate::stream::{Run, RunLengthStream, Runs};
use crate::RleError;

/// Parse the textual form of a run-length stream.
///
/// Fails with [`RleError::MalformedStream`] when a token is not an integer of
/// the expected range, a run count is zero or negative, or the text ends inside
/// the header or a run. A header channel count other than 1 or 3 is
/// [`RleError::UnsupportedChannelCount`].
pub fn parse(input: &str) -> Result<RunLengthStream, RleError> {
    let mut tokens = Tokens::new(input);

    let width = tokens.header_field("width")?;
    let height = tokens.header_field("height")?;
    let channels = Channels::from_count(tokens.header_field("channels")?)?;

    let runs = match channels {
        Channels::Gray => {
            let mut runs = Vec::new();
            while let Some(value) = tokens.run_start()? {
                runs.push(Run::new(value, tokens.count()?));
            }
            Runs::Gray(runs)
        }
        Channels::Rgb => {
            let mut runs = Vec::new();
            while let Some(r) = tokens.run_start()? {
                let g = tokens.sample("g")?;
                let b = tokens.sample("b")?;
                runs.push(Run::new(Rgb::new(r, g, b), tokens.count()?));
            }
            Runs::Rgb(runs)
        }
    };

    Ok(RunLengthStream::new(width, height, runs))
}

impl FromStr for RunLengthStream {
    type Err = RleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for RunLengthStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.width, self.height, self.channels().count())?;
        if self.runs.is_empty() {
            return Ok(());
        }
        match &self.runs {
            Runs::Gray(runs) => {
                for (i, run) in runs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{} {}", run.value, run.count)?;
                }
            }
            Runs::Rgb(runs) => {
                for (i, run) in runs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    let p = run.value;
                    write!(f, "{} {} {} {}", p.r, p.g, p.b, run.count)?;
                }
            }
        }
        f.write_str("\n")
    }
}

/// Serialize a stream into a writer.
#[cfg(feature = "std")]
pub fn write_to<W: std::io::Write>(stream: &RunLengthStream, writer: W) -> std::io::Result<()> {
    use std::io::Write;

    let mut writer = std::io::BufWriter::new(writer);
    write!(writer, "{stream}")?;
    writer.flush()
}

/// Read and parse a stream from a reader.
#[cfg(feature = "std")]
pub fn read_from<R: std::io::Read>(mut reader: R) -> Result<RunLengthStream, RleError> {
    let mut text = alloc::string::String::new();
    reader.read_to_string(&mut text)?;
    parse(&text)
}

/// Whitespace tokenizer that remembers the index of the last token read.
struct Tokens<'a> {
    inner: core::str::SplitAsciiWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_ascii_whitespace(),
            position: 0,
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let token = self.inner.next()?;
        let position = self.position;
        self.position += 1;
        Some((position, token))
    }

    fn header_field(&mut self, name: &str) -> Result<u32, RleError> {
        let (position, token) = self.next().ok_or_else(|| {
            RleError::malformed(self.position, alloc::format!("missing header field `{name}`"))
        })?;
        let n = integer(position, token)?;
        u32::try_from(n).map_err(|_| {
            RleError::malformed(
                position,
                alloc::format!("header field `{name}` out of range: {n}"),
            )
        })
    }

    /// First sample of the next run, or `None` at a clean end of input.
    fn run_start(&mut self) -> Result<Option<u8>, RleError> {
        match self.next() {
            Some((position, token)) => sample(position, token).map(Some),
            None => Ok(None),
        }
    }

    fn sample(&mut self, name: &str) -> Result<u8, RleError> {
        let (position, token) = self.next().ok_or_else(|| self.inside_run(name))?;
        sample(position, token)
    }

    fn count(&mut self) -> Result<u64, RleError> {
        let (position, token) = self.next().ok_or_else(|| self.inside_run("count"))?;
        let n = integer(position, token)?;
        if n <= 0 {
            return Err(RleError::malformed(
                position,
                alloc::format!("run count must be positive, found {n}"),
            ));
        }
        u64::try_from(n).map_err(|_| {
            RleError::malformed(position, alloc::format!("run count {n} exceeds u64"))
        })
    }

    fn inside_run(&self, missing: &str) -> RleError {
        RleError::malformed(
            self.position,
            alloc::format!("stream ends inside a run (missing `{missing}`)"),
        )
    }
}

fn integer(position: usize, token: &str) -> Result<i128, RleError> {
    token.parse::<i128>().map_err(|_| {
        RleError::malformed(position, alloc::format!("expected an integer, found `{token}`"))
    })
}

fn sample(position: usize, token: &str) -> Result<u8, RleError> {
    let n = integer(position, token)?;
    u8::try_from(n).map_err(|_| {
        RleError::malformed(
            position,
            alloc::format!("sample value {n} out of range 0..=255"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn malformed_at(result: Result<RunLengthStream, RleError>) -> usize {
        match result {
            Err(RleError::MalformedStream { position, .. }) => position,
            other => panic!("expected MalformedStream, got {other:?}"),
        }
    }

    #[test]
    fn writes_header_and_runs() {
        let stream = RunLengthStream::new(
            3,
            1,
            Runs::Gray(alloc::vec![Run::new(5, 2), Run::new(7, 1)]),
        );
        assert_eq!(stream.to_string(), "3 1 1\n5 2 7 1\n");
    }

    #[test]
    fn writes_color_runs() {
        let stream = RunLengthStream::new(
            2,
            1,
            Runs::Rgb(alloc::vec![Run::new(Rgb::new(255, 0, 0), 2)]),
        );
        assert_eq!(stream.to_string(), "2 1 3\n255 0 0 2\n");
    }

    #[test]
    fn empty_stream_is_header_only() {
        let stream = RunLengthStream::new(0, 0, Runs::empty(Channels::Rgb));
        assert_eq!(stream.to_string(), "0 0 3\n");
        assert_eq!(parse("0 0 3\n").unwrap(), stream);
    }

    #[test]
    fn runs_may_span_lines() {
        let stream = parse("2 2 3\n1 2 3\n2\n\t4 5 6 2  ").unwrap();
        assert_eq!(
            stream.runs,
            Runs::Rgb(alloc::vec![
                Run::new(Rgb::new(1, 2, 3), 2),
                Run::new(Rgb::new(4, 5, 6), 2)
            ])
        );
    }

    #[test]
    fn non_numeric_token() {
        assert_eq!(malformed_at(parse("2 2 1\n5 x")), 4);
        assert_eq!(malformed_at(parse("two 2 1\n")), 0);
    }

    #[test]
    fn zero_or_negative_count() {
        assert_eq!(malformed_at(parse("2 1 1\n5 0")), 4);
        assert_eq!(malformed_at(parse("2 1 1\n5 -2")), 4);
    }

    #[test]
    fn counts_span_the_full_u64_range() {
        let stream = parse("1 1 1\n3 18446744073709551615").unwrap();
        assert_eq!(stream.runs, Runs::Gray(alloc::vec![Run::new(3, u64::MAX)]));
        assert_eq!(malformed_at(parse("1 1 1\n3 18446744073709551616")), 4);
    }

    #[test]
    fn sample_out_of_range() {
        assert_eq!(malformed_at(parse("1 1 3\n0 256 0 1")), 4);
    }

    #[test]
    fn truncated_mid_run() {
        assert_eq!(malformed_at(parse("2 1 1\n5")), 4);
        assert_eq!(malformed_at(parse("2 1 3\n1 2 3")), 6);
    }

    #[test]
    fn missing_header_fields() {
        assert_eq!(malformed_at(parse("")), 0);
        assert_eq!(malformed_at(parse("4 4")), 2);
    }

    #[test]
    fn unsupported_header_channels() {
        assert!(matches!(
            parse("1 1 4\n1 2 3 4 1"),
            Err(RleError::UnsupportedChannelCount(4))
        ));
    }

    #[test]
    fn display_parse_roundtrip() {
        let text = "4 1 1\n1 1 2 1 1 1 2 1\n";
        assert_eq!(parse(text).unwrap().to_string(), text);
    }
}
