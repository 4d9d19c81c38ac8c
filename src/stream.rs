//! Run-length representation of a raster.

use alloc::vec::Vec;

use rgb::Rgb;

use crate::pixel::Channels;

/// `count` consecutive copies of `value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Run<T> {
    pub value: T,
    /// Always at least 1 when produced by the encoder or the text parser.
    pub count: u64,
}

impl<T> Run<T> {
    pub fn new(value: T, count: u64) -> Self {
        Self { value, count }
    }
}

/// Run body, shaped by the channel count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Runs {
    /// `(value, count)` runs over grayscale samples.
    Gray(Vec<Run<u8>>),
    /// `(r, g, b, count)` runs over pixel triples.
    Rgb(Vec<Run<Rgb<u8>>>),
}

impl Runs {
    /// Empty body for the given layout.
    pub fn empty(channels: Channels) -> Self {
        match channels {
            Channels::Gray => Runs::Gray(Vec::new()),
            Channels::Rgb => Runs::Rgb(Vec::new()),
        }
    }

    pub fn channels(&self) -> Channels {
        match self {
            Runs::Gray(_) => Channels::Gray,
            Runs::Rgb(_) => Channels::Rgb,
        }
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        match self {
            Runs::Gray(runs) => runs.len(),
            Runs::Rgb(runs) => runs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterator over run counts, in order.
    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        let (gray, rgb) = match self {
            Runs::Gray(runs) => (Some(runs.iter().map(|r| r.count)), None),
            Runs::Rgb(runs) => (None, Some(runs.iter().map(|r| r.count))),
        };
        gray.into_iter().flatten().chain(rgb.into_iter().flatten())
    }
}

/// Compressed raster: header plus runs.
///
/// Serialized with [`Display`](core::fmt::Display) and parsed with
/// [`FromStr`](core::str::FromStr); see [`crate::text`] for the format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunLengthStream {
    pub width: u32,
    pub height: u32,
    pub runs: Runs,
}

impl RunLengthStream {
    pub fn new(width: u32, height: u32, runs: Runs) -> Self {
        Self {
            width,
            height,
            runs,
        }
    }

    pub fn channels(&self) -> Channels {
        self.runs.channels()
    }

    /// Pixels the header declares (`width * height`).
    pub fn declared_units(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Pixels the runs expand to (sum of counts, saturating at `u64::MAX`).
    pub fn unit_count(&self) -> u64 {
        self.runs.counts().fold(0, u64::saturating_add)
    }

    /// Whether no two adjacent runs carry the same value.
    pub fn is_maximal(&self) -> bool {
        match &self.runs {
            Runs::Gray(runs) => runs.windows(2).all(|w| w[0].value != w[1].value),
            Runs::Rgb(runs) => runs.windows(2).all(|w| w[0].value != w[1].value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_units() {
        let stream = RunLengthStream::new(
            3,
            1,
            Runs::Rgb(alloc::vec![
                Run::new(Rgb::new(1, 1, 1), 2),
                Run::new(Rgb::new(2, 2, 2), 1)
            ]),
        );
        assert_eq!(stream.channels(), Channels::Rgb);
        assert_eq!(stream.unit_count(), 3);
        assert_eq!(stream.declared_units(), 3);
        assert!(stream.is_maximal());
    }

    #[test]
    fn adjacent_equal_runs_are_not_maximal() {
        let stream = RunLengthStream::new(
            4,
            1,
            Runs::Gray(alloc::vec![Run::new(5, 2), Run::new(5, 2)]),
        );
        assert!(!stream.is_maximal());
    }

    #[test]
    fn unit_count_saturates() {
        let stream = RunLengthStream::new(
            1,
            1,
            Runs::Gray(alloc::vec![Run::new(1, u64::MAX), Run::new(2, 5)]),
        );
        assert_eq!(stream.unit_count(), u64::MAX);
    }
}
