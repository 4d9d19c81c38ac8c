//! Codec adapters for raster formats backed by external crates.
//!
//! Each module provides a thin adapter between zenrle's `PixelBuffer` and
//! the format-specific codec crate.

#[cfg(feature = "png")]
pub(crate) mod png;
