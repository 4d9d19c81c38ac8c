//! # zenrle
//!
//! Run-length codec for 8-bit gray and RGB images, with the small set of
//! raster collaborators (PNM, PNG, grayscale, resize) needed to drive it
//! from files.
//!
//! Formats and operations beyond the core codec are feature-gated:
//!
//! ```toml
//! [dependencies]
//! zenrle = { version = "0.1", default-features = false, features = ["std"] }
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use zenrle::{Channels, DecodeRequest, EncodeRequest, PixelBuffer, TruncationPolicy};
//!
//! let pixels = PixelBuffer::new(3, 1, Channels::Gray, vec![9, 9, 4])?;
//! let stream = EncodeRequest::new().encode(&pixels)?;
//! assert_eq!(stream.to_string(), "3 1 1\n9 2 4 1\n");
//!
//! // Parse it back and expand, refusing short streams.
//! let parsed: zenrle::RunLengthStream = "3 1 1\n9 2 4 1".parse()?;
//! let decoded = DecodeRequest::new(&parsed)
//!     .with_truncation(TruncationPolicy::Reject)
//!     .decode()?;
//! assert_eq!(decoded.pixels, pixels);
//! # Ok::<(), zenrle::RleError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod codecs;
mod decode;
mod encode;
mod error;
mod format;
mod limits;
mod pixel;
mod stream;

#[cfg(feature = "std")]
pub mod io;
pub mod ops;
#[cfg(feature = "pnm")]
pub mod pnm;
pub mod text;

pub use decode::{DecodeOutput, DecodeRequest, Truncation, decode};
pub use encode::{EncodeRequest, encode};
pub use error::RleError;
pub use format::{ImageFormat, PnmEncoding};
pub use limits::{Limits, TruncationPolicy};
pub use pixel::{Channels, PixelBuffer, Units};
pub use stream::{Run, RunLengthStream, Runs};

pub use imgref::{ImgRef, ImgVec};
pub use rgb::Rgb;
