//! # rasterpipe-core
//!
//! Foundational types for the rasterpipe scanline image pipeline:
//!
//! - [`ColorMode`] — the `Gray|Rgb|Rgba|Yuv` pixel tag and its `bpp()`.
//! - [`Rect`] — signed-coordinate rectangles and their intersection algebra.
//! - [`Bitmap`] — a reference-counted pixel buffer with pitch, color mode,
//!   and an active sub-region.
//! - [`Error`] — the six-kind error taxonomy every other rasterpipe crate
//!   builds on.
//!
//! ## Design philosophy
//!
//! Unlike a design that enforces color-space safety at compile time through
//! a generic `Image<ColorSpace, PixelFormat>`, this crate's bitmaps are
//! runtime-tagged: a thumbnail pipeline decodes one of a handful of color
//! modes per request, known only once the source header is parsed, so the
//! tag has to live in a value, not a type parameter.
//!
//! This crate has no internal dependencies; `rasterpipe-shader`,
//! `rasterpipe-transform`, `rasterpipe-io`, and `rasterpipe-cli` all depend
//! on it.

#![warn(missing_docs)]

pub mod bitmap;
pub mod color_mode;
pub mod error;
pub mod hsv;
pub mod rect;
pub mod yuv;

pub use bitmap::{Bitmap, BitmapBacking, HostHandle, PanoMetadata, SharedBitmap};
pub use color_mode::{convert_pixel, ColorMode};
pub use error::{Error, Result};
pub use rect::Rect;
