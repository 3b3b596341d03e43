//! # rasterpipe-shader
//!
//! Ordered per-pixel color effect pipeline applied by the Transformer to
//! each finished destination row: an additive color-matrix LUT, a spatial
//! vignette overlay, and preset per-channel LUTs.

#![warn(missing_docs)]

pub mod color_matrix;
pub mod compose;
pub mod shader;

pub use color_matrix::ColorMatrixParams;
pub use compose::{compose_channel, compose_colorize, ComposeMode};
pub use shader::{Effect, PixelShader};
