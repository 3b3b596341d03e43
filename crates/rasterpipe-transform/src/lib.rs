//! Streaming scanline transform pipeline: crop, area-weighted resampling,
//! sharpen convolution, and shader application fused into one pass that
//! never buffers a full intermediate image.

pub mod fixed;
pub mod filters;
pub mod format_options;
pub mod kernel;
pub mod transformer;

pub use fixed::{fixed_floor, fixed_frac, scale_fixed_point, YFIXED_ONE};
pub use filters::{box_blur, rotate};
pub use format_options::{AdjustMode, CropMode, FormatOptions, MetaMode, OutputFormat, Rgba8, ScaleMode};
pub use kernel::Kernel3x3;
pub use transformer::{Transformer, Writer};
