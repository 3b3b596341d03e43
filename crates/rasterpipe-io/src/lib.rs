//! Codec adapters (JPEG, PNG, WebP, GIF) and format dispatch, driving the
//! `rasterpipe-transform` scanline pipeline from fully decoded source
//! buffers and back out to an encoded container.

pub mod channel;
pub mod detect;
pub mod dispatcher;
pub mod error;
pub mod gif;
pub mod jpeg;
pub mod metadata;
pub mod png;
pub mod webp;

pub use channel::DecodedImage;
pub use detect::ImageFormat;
pub use dispatcher::{decode, transcode, transcode_jpeg_fast_path, Decoded};
