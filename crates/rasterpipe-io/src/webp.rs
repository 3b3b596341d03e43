//! WebP decode/encode, delegated to the `image` crate (VP8/VP8L/VP8X
//! decode) rather than carrying a bespoke codec.

use image::codecs::webp::{WebPDecoder, WebPEncoder};
use image::{ImageDecoder, ImageEncoder};
use rasterpipe_core::{ColorMode, Result};
use rasterpipe_transform::{FormatOptions, OutputFormat};
use std::io::Cursor;

use crate::channel::DecodedImage;
use crate::error::{decode_failed, encode_failed};

/// Decode a WebP's bytes. `image`'s decoder always hands back 8-bit RGBA.
///
/// Calls `options.invoke_callback` once the VP8/VP8L/VP8X header is parsed
/// and before the pixel data is decoded.
pub fn decode(bytes: &[u8], options: &mut FormatOptions) -> Result<DecodedImage> {
    let decoder = WebPDecoder::new(Cursor::new(bytes)).map_err(|e| decode_failed("WebP", e))?;
    let (width, height) = decoder.dimensions();
    options.invoke_callback(width as i32, height as i32, OutputFormat::WebP)?;

    let mut data = vec![0u8; decoder.total_bytes() as usize];
    decoder.read_image(&mut data).map_err(|e| decode_failed("WebP", e))?;
    Ok(DecodedImage { width: width as i32, height: height as i32, color_mode: ColorMode::Rgba, data })
}

/// Encode an image as WebP. `image`'s built-in encoder only offers the
/// lossless VP8L path, not VP8 lossy encode.
/// Requires RGBA8 input — callers should convert `color_mode` first.
pub fn encode(image: &DecodedImage) -> Result<Vec<u8>> {
    if image.color_mode != ColorMode::Rgba {
        return Err(encode_failed("WebP", "source must already be RGBA"));
    }
    let mut out = Vec::new();
    let encoder = WebPEncoder::new_lossless(&mut out);
    encoder
        .write_image(&image.data, image.width as u32, image.height as u32, image::ExtendedColorType::Rgba8)
        .map_err(|e| encode_failed("WebP", e))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_rejects_non_rgba_source() {
        let image = DecodedImage { width: 1, height: 1, color_mode: ColorMode::Rgb, data: vec![1, 2, 3] };
        assert!(encode(&image).is_err());
    }
}
