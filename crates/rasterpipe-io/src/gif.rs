//! GIF decode, first frame only. Animated sequences and GIF encode are
//! out of scope.

use rasterpipe_core::{ColorMode, Result};
use rasterpipe_transform::{FormatOptions, OutputFormat};

use crate::channel::DecodedImage;
use crate::error::decode_failed;

/// Decode a GIF's first frame as RGBA.
///
/// Calls `options.invoke_callback` once the logical screen descriptor is
/// parsed and before the first frame is decoded.
pub fn decode(bytes: &[u8], options: &mut FormatOptions) -> Result<DecodedImage> {
    let mut decode_options = gif::DecodeOptions::new();
    decode_options.set_color_output(gif::ColorOutput::RGBA);
    let mut decoder = decode_options.read_info(bytes).map_err(|e| decode_failed("GIF", e))?;
    options.invoke_callback(decoder.width() as i32, decoder.height() as i32, OutputFormat::Gif)?;

    let frame = decoder
        .read_next_frame()
        .map_err(|e| decode_failed("GIF", e))?
        .ok_or_else(|| decode_failed("GIF", "no frames present"))?;

    Ok(DecodedImage {
        width: frame.width as i32,
        height: frame.height as i32,
        color_mode: ColorMode::Rgba,
        data: frame.buffer.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"not a gif", &mut FormatOptions::builder()).is_err());
    }
}
