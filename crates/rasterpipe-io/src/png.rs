//! PNG decode/encode via the `png` crate.

use rasterpipe_core::{ColorMode, Result};
use rasterpipe_transform::{FormatOptions, OutputFormat};

use crate::channel::DecodedImage;
use crate::error::{decode_failed, encode_failed};

/// Decode a PNG's bytes. 16-bit channels are truncated to 8-bit, since the
/// pipeline operates in 8-bit color throughout.
///
/// Calls `options.invoke_callback` once the IHDR header is parsed and
/// before the image data is inflated.
pub fn decode(bytes: &[u8], options: &mut FormatOptions) -> Result<DecodedImage> {
    let decoder = png::Decoder::new(bytes);
    let mut reader = decoder.read_info().map_err(|e| decode_failed("PNG", e))?;
    let header = reader.info();
    options.invoke_callback(header.width as i32, header.height as i32, OutputFormat::Png)?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(|e| decode_failed("PNG", e))?;

    let color_mode = match info.color_type {
        png::ColorType::Grayscale => ColorMode::Gray,
        png::ColorType::Rgb => ColorMode::Rgb,
        png::ColorType::Rgba => ColorMode::Rgba,
        png::ColorType::GrayscaleAlpha => ColorMode::Rgba,
        png::ColorType::Indexed => ColorMode::Rgb,
    };

    let data = match info.bit_depth {
        png::BitDepth::Eight => buf[..info.buffer_size()].to_vec(),
        png::BitDepth::Sixteen => buf[..info.buffer_size()].chunks(2).map(|c| c[0]).collect(),
        _ => return Err(decode_failed("PNG", "unsupported sub-byte bit depth")),
    };

    let data = if info.color_type == png::ColorType::GrayscaleAlpha {
        data.chunks(2).flat_map(|ga| [ga[0], ga[0], ga[0], ga[1]]).collect()
    } else {
        data
    };

    Ok(DecodedImage { width: info.width as i32, height: info.height as i32, color_mode, data })
}

/// Encode an image as PNG.
pub fn encode(image: &DecodedImage) -> Result<Vec<u8>> {
    let color_type = match image.color_mode {
        ColorMode::Gray => png::ColorType::Grayscale,
        ColorMode::Rgb => png::ColorType::Rgb,
        ColorMode::Rgba => png::ColorType::Rgba,
        ColorMode::Yuv => return Err(encode_failed("PNG", "YUV source must be converted before encode")),
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, image.width as u32, image.height as u32);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().map_err(|e| encode_failed("PNG", e))?;
        writer.write_image_data(&image.data).map_err(|e| encode_failed("PNG", e))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_roundtrips_through_encode_decode() {
        let image = DecodedImage {
            width: 2,
            height: 2,
            color_mode: ColorMode::Rgb,
            data: vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120],
        };
        let bytes = encode(&image).unwrap();
        let decoded = decode(&bytes, &mut FormatOptions::builder()).unwrap();
        assert_eq!(decoded.width, 2);
        assert_eq!(decoded.height, 2);
        assert_eq!(decoded.color_mode, ColorMode::Rgb);
        assert_eq!(decoded.data, image.data);
    }

    #[test]
    fn encode_rejects_yuv() {
        let image = DecodedImage { width: 1, height: 1, color_mode: ColorMode::Yuv, data: vec![0, 0, 0] };
        assert!(encode(&image).is_err());
    }
}
