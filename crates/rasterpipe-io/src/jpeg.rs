//! JPEG decode/encode via `jpeg-decoder`/`jpeg-encoder`.

use rasterpipe_core::{ColorMode, Result};
use rasterpipe_transform::{FormatOptions, OutputFormat};

use crate::channel::DecodedImage;
use crate::error::{decode_failed, encode_failed};
use crate::metadata::parse_exif_orientation;

/// A JPEG's Exif/XMP sidecar data, extracted during the decode marker walk.
#[derive(Debug, Clone, Default)]
pub struct JpegMetadata {
    /// Exif orientation tag value (1 if absent).
    pub exif_orientation: u16,
    /// Raw XMP packet text, if an `http://ns.adobe.com/xap/1.0/` APP1
    /// segment was present.
    pub xmp: Option<String>,
}

/// Decode a JPEG file's bytes into grayscale or RGB pixels plus metadata.
///
/// `jpeg-decoder` always resolves CMYK/YCbCr internally to the format
/// reported by `info().pixel_format`; L8 passes through as [`ColorMode::Gray`],
/// everything else is promoted to [`ColorMode::Rgb`].
///
/// Calls `options.invoke_callback` once the frame header is parsed (width,
/// height, and pixel format known) and before the scan data is decoded.
pub fn decode(bytes: &[u8], options: &mut FormatOptions) -> Result<(DecodedImage, JpegMetadata)> {
    let mut decoder = jpeg_decoder::Decoder::new(bytes);
    decoder.read_info().map_err(|e| decode_failed("JPEG", e))?;
    let header_info = decoder
        .info()
        .ok_or_else(|| decode_failed("JPEG", "missing frame info after header parse"))?;
    options.invoke_callback(header_info.width as i32, header_info.height as i32, OutputFormat::Jpeg)?;

    let pixels = decoder.decode().map_err(|e| decode_failed("JPEG", e))?;
    let info = decoder
        .info()
        .ok_or_else(|| decode_failed("JPEG", "missing frame info after decode"))?;

    let (color_mode, data) = match info.pixel_format {
        jpeg_decoder::PixelFormat::L8 => (ColorMode::Gray, pixels),
        jpeg_decoder::PixelFormat::RGB24 => (ColorMode::Rgb, pixels),
        jpeg_decoder::PixelFormat::CMYK32 => (ColorMode::Rgb, cmyk_to_rgb(&pixels)),
        jpeg_decoder::PixelFormat::L16 => (ColorMode::Gray, l16_to_l8(&pixels)),
    };

    let metadata = parse_markers(bytes);

    Ok((
        DecodedImage { width: info.width as i32, height: info.height as i32, color_mode, data },
        metadata,
    ))
}

fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks(4)
        .flat_map(|px| {
            let (c, m, y, k) = (px[0] as f32 / 255.0, px[1] as f32 / 255.0, px[2] as f32 / 255.0, px[3] as f32 / 255.0);
            [
                ((1.0 - c) * (1.0 - k) * 255.0) as u8,
                ((1.0 - m) * (1.0 - k) * 255.0) as u8,
                ((1.0 - y) * (1.0 - k) * 255.0) as u8,
            ]
        })
        .collect()
}

fn l16_to_l8(l16: &[u8]) -> Vec<u8> {
    l16.chunks(2).map(|px| px[0]).collect()
}

/// Walk JPEG markers looking for the Exif (APP1, `Exif\0\0`) and XMP
/// (APP1, Adobe XMP URI) segments.
fn parse_markers(data: &[u8]) -> JpegMetadata {
    let mut metadata = JpegMetadata::default();
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return metadata;
    }
    let mut pos = 2usize;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        while pos < data.len() && data[pos] == 0xFF {
            pos += 1;
        }
        if pos >= data.len() {
            break;
        }
        let marker = data[pos];
        pos += 1;
        if marker == 0xD9 || marker == 0xDA {
            break;
        }
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            continue;
        }
        if pos + 2 > data.len() {
            break;
        }
        let seg_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        pos += 2;
        if seg_len < 2 || pos + seg_len - 2 > data.len() {
            break;
        }
        let segment = &data[pos..pos + seg_len - 2];
        if marker == 0xE1 {
            if segment.starts_with(b"Exif\0\0") {
                metadata.exif_orientation = parse_exif_orientation(&segment[6..]);
            } else if segment.starts_with(b"http://ns.adobe.com/xap/1.0/\0") {
                metadata.xmp = Some(String::from_utf8_lossy(&segment[29..]).into_owned());
            }
        }
        pos += seg_len - 2;
    }
    metadata
}

/// Encode an image as JPEG at the given quality (1-100).
pub fn encode(image: &DecodedImage, quality: u8) -> Result<Vec<u8>> {
    let color_type = match image.color_mode {
        ColorMode::Gray => jpeg_encoder::ColorType::Luma,
        ColorMode::Rgb => jpeg_encoder::ColorType::Rgb,
        ColorMode::Rgba => jpeg_encoder::ColorType::Rgba,
        ColorMode::Yuv => {
            return Err(encode_failed("JPEG", "YUV source must be converted before encode"))
        }
    };
    let mut buffer = Vec::new();
    let encoder = jpeg_encoder::Encoder::new(&mut buffer, quality);
    encoder
        .encode(&image.data, image.width as u16, image.height as u16, color_type)
        .map_err(|e| encode_failed("JPEG", e))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_markers_defaults_orientation_to_one_without_exif() {
        let minimal = [0xFFu8, 0xD8, 0xFF, 0xD9];
        let meta = parse_markers(&minimal);
        assert_eq!(meta.exif_orientation, 1);
        assert!(meta.xmp.is_none());
    }

    #[test]
    fn encode_rejects_yuv_source() {
        let image = DecodedImage { width: 1, height: 1, color_mode: ColorMode::Yuv, data: vec![0, 0, 0] };
        assert!(encode(&image, 90).is_err());
    }
}
