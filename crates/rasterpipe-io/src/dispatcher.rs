//! Format-agnostic decode/transcode orchestration.

use std::cell::RefCell;
use std::rc::Rc;

use rasterpipe_core::{ColorMode, Error, PanoMetadata, Result};
use rasterpipe_transform::{box_blur, rotate, FormatOptions, OutputFormat, Transformer};

use crate::channel::DecodedImage;
use crate::detect::ImageFormat;
use crate::metadata::parse_xmp_gpano;
use crate::{gif, jpeg, png, webp};

/// The decoded image plus whatever sidecar metadata the source format
/// carried (currently only JPEG exposes Exif/XMP through this path).
pub struct Decoded {
    /// The decoded pixels.
    pub image: DecodedImage,
    /// Exif orientation tag (1 if absent or not applicable).
    pub exif_orientation: u16,
    /// Panoramic XMP `GPano:` metadata, if the source JPEG carried it.
    pub pano: Option<PanoMetadata>,
}

/// Sniff the format from the leading bytes, decode fully, then apply
/// `options.rotate`/`options.blur` if set.
///
/// Each codec adapter calls `options.invoke_callback` itself once it has
/// parsed the source header, before it decodes any pixel data; a `false`
/// return there surfaces here as [`Error::Aborted`].
pub fn decode(bytes: &[u8], options: &mut FormatOptions) -> Result<Decoded> {
    let format = ImageFormat::detect(bytes)
        .ok_or_else(|| Error::bad_input("unrecognized image format (no matching magic bytes)"))?;
    tracing::debug!(?format, bytes = bytes.len(), "decoding image");
    let mut decoded = match format {
        ImageFormat::Jpeg => {
            let (image, meta) = jpeg::decode(bytes, options)?;
            let pano = meta.xmp.as_deref().map(parse_xmp_gpano);
            Decoded { image, exif_orientation: meta.exif_orientation, pano }
        }
        ImageFormat::Png => {
            Decoded { image: png::decode(bytes, options)?, exif_orientation: 1, pano: None }
        }
        ImageFormat::WebP => {
            Decoded { image: webp::decode(bytes, options)?, exif_orientation: 1, pano: None }
        }
        ImageFormat::Gif => {
            Decoded { image: gif::decode(bytes, options)?, exif_orientation: 1, pano: None }
        }
    };

    if options.rotate != 0.0 {
        let crop = options.compute_crop_rect(decoded.image.width, decoded.image.height);
        let center = (crop.x + crop.width / 2, crop.y + crop.height / 2);
        let bg = options.background_color;
        let bpp = decoded.image.color_mode.bpp();
        let background = [bg.r, bg.g, bg.b, bg.a];
        tracing::debug!(angle = options.rotate, ?center, "rotating decoded image");
        decoded.image.data = rotate(
            &decoded.image.data,
            decoded.image.width,
            decoded.image.height,
            bpp,
            center,
            options.rotate,
            &background[..bpp],
        );
    }

    if options.blur > 0.0 {
        tracing::debug!(radius = options.blur, "blurring decoded image");
        let bpp = decoded.image.color_mode.bpp();
        box_blur(&mut decoded.image.data, decoded.image.width, decoded.image.height, bpp, options.blur.round() as i32);
    }

    Ok(decoded)
}

/// Run the full decode → transform → encode pipeline for a single image.
///
/// `options` already has its crop rect and output size resolved against the
/// decoded image's post-crop dimensions: `compute_crop_rect` runs against
/// the original source size, `compute_output_size` against the result.
pub fn transcode(bytes: &[u8], dst_color_mode: ColorMode, options: &mut FormatOptions) -> Result<Vec<u8>> {
    let decoded = decode(bytes, options)?;
    let image = decoded.image;

    let src_rect = options.compute_crop_rect(image.width, image.height);
    let (dst_w, dst_h, mode) = options.compute_output_size(src_rect.width, src_rect.height);
    tracing::info!(
        src = %format_args!("{}x{}", image.width, image.height),
        crop = %format_args!("{}x{}@{},{}", src_rect.width, src_rect.height, src_rect.x, src_rect.y),
        dst = %format_args!("{dst_w}x{dst_h}"),
        ?mode,
        "transcoding image"
    );

    let rows = Rc::new(RefCell::new(Vec::<u8>::with_capacity(
        dst_w.max(0) as usize * dst_h.max(0) as usize * dst_color_mode.bpp(),
    )));
    {
        let rows = rows.clone();
        let mut transformer = Transformer::new(
            image.width,
            src_rect,
            rasterpipe_core::Rect::new(0, 0, dst_w, dst_h),
            image.color_mode,
            dst_color_mode,
        );
        transformer.set_sharpen(options.sharpen);
        if let Some(shader) = &options.shader {
            transformer.set_shader(shader.clone());
        }
        transformer.add_writer(Box::new(move |row, _w, _bpp, _y| {
            rows.borrow_mut().extend_from_slice(row);
            Ok(())
        }));

        let row_bytes = image.width.max(0) as usize * image.color_mode.bpp();
        for y in 0..image.height as usize {
            let start = y * row_bytes;
            transformer.push(&image.data[start..start + row_bytes])?;
        }
        transformer.finish()?;
    }

    let out_image = DecodedImage {
        width: dst_w,
        height: dst_h,
        color_mode: dst_color_mode,
        data: Rc::try_unwrap(rows).expect("no other references").into_inner(),
    };

    match options.format {
        OutputFormat::Jpeg => jpeg::encode(&out_image, options.quality),
        OutputFormat::Png => png::encode(&out_image),
        OutputFormat::WebP => webp::encode(&out_image),
        OutputFormat::Unknown | OutputFormat::Gif => {
            Err(Error::invalid_argument("requested output format has no encoder"))
        }
    }
}

/// The optimized JPEG-to-JPEG path: skip the generic Transformer when no
/// transform is actually requested (identical crop/scale, same color mode)
/// and the destination format is also JPEG, re-encoding straight from the
/// decoded pixels at the new quality. Falls back to [`transcode`] otherwise.
pub fn transcode_jpeg_fast_path(bytes: &[u8], options: &mut FormatOptions) -> Result<Vec<u8>> {
    if options.format != OutputFormat::Jpeg {
        return transcode(bytes, ColorMode::Rgb, options);
    }
    let decoded = decode(bytes, options)?;
    let image = decoded.image;
    let crop = options.compute_crop_rect(image.width, image.height);
    let (out_w, out_h, _) = options.compute_output_size(crop.width, crop.height);
    let is_passthrough =
        crop.x == 0 && crop.y == 0 && crop.width == image.width && crop.height == image.height
            && out_w == image.width && out_h == image.height
            && options.sharpen <= 0.0
            && options.rotate == 0.0
            && options.blur <= 0.0;

    tracing::debug!(is_passthrough, "jpeg fast path decision");
    if is_passthrough {
        jpeg::encode(&image, options.quality)
    } else {
        transcode(bytes, image.color_mode, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_unrecognized_bytes() {
        assert!(decode(b"not an image", &mut FormatOptions::builder()).is_err());
    }

    fn tiny_png() -> Vec<u8> {
        let image = DecodedImage {
            width: 4,
            height: 4,
            color_mode: ColorMode::Rgb,
            data: vec![128u8; 4 * 4 * 3],
        };
        png::encode(&image).unwrap()
    }

    #[test]
    fn decode_invokes_callback_with_parsed_dimensions() {
        let bytes = tiny_png();
        let mut options = FormatOptions::builder();
        let seen = Rc::new(RefCell::new(None));
        let seen2 = seen.clone();
        options.set_progress_callback(move |_, w, h, fmt| {
            *seen2.borrow_mut() = Some((w, h, fmt));
            true
        });
        decode(&bytes, &mut options).unwrap();
        assert_eq!(*seen.borrow(), Some((4, 4, OutputFormat::Png)));
    }

    #[test]
    fn decode_propagates_callback_abort() {
        let bytes = tiny_png();
        let mut options = FormatOptions::builder();
        options.set_progress_callback(|_, _, _, _| false);
        let err = decode(&bytes, &mut options).unwrap_err();
        assert!(err.is_aborted());
    }

    #[test]
    fn decode_applies_rotate_and_blur() {
        let bytes = tiny_png();
        let mut options = FormatOptions::builder();
        options.rotate = 45.0;
        options.blur = 1.0;
        let decoded = decode(&bytes, &mut options).unwrap();
        assert_eq!(decoded.image.width, 4);
        assert_eq!(decoded.image.height, 4);
    }
}
