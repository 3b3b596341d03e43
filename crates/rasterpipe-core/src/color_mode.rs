//! Pixel color modes and byte-per-pixel accounting.

/// Tagged pixel layout for a [`crate::bitmap::Bitmap`] row.
///
/// Replaces the C union-of-tags pixel mode with a plain sum type; `bpp()` is
/// total over all variants so callers never hit an "unknown mode" branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    /// 1 byte per pixel, single luma channel.
    Gray,
    /// 3 bytes per pixel, R-G-B order.
    Rgb,
    /// 4 bytes per pixel, R-G-B-A order.
    Rgba,
    /// 3 bytes per pixel, Y-Cb-Cr order. Decoder-internal; never a CLI/codec
    /// output color mode.
    Yuv,
}

impl ColorMode {
    /// Bytes occupied by one pixel in this mode.
    pub const fn bpp(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::Rgb => 3,
            ColorMode::Rgba => 4,
            ColorMode::Yuv => 3,
        }
    }

    /// Whether this mode carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(self, ColorMode::Rgba)
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColorMode::Gray => "gray",
            ColorMode::Rgb => "rgb",
            ColorMode::Rgba => "rgba",
            ColorMode::Yuv => "yuv",
        };
        f.write_str(s)
    }
}

/// Convert one pixel between color modes per the testable color-mode rules:
/// RGB→RGBA forces alpha 0xFF, RGBA→RGB drops alpha without premultiply,
/// Gray→RGB triplicates the channel.
pub fn convert_pixel(src_mode: ColorMode, src: &[u8], dst_mode: ColorMode, dst: &mut [u8]) {
    debug_assert!(src.len() >= src_mode.bpp());
    debug_assert!(dst.len() >= dst_mode.bpp());
    match (src_mode, dst_mode) {
        (ColorMode::Gray, ColorMode::Gray)
        | (ColorMode::Rgb, ColorMode::Rgb)
        | (ColorMode::Rgba, ColorMode::Rgba) => {
            dst[..src_mode.bpp()].copy_from_slice(&src[..src_mode.bpp()]);
        }
        (ColorMode::Gray, ColorMode::Rgb) => {
            dst[0] = src[0];
            dst[1] = src[0];
            dst[2] = src[0];
        }
        (ColorMode::Gray, ColorMode::Rgba) => {
            dst[0] = src[0];
            dst[1] = src[0];
            dst[2] = src[0];
            dst[3] = 0xFF;
        }
        (ColorMode::Rgb, ColorMode::Rgba) => {
            dst[0] = src[0];
            dst[1] = src[1];
            dst[2] = src[2];
            dst[3] = 0xFF;
        }
        (ColorMode::Rgba, ColorMode::Rgb) => {
            dst[0] = src[0];
            dst[1] = src[1];
            dst[2] = src[2];
        }
        (ColorMode::Rgb, ColorMode::Gray) | (ColorMode::Rgba, ColorMode::Gray) => {
            let (r, g, b) = (src[0] as u32, src[1] as u32, src[2] as u32);
            dst[0] = ((r * 2126 + g * 7152 + b * 722) / 10000) as u8;
        }
        (ColorMode::Yuv, other) => {
            let rgb = crate::yuv::yuv_to_rgb(src[0], src[1], src[2]);
            convert_pixel(ColorMode::Rgb, &rgb, other, dst);
        }
        (other, ColorMode::Yuv) => {
            let mut rgb = [0u8; 3];
            convert_pixel(other, src, ColorMode::Rgb, &mut rgb);
            let yuv = crate::yuv::rgb_to_yuv(rgb[0], rgb[1], rgb[2]);
            dst[..3].copy_from_slice(&yuv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_to_rgba_forces_opaque_alpha() {
        let mut dst = [0u8; 4];
        convert_pixel(ColorMode::Rgb, &[10, 20, 30], ColorMode::Rgba, &mut dst);
        assert_eq!(dst, [10, 20, 30, 0xFF]);
    }

    #[test]
    fn rgba_to_rgb_drops_alpha() {
        let mut dst = [0u8; 3];
        convert_pixel(ColorMode::Rgba, &[10, 20, 30, 128], ColorMode::Rgb, &mut dst);
        assert_eq!(dst, [10, 20, 30]);
    }

    #[test]
    fn gray_to_rgb_triplicates() {
        let mut dst = [0u8; 3];
        convert_pixel(ColorMode::Gray, &[42], ColorMode::Rgb, &mut dst);
        assert_eq!(dst, [42, 42, 42]);
    }

    #[test]
    fn bpp_is_total() {
        assert_eq!(ColorMode::Gray.bpp(), 1);
        assert_eq!(ColorMode::Rgb.bpp(), 3);
        assert_eq!(ColorMode::Rgba.bpp(), 4);
        assert_eq!(ColorMode::Yuv.bpp(), 3);
    }
}
