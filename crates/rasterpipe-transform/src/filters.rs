//! Post-decode whole-image filters applied before the scanline pipeline:
//! arbitrary-angle rotation and a separable box blur.
//!
//! Unlike the crop/scale/sharpen/shader fusion in [`crate::transformer`],
//! these operate on a fully materialized packed buffer — rotation needs
//! random access to the source for its inverse mapping, and the box blur's
//! sliding-window sum is naturally a two-pass whole-image algorithm.

/// Rotate `src` by `angle_degrees` about `center`, producing a buffer of the
/// same `width`/`height`. Uses an inverse mapping with bilinear sampling;
/// source positions that fall outside the image are filled with
/// `background`, truncated to `bpp` channels.
pub fn rotate(
    src: &[u8],
    width: i32,
    height: i32,
    bpp: usize,
    center: (i32, i32),
    angle_degrees: f64,
    background: &[u8],
) -> Vec<u8> {
    let mut dst = vec![0u8; width.max(0) as usize * height.max(0) as usize * bpp];
    if width <= 0 || height <= 0 {
        return dst;
    }
    let bg = background;

    let angle = angle_degrees.to_radians();
    let (sin_a, cos_a) = angle.sin_cos();
    let (cx, cy) = center;
    let out_cx = width / 2;
    let out_cy = height / 2;

    let sample = |x: i32, y: i32, c: usize| -> u8 {
        if x < 0 || y < 0 || x >= width || y >= height {
            bg.get(c).copied().unwrap_or(0)
        } else {
            let idx = (y as usize * width as usize + x as usize) * bpp + c;
            src[idx]
        }
    };

    for y in 0..height {
        let ydif = (out_cy - y) as f64;
        for x in 0..width {
            let xdif = (out_cx - x) as f64;
            // Inverse-rotate the destination offset back into source space.
            let xpm = -xdif * cos_a - ydif * sin_a;
            let ypm = -ydif * cos_a + xdif * sin_a;
            let xp = cx as f64 + xpm;
            let yp = cy as f64 + ypm;

            let x0 = xp.floor() as i32;
            let y0 = yp.floor() as i32;
            let xf = xp - x0 as f64;
            let yf = yp - y0 as f64;

            let dst_idx = (y as usize * width as usize + x as usize) * bpp;
            for c in 0..bpp {
                let p00 = sample(x0, y0, c) as f64;
                let p10 = sample(x0 + 1, y0, c) as f64;
                let p01 = sample(x0, y0 + 1, c) as f64;
                let p11 = sample(x0 + 1, y0 + 1, c) as f64;
                let top = p00 * (1.0 - xf) + p10 * xf;
                let bottom = p01 * (1.0 - xf) + p11 * xf;
                dst[dst_idx + c] = (top * (1.0 - yf) + bottom * yf).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    dst
}

/// Separable box blur with edge-clamped sampling, applied in place.
/// `radius <= 0` is a no-op.
pub fn box_blur(data: &mut [u8], width: i32, height: i32, bpp: usize, radius: i32) {
    if radius <= 0 || width <= 0 || height <= 0 {
        return;
    }
    let w = width as usize;
    let h = height as usize;
    let r = radius as usize;
    let window = (2 * r + 1) as u32;

    let horizontal = blur_pass(data, w, h, bpp, r, window, true);
    let vertical = blur_pass(&horizontal, w, h, bpp, r, window, false);
    data.copy_from_slice(&vertical);
}

fn blur_pass(src: &[u8], w: usize, h: usize, bpp: usize, r: usize, window: u32, horizontal: bool) -> Vec<u8> {
    let mut dst = vec![0u8; w * h * bpp];
    let (outer, inner) = if horizontal { (h, w) } else { (w, h) };

    for o in 0..outer {
        for c in 0..bpp {
            let at = |i: usize| -> u32 {
                let (x, y) = if horizontal { (i, o) } else { (o, i) };
                src[(y * w + x) * bpp + c] as u32
            };

            let mut sum: u32 = at(0) * r as u32;
            for k in 0..=r {
                sum += at(k.min(inner - 1));
            }

            for i in 0..inner {
                let (x, y) = if horizontal { (i, o) } else { (o, i) };
                dst[(y * w + x) * bpp + c] = (sum / window) as u8;

                let add = (i + r + 1).min(inner - 1);
                let drop = i.saturating_sub(r);
                sum += at(add);
                sum -= at(drop);
            }
        }
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_radius_blur_is_identity() {
        let mut data = vec![10u8, 20, 30, 40, 50, 60];
        let original = data.clone();
        box_blur(&mut data, 3, 1, 2, 0);
        assert_eq!(data, original);
    }

    #[test]
    fn constant_image_blurs_to_itself() {
        let mut data = vec![128u8; 5 * 5 * 3];
        let original = data.clone();
        box_blur(&mut data, 5, 5, 3, 2);
        assert_eq!(data, original);
    }

    #[test]
    fn zero_angle_rotation_is_identity() {
        let src = vec![10u8, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
        let out = rotate(&src, 2, 2, 3, (1, 1), 0.0, &[0, 0, 0]);
        assert_eq!(out, src);
    }

    #[test]
    fn out_of_bounds_rotation_fills_background() {
        let src = vec![255u8; 4 * 4];
        // Center at the top-left corner, no rotation: the destination's own
        // center offset maps the top-left output pixel two samples above
        // and to the left of the source origin.
        let out = rotate(&src, 4, 4, 1, (0, 0), 0.0, &[7]);
        assert_eq!(out[0], 7);
    }
}
