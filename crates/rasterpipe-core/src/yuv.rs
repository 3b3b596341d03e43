//! YCbCr <-> RGB conversion (BT.601, full range), decoder-internal only.
//!
//! The original C implementation guarded a conversion table behind a mutex
//! and a first-call initializer. Replaced here with a `OnceLock`-backed
//! table computed once regardless of how many threads race to touch it.

use std::sync::OnceLock;

struct Tables {
    cr_to_r: [i32; 256],
    cb_to_b: [i32; 256],
    cr_to_g: [i32; 256],
    cb_to_g: [i32; 256],
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut cr_to_r = [0i32; 256];
        let mut cb_to_b = [0i32; 256];
        let mut cr_to_g = [0i32; 256];
        let mut cb_to_g = [0i32; 256];
        for i in 0..256 {
            let d = i as i32 - 128;
            cr_to_r[i] = (1.402 * d as f64) as i32;
            cb_to_b[i] = (1.772 * d as f64) as i32;
            cr_to_g[i] = (0.714136 * d as f64) as i32;
            cb_to_g[i] = (0.344136 * d as f64) as i32;
        }
        Tables { cr_to_r, cb_to_b, cr_to_g, cb_to_g }
    })
}

/// Convert one YCbCr triple to RGB.
pub fn yuv_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let t = tables();
    let y = y as i32;
    let r = y + t.cr_to_r[cr as usize];
    let g = y - t.cb_to_g[cb as usize] - t.cr_to_g[cr as usize];
    let b = y + t.cb_to_b[cb as usize];
    [clamp8(r), clamp8(g), clamp8(b)]
}

/// Convert one RGB triple to YCbCr.
pub fn rgb_to_yuv(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;
    [clamp8(y as i32), clamp8(cb as i32), clamp8(cr as i32)]
}

fn clamp8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_is_close() {
        for (r, g, b) in [(255u8, 0u8, 0u8), (0, 255, 0), (0, 0, 255), (128, 64, 200)] {
            let yuv = rgb_to_yuv(r, g, b);
            let back = yuv_to_rgb(yuv[0], yuv[1], yuv[2]);
            for (a, bv) in [r, g, b].iter().zip(back.iter()) {
                assert!((*a as i32 - *bv as i32).abs() <= 4);
            }
        }
    }
}
