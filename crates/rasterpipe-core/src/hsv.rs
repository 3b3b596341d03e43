//! RGB <-> HSV conversion with 8-bit fixed-point intermediate precision.

/// Convert an 8-bit RGB triple to HSV, `h` in `[0, 360)`, `s`/`v` in `[0, 255]`.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, u8, u8) {
    let (rf, gf, bf) = (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let h = if delta.abs() < f32::EPSILON {
        0.0
    } else if max == rf {
        60.0 * (((gf - bf) / delta).rem_euclid(6.0))
    } else if max == gf {
        60.0 * (((bf - rf) / delta) + 2.0)
    } else {
        60.0 * (((rf - gf) / delta) + 4.0)
    };

    let s = if max <= f32::EPSILON { 0.0 } else { delta / max };
    let v = max;

    (h, (s * 255.0).round() as u8, (v * 255.0).round() as u8)
}

/// Convert an HSV triple back to 8-bit RGB.
pub fn hsv_to_rgb(h: f32, s: u8, v: u8) -> (u8, u8, u8) {
    let sf = s as f32 / 255.0;
    let vf = v as f32 / 255.0;
    let c = vf * sf;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let m = vf - c;

    let (r1, g1, b1) = if hp < 1.0 {
        (c, x, 0.0)
    } else if hp < 2.0 {
        (x, c, 0.0)
    } else if hp < 3.0 {
        (0.0, c, x)
    } else if hp < 4.0 {
        (0.0, x, c)
    } else if hp < 5.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_u8(r1), to_u8(g1), to_u8(b1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_within_tolerance() {
        let samples = [
            (0u8, 0u8, 0u8),
            (255, 255, 255),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (128, 64, 32),
            (17, 201, 99),
        ];
        for (r, g, b) in samples {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r2, g2, b2) = hsv_to_rgb(h, s, v);
            assert!((r as i32 - r2 as i32).abs() <= 7, "r drifted too far");
            assert!((g as i32 - g2 as i32).abs() <= 7, "g drifted too far");
            assert!((b as i32 - b2 as i32).abs() <= 7, "b drifted too far");
        }
    }
}
