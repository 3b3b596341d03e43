//! 3×3 approximately-gaussian sharpen kernel, in Q10 fixed point.

use crate::fixed::YFIXED_ONE;

/// A symmetric 3×3 convolution kernel: one center weight, one weight shared
/// by the four edge-adjacent neighbors, one weight shared by the four
/// diagonal neighbors. All weights are Q10 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel3x3 {
    /// Weight applied to the pixel itself.
    pub center: i32,
    /// Weight applied to each of the four edge-adjacent neighbors.
    pub edge: i32,
    /// Weight applied to each of the four diagonal neighbors.
    pub corner: i32,
}

impl Kernel3x3 {
    /// The no-op kernel: center = 1 (Q10), everything else 0.
    pub const IDENTITY: Kernel3x3 = Kernel3x3 { center: YFIXED_ONE as i32, edge: 0, corner: 0 };

    /// Derive a 3×3 sharpen kernel from σ: `corner = k·exp(k)·Q`,
    /// `edge = k·exp(2k)·Q` where `k = -1/(2σ²)`, `Q = YFIXED_ONE`, and the
    /// center weight is whatever makes the nine weights sum to exactly `Q`
    /// (so a constant-color image convolves to itself).
    ///
    /// `fast`, the only mode the codec path exercises, folds the corner
    /// weight into the edge weight and zeroes the corners — this also
    /// matches the Transformer's per-pixel formula, which only ever reads
    /// the four edge-adjacent neighbors.
    pub fn from_sigma(sigma: f64, fast: bool) -> Kernel3x3 {
        if sigma <= 0.0 {
            return Kernel3x3::IDENTITY;
        }
        let q = YFIXED_ONE as f64;
        let k = -1.0 / (2.0 * sigma * sigma);
        let corner = k * k.exp() * q;
        let edge = k * (2.0 * k).exp() * q;

        if fast {
            let folded_edge = (edge + corner).round() as i32;
            let center = YFIXED_ONE as i32 - 4 * folded_edge;
            Kernel3x3 { center, edge: folded_edge, corner: 0 }
        } else {
            let edge_i = edge.round() as i32;
            let corner_i = corner.round() as i32;
            let center = YFIXED_ONE as i32 - 4 * edge_i - 4 * corner_i;
            Kernel3x3 { center, edge: edge_i, corner: corner_i }
        }
    }

    /// Sum of all nine weights (center + 4·edge + 4·corner), in Q10.
    pub fn weight_sum(&self) -> i32 {
        self.center + 4 * self.edge + 4 * self.corner
    }

    /// Convolve one pixel given its 3×3 neighborhood (`above`/`below` rows
    /// already account for boundary duplication upstream).
    #[allow(clippy::too_many_arguments)]
    pub fn apply_pixel(
        &self,
        center: i32,
        left: i32,
        right: i32,
        top: i32,
        bottom: i32,
        top_left: i32,
        top_right: i32,
        bottom_left: i32,
        bottom_right: i32,
    ) -> u8 {
        let sum = self.center as i64 * center as i64
            + self.edge as i64 * (left + right + top + bottom) as i64
            + self.corner as i64 * (top_left + top_right + bottom_left + bottom_right) as i64;
        (sum / YFIXED_ONE).clamp(0, 255) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sigma_is_identity() {
        let k = Kernel3x3::from_sigma(0.0, true);
        assert_eq!(k, Kernel3x3::IDENTITY);
    }

    #[test]
    fn weights_sum_to_one_q10_unit() {
        for fast in [true, false] {
            let k = Kernel3x3::from_sigma(0.8, fast);
            assert_eq!(k.weight_sum(), YFIXED_ONE as i32);
        }
    }

    #[test]
    fn fast_mode_zeros_corners() {
        let k = Kernel3x3::from_sigma(0.8, true);
        assert_eq!(k.corner, 0);
    }

    #[test]
    fn constant_neighborhood_convolves_to_itself() {
        let k = Kernel3x3::from_sigma(0.8, true);
        let v = 128;
        let out = k.apply_pixel(v, v, v, v, v, v, v, v, v);
        assert_eq!(out, v as u8);
    }
}
