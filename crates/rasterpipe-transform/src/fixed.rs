//! Q10 fixed-point helpers shared by the horizontal/vertical resamplers and
//! the sharpen convolution.

/// One full unit in Q10 fixed point; `N` represents `N / YFIXED_ONE`.
pub const YFIXED_ONE: i64 = 1024;

/// Map output index `i` of `dst` total steps onto a fixed-point position in
/// `[0, src << 10]`, i.e. `i * src / dst` expressed in Q10 units.
///
/// Shared by both the horizontal column mapping and the vertical row
/// mapping; `i` may equal `dst` to get the exclusive upper bound.
pub fn scale_fixed_point(i: i64, dst: i64, src: i64) -> i64 {
    debug_assert!(dst > 0);
    (i * src * YFIXED_ONE) / dst
}

/// Truncate a Q10 value to its integer part.
pub fn fixed_floor(v: i64) -> i64 {
    v / YFIXED_ONE
}

/// The fractional remainder of a Q10 value, in `[0, YFIXED_ONE)`.
pub fn fixed_frac(v: i64) -> i64 {
    v.rem_euclid(YFIXED_ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_fixed_point_identity_when_src_eq_dst() {
        for i in 0..=10 {
            assert_eq!(scale_fixed_point(i, 10, 10), i * YFIXED_ONE);
        }
    }

    #[test]
    fn scale_fixed_point_upper_bound_hits_full_source() {
        assert_eq!(scale_fixed_point(5, 5, 37), 37 * YFIXED_ONE);
    }
}
