//! Illumination pattern generation.
//!
//! The binary strategy encodes each light index across `bit_width(n)`
//! frames: light `i` is lit in pattern `b` exactly when bit `b` of `i` is
//! set. Reading a light's on/off states back in frame order (bit 0 first,
//! least significant) therefore reconstructs `i`. The schedule is a plain
//! binary counter, not a Gray code: every frame is thresholded
//! independently, so multi-bit transitions between adjacent indices carry
//! no glitch risk.

use crate::types::Pattern;

/// Number of pattern frames needed to disambiguate `light_count` lights.
///
/// `ceil(log2(n))`. Zero for a single light, which needs no pattern
/// frames at all: the only light is trivially index 0.
pub fn bit_width(light_count: usize) -> u32 {
    if light_count <= 1 {
        return 0;
    }
    usize::BITS - (light_count - 1).leading_zeros()
}

/// Pattern for one bit position of the binary schedule.
///
/// `bit_index` must lie in `[0, bit_width(light_count))`; indices past
/// the width simply produce an all-off pattern.
pub fn bit_pattern(light_count: usize, bit_index: u32) -> Pattern {
    Pattern::new(
        (0..light_count)
            .map(|i| i >> bit_index & 1 == 1)
            .collect(),
    )
}

/// Reference pattern: every light lit.
pub fn all_on(light_count: usize) -> Pattern {
    Pattern::new(vec![true; light_count])
}

/// Linear-scan pattern: exactly one light lit.
pub fn single(light_count: usize, index: usize) -> Pattern {
    Pattern::new((0..light_count).map(|i| i == index).collect())
}
