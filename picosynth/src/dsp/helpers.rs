//! Q15 sample arithmetic shared by mixers and gain stages.

use super::intrinsics::saturate16;

/// Saturating Q15 multiply: `(a * b) >> 15`, floored.
#[inline(always)]
pub fn saturating_multiply_q15(a: i16, b: i16) -> i16 {
    saturate16((a as i32 * b as i32) >> 15)
}

/// Saturating sum of two 16-bit samples.
#[inline(always)]
pub fn saturating_add_q15(a: i16, b: i16) -> i16 {
    saturate16(a as i32 + b as i32)
}

/// Saturating sum of any number of samples, accumulated in 32 bits.
///
/// Clipping happens once at the end, so intermediate overshoot that cancels
/// out is not distorted.
#[inline]
pub fn mix_saturating<I: IntoIterator<Item = i16>>(samples: I) -> i16 {
    let mut acc = 0i32;
    for s in samples {
        acc += s as i32;
    }
    saturate16(acc)
}
