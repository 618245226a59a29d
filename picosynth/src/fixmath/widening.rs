//! Widening multiplies on raw integers.
//!
//! Names follow `mul_<a>x<b>[_shiftN | _hi][_rounded]`. Exact products
//! never lose bits. The shifted forms apply one rule per family:
//!
//! | Family | Shift | Rule |
//! |---|---|---|
//! | 16×16 → 32 | `_hi` (16) | floor; `_rounded` adds half an LSB first |
//! | 16×8 → 24 | `_shift8` | floor |
//! | 32×16 → 48 | `_shift16` | signed floors (`SMULWB`); unsigned `_rounded` rounds to nearest |
//! | 32×32 → 64 | `_hi` (32) | floor (`SMMUL`); `_rounded` rounds to nearest (`SMMULR`) |

use crate::dsp::intrinsics;

#[inline(always)]
pub const fn mul_u16x16(a: u16, b: u16) -> u32 {
    a as u32 * b as u32
}

#[inline(always)]
pub const fn mul_s16x16(a: i16, b: i16) -> i32 {
    a as i32 * b as i32
}

/// High half of the 32-bit product.
#[inline(always)]
pub const fn mul_u16x16_hi(a: u16, b: u16) -> u16 {
    (mul_u16x16(a, b) >> 16) as u16
}

#[inline(always)]
pub const fn mul_u16x16_hi_rounded(a: u16, b: u16) -> u16 {
    ((mul_u16x16(a, b) + 0x8000) >> 16) as u16
}

#[inline(always)]
pub const fn mul_s16x8(a: i16, b: i8) -> i32 {
    a as i32 * b as i32
}

#[inline(always)]
pub const fn mul_u16x8(a: u16, b: u8) -> u32 {
    a as u32 * b as u32
}

/// Scale a 16-bit sample by an 8-bit signed level. Floors.
#[inline(always)]
pub const fn mul_s16x8_shift8(a: i16, b: i8) -> i16 {
    (mul_s16x8(a, b) >> 8) as i16
}

#[inline(always)]
pub const fn mul_u16x8_shift8(a: u16, b: u8) -> u16 {
    (mul_u16x8(a, b) >> 8) as u16
}

#[inline(always)]
pub const fn mul_s32x16(a: i32, b: i16) -> i64 {
    a as i64 * b as i64
}

#[inline(always)]
pub const fn mul_u32x16(a: u32, b: u16) -> u64 {
    a as u64 * b as u64
}

/// `(a * b) >> 16`, floored.
#[inline(always)]
pub fn mul_s32x16_shift16(a: i32, b: i16) -> i32 {
    intrinsics::mul_32x16b(a, b)
}

/// `(a * b + 0x8000) >> 16`. The result always fits 32 bits.
#[inline(always)]
pub const fn mul_u32x16_shift16_rounded(a: u32, b: u16) -> u32 {
    ((mul_u32x16(a, b) + 0x8000) >> 16) as u32
}

/// High word of the signed 64-bit product, floored.
#[inline(always)]
pub fn mul_s32x32_hi(a: i32, b: i32) -> i32 {
    intrinsics::mul_32x32_rshift32(a, b)
}

#[inline(always)]
pub fn mul_s32x32_hi_rounded(a: i32, b: i32) -> i32 {
    intrinsics::mul_32x32_rshift32_rounded(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_products() {
        assert_eq!(mul_u16x16(u16::MAX, u16::MAX), 0xFFFE_0001);
        assert_eq!(mul_s16x16(i16::MIN, i16::MIN), 1 << 30);
        assert_eq!(mul_s16x8(-1000, -128), 128_000);
        assert_eq!(mul_u16x8(1000, 255), 255_000);
        assert_eq!(mul_s32x16(i32::MIN, i16::MIN), 1i64 << 46);
        assert_eq!(mul_u32x16(u32::MAX, u16::MAX), 0xFFFE_FFFF_0001);
    }

    #[test]
    fn sixteen_by_sixteen_high_half() {
        // 0x8000 * 0x8001 = 0x4000_8000: exactly half an LSB above 0x4000.
        assert_eq!(mul_u16x16_hi(0x8000, 0x8001), 0x4000);
        assert_eq!(mul_u16x16_hi_rounded(0x8000, 0x8001), 0x4001);
        assert_eq!(mul_u16x16_hi_rounded(u16::MAX, u16::MAX), 0xFFFE);
    }

    #[test]
    fn sixteen_by_eight_floors() {
        assert_eq!(mul_s16x8_shift8(1000, 64), 250);
        // -1000 * 3 / 256 = -11.7 -> -12
        assert_eq!(mul_s16x8_shift8(-1000, 3), -12);
        assert_eq!(mul_s16x8_shift8(i16::MIN, i8::MIN), 16_384);
        assert_eq!(mul_u16x8_shift8(u16::MAX, u8::MAX), 65_279);
    }

    #[test]
    fn thirty_two_by_sixteen() {
        assert_eq!(mul_s32x16_shift16(3 << 16, 100), 300);
        assert_eq!(mul_s32x16_shift16(-1, 1), -1);
        // 1 * 0x8000 / 65536 = 0.5 rounds up.
        assert_eq!(mul_u32x16_shift16_rounded(1, 0x8000), 1);
        assert_eq!(mul_u32x16_shift16_rounded(1, 0x7FFF), 0);
        assert_eq!(mul_u32x16_shift16_rounded(u32::MAX, u16::MAX), 0xFFFE_FFFF);
    }

    #[test]
    fn thirty_two_by_thirty_two() {
        assert_eq!(mul_s32x32_hi(1 << 30, 1 << 30), 1 << 28);
        assert_eq!(mul_s32x32_hi(3, 0x5555_5555), 0);
        assert_eq!(mul_s32x32_hi_rounded(3, 0x5555_5555), 1);
    }
}
