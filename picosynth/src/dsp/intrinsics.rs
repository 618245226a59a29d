//! Single-cycle DSP instructions used on the audio path.
//!
//! `thumbv7em` (Cortex-M4/M7) builds emit the ARM instruction named in each
//! doc comment. Every other target, including the host running tests, gets
//! a portable version with identical results.

/// Arithmetic shift right by `RSHIFT`, then clamp to a signed `BITS`-bit range.
///
/// ARM `SSAT`. Both parameters are immediates in the instruction, hence const generics.
#[inline(always)]
pub fn signed_saturate_rshift<const BITS: u32, const RSHIFT: u32>(val: i32) -> i32 {
    // `SSAT` encodes the shift as `asr #1..#32`; `saturate16` covers the
    // unshifted case.
    const {
        assert!(
            BITS >= 1 && BITS <= 32 && RSHIFT >= 1 && RSHIFT <= 31,
            "SSAT needs 1 <= BITS <= 32 and 1 <= RSHIFT <= 31"
        )
    };
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #{bits}, {val}, asr #{rshift}",
                out = out(reg) out,
                val = in(reg) val,
                bits = const BITS,
                rshift = const RSHIFT,
                options(pure, nomem, nostack),
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        let hi = (1i64 << (BITS - 1)) - 1;
        let lo = -(1i64 << (BITS - 1));
        ((val >> RSHIFT) as i64).clamp(lo, hi) as i32
    }
}

/// Clamp to `i16`. ARM `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
                options(pure, nomem, nostack),
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        val.clamp(i16::MIN as i32, i16::MAX as i32) as i16
    }
}

/// `(a * b as i16) >> 16`, flooring. ARM `SMULWB`.
#[inline(always)]
pub fn mul_32x16b(a: i32, b: i16) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "smulwb {out}, {a}, {b}",
                out = out(reg) out,
                a = in(reg) a,
                b = in(reg) b as i32,
                options(pure, nomem, nostack),
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        ((a as i64 * b as i64) >> 16) as i32
    }
}

/// High word of the 64-bit product, flooring. ARM `SMMUL`.
#[inline(always)]
pub fn mul_32x32_rshift32(a: i32, b: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "smmul {out}, {a}, {b}",
                out = out(reg) out,
                a = in(reg) a,
                b = in(reg) b,
                options(pure, nomem, nostack),
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        ((a as i64 * b as i64) >> 32) as i32
    }
}

/// High word of the 64-bit product, rounded to nearest. ARM `SMMULR`.
#[inline(always)]
pub fn mul_32x32_rshift32_rounded(a: i32, b: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "smmulr {out}, {a}, {b}",
                out = out(reg) out,
                a = in(reg) a,
                b = in(reg) b,
                options(pure, nomem, nostack),
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        ((a as i64 * b as i64 + 0x8000_0000) >> 32) as i32
    }
}
