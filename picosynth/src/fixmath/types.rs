//! Fixed-point value types.
//!
//! `UFix<NI, NF>` holds `NI` integer and `NF` fractional bits in a `u32`;
//! `SFix<NI, NF>` holds the same plus a sign in an `i32`. Every constructor
//! and arithmetic method saturates at the format's range instead of
//! wrapping.
//!
//! Rounding:
//! - `from_f32` rounds to nearest; NaN becomes zero.
//! - `to_int`, `convert` and `mul` floor (arithmetic shift right).

/// Unsigned fixed-point number with `NI` integer and `NF` fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct UFix<const NI: u32, const NF: u32>(u32);

/// Signed fixed-point number with `NI` integer and `NF` fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SFix<const NI: u32, const NF: u32>(i32);

// Legacy names, QmNn = m integer bits, n fractional bits.
pub type Q0n7 = SFix<0, 7>;
pub type Q7n8 = SFix<7, 8>;
pub type Q1n14 = SFix<1, 14>;
pub type Q15n16 = SFix<15, 16>;
pub type Q23n8 = SFix<23, 8>;
pub type Q0n8 = UFix<0, 8>;
pub type Q8n8 = UFix<8, 8>;
pub type Q0n16 = UFix<0, 16>;
pub type Q1n15 = UFix<1, 15>;
pub type Q16n16 = UFix<16, 16>;
pub type Q24n8 = UFix<24, 8>;
pub type Q8n24 = UFix<8, 24>;

/// Move a raw value from `from` fractional bits to `to`, flooring.
/// Saturates at the ends of `i64` on a left shift that would overflow.
const fn rescale(raw: i64, from: u32, to: u32) -> i64 {
    if to >= from {
        let shift = to - from;
        if shift >= 63 {
            return if raw > 0 { i64::MAX } else if raw < 0 { i64::MIN } else { 0 };
        }
        let limit = i64::MAX >> shift;
        if raw > limit {
            i64::MAX
        } else if raw < -limit {
            i64::MIN
        } else {
            raw << shift
        }
    } else {
        let shift = from - to;
        if shift >= 63 {
            if raw < 0 {
                -1
            } else {
                0
            }
        } else {
            raw >> shift
        }
    }
}

impl<const NI: u32, const NF: u32> UFix<NI, NF> {
    const LAYOUT: () = assert!(NI + NF <= 32, "UFix<NI, NF> needs NI + NF <= 32");

    /// Largest raw value the format can hold.
    pub const MAX_RAW: u32 = if NI + NF >= 32 {
        u32::MAX
    } else {
        (1u32 << (NI + NF)) - 1
    };

    pub const ZERO: Self = UFix(0);
    pub const MAX: Self = UFix(Self::MAX_RAW);

    const fn clamped(raw: u64) -> Self {
        let () = Self::LAYOUT;
        if raw > Self::MAX_RAW as u64 {
            UFix(Self::MAX_RAW)
        } else {
            UFix(raw as u32)
        }
    }

    /// Wrap a raw scaled integer, clamping bits above `NI + NF`.
    pub const fn from_raw(raw: u32) -> Self {
        Self::clamped(raw as u64)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn from_int(value: u32) -> Self {
        Self::clamped((value as u64) << NF)
    }

    pub fn from_f32(value: f32) -> Self {
        let scaled = libm::roundf(value * (1u64 << NF) as f32);
        // `as` saturates: negatives and NaN land on 0.
        Self::clamped(scaled as u64)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1u64 << NF) as f32
    }

    /// Integer part (floor).
    pub const fn to_int(self) -> u32 {
        ((self.0 as u64) >> NF) as u32
    }

    /// Re-express in another unsigned format, truncating extra fraction bits.
    pub const fn convert<const NI2: u32, const NF2: u32>(self) -> UFix<NI2, NF2> {
        let raw = rescale(self.0 as i64, NF, NF2);
        UFix::<NI2, NF2>::clamped(raw as u64)
    }

    /// Exact product, floored to the output's fractional bits and clamped.
    ///
    /// ```ignore
    /// let level: Q0n8 = Q0n8::from_raw(128);     // 0.5
    /// let freq: Q16n16 = Q16n16::from_int(440);
    /// let half: Q16n16 = freq.mul(level);        // 220.0
    /// ```
    pub const fn mul<const NI2: u32, const NF2: u32, const NIO: u32, const NFO: u32>(
        self,
        other: UFix<NI2, NF2>,
    ) -> UFix<NIO, NFO> {
        let product = self.0 as u64 * other.0 as u64;
        let from = NF + NF2;
        let raw = if from >= NFO {
            let shift = from - NFO;
            if shift >= 64 {
                0
            } else {
                product >> shift
            }
        } else {
            let shift = NFO - from;
            if shift >= 64 || product > (u64::MAX >> shift) {
                u64::MAX
            } else {
                product << shift
            }
        };
        UFix::<NIO, NFO>::clamped(raw)
    }

    pub const fn saturating_add(self, other: Self) -> Self {
        Self::clamped(self.0 as u64 + other.0 as u64)
    }

    pub const fn saturating_sub(self, other: Self) -> Self {
        UFix(self.0.saturating_sub(other.0))
    }
}

impl<const NI: u32, const NF: u32> SFix<NI, NF> {
    const LAYOUT: () = assert!(NI + NF <= 31, "SFix<NI, NF> needs NI + NF <= 31");

    pub const MAX_RAW: i32 = if NI + NF >= 31 {
        i32::MAX
    } else {
        (1i32 << (NI + NF)) - 1
    };
    pub const MIN_RAW: i32 = -Self::MAX_RAW - 1;

    pub const ZERO: Self = SFix(0);
    pub const MAX: Self = SFix(Self::MAX_RAW);
    pub const MIN: Self = SFix(Self::MIN_RAW);

    const fn clamped(raw: i64) -> Self {
        let () = Self::LAYOUT;
        if raw > Self::MAX_RAW as i64 {
            SFix(Self::MAX_RAW)
        } else if raw < Self::MIN_RAW as i64 {
            SFix(Self::MIN_RAW)
        } else {
            SFix(raw as i32)
        }
    }

    pub const fn from_raw(raw: i32) -> Self {
        Self::clamped(raw as i64)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn from_int(value: i32) -> Self {
        Self::clamped(rescale(value as i64, 0, NF))
    }

    pub fn from_f32(value: f32) -> Self {
        let scaled = libm::roundf(value * (1u64 << NF) as f32);
        Self::clamped(scaled as i64)
    }

    pub fn to_f32(self) -> f32 {
        self.0 as f32 / (1u64 << NF) as f32
    }

    /// Integer part, rounded toward negative infinity.
    pub const fn to_int(self) -> i32 {
        ((self.0 as i64) >> NF) as i32
    }

    pub const fn convert<const NI2: u32, const NF2: u32>(self) -> SFix<NI2, NF2> {
        SFix::<NI2, NF2>::clamped(rescale(self.0 as i64, NF, NF2))
    }

    pub const fn from_ufix<const NI2: u32, const NF2: u32>(value: UFix<NI2, NF2>) -> Self {
        Self::clamped(rescale(value.raw() as i64, NF2, NF))
    }

    /// Exact product, floored to the output's fractional bits and clamped.
    pub const fn mul<const NI2: u32, const NF2: u32, const NIO: u32, const NFO: u32>(
        self,
        other: SFix<NI2, NF2>,
    ) -> SFix<NIO, NFO> {
        let product = self.0 as i64 * other.0 as i64;
        SFix::<NIO, NFO>::clamped(rescale(product, NF + NF2, NFO))
    }

    pub const fn saturating_add(self, other: Self) -> Self {
        Self::clamped(self.0 as i64 + other.0 as i64)
    }

    pub const fn saturating_sub(self, other: Self) -> Self {
        Self::clamped(self.0 as i64 - other.0 as i64)
    }

    /// Negation; `MIN` saturates to `MAX`.
    pub const fn neg(self) -> Self {
        Self::clamped(-(self.0 as i64))
    }

    pub const fn abs(self) -> Self {
        if self.0 < 0 {
            self.neg()
        } else {
            self
        }
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}
