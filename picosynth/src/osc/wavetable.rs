//! Table geometry rules and the sample types a table may hold.

use crate::constants::{MAX_TABLE_CELLS, PHASE_FRAC_BITS};
use crate::error::ConfigError;

/// Check that `len` can be indexed by masking a 16.16 phase accumulator.
///
/// Also used in `const` assertions, so an oscillator declared over a bad
/// table size fails to build.
pub const fn validate_table_len(len: usize) -> Result<(), ConfigError> {
    if len == 0 || !len.is_power_of_two() {
        return Err(ConfigError::TableNotPowerOfTwo { len });
    }
    if len > MAX_TABLE_CELLS {
        return Err(ConfigError::TableTooLarge {
            len,
            max: MAX_TABLE_CELLS,
        });
    }
    Ok(())
}

/// Phase increment for a frequency carrying `freq_frac_bits` fractional bits.
///
/// `floor(cells * freq * 2^16 / (update_rate * 2^freq_frac_bits))`,
/// computed in 64 bits and saturating at `u32::MAX`. A zero `update_rate`
/// gives zero.
pub const fn phase_increment(cells: usize, freq: u64, freq_frac_bits: u32, update_rate: u32) -> u32 {
    if update_rate == 0 {
        return 0;
    }
    let scaled = cells as u64 * freq;
    let inc = if freq_frac_bits >= PHASE_FRAC_BITS {
        (scaled >> (freq_frac_bits - PHASE_FRAC_BITS)) / update_rate as u64
    } else {
        let shift = PHASE_FRAC_BITS - freq_frac_bits;
        if scaled > (u64::MAX >> shift) {
            return u32::MAX;
        }
        (scaled << shift) / update_rate as u64
    };
    if inc > u32::MAX as u64 {
        u32::MAX
    } else {
        inc as u32
    }
}

/// A wavetable cell type.
pub trait TableSample: Copy {
    /// Value played when there is nothing to play.
    const SILENCE: Self;

    fn to_i32(self) -> i32;

    /// Narrow an intermediate value, saturating.
    fn from_i32(value: i32) -> Self;

    /// Left-align to 16 bits for the audio path.
    fn to_audio(self) -> i16;
}

impl TableSample for i8 {
    const SILENCE: Self = 0;

    #[inline(always)]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline(always)]
    fn from_i32(value: i32) -> Self {
        value.clamp(i8::MIN as i32, i8::MAX as i32) as i8
    }

    #[inline(always)]
    fn to_audio(self) -> i16 {
        (self as i16) << 8
    }
}

impl TableSample for i16 {
    const SILENCE: Self = 0;

    #[inline(always)]
    fn to_i32(self) -> i32 {
        self as i32
    }

    #[inline(always)]
    fn from_i32(value: i32) -> Self {
        crate::dsp::intrinsics::saturate16(value)
    }

    #[inline(always)]
    fn to_audio(self) -> i16 {
        self
    }
}
