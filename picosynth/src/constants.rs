/// Default audio rate in Hz (frames generated and played per second).
pub const AUDIO_RATE: u32 = 16_384;

/// Default control rate in Hz.
pub const CONTROL_RATE: u32 = 64;

/// Default output ring capacity in frames.
pub const OUTPUT_BUFFER_SIZE: usize = 256;

/// Fractional bits carried by oscillator phase accumulators.
pub const PHASE_FRAC_BITS: u32 = 16;

/// Largest wavetable an oscillator can address with a 32-bit accumulator.
pub const MAX_TABLE_CELLS: usize = 1 << (32 - PHASE_FRAC_BITS);
