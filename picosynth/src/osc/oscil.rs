//! Phase-accumulator wavetable oscillator.
//!
//! The accumulator is a `u32` with 16 fractional bits. Each [`next`](Oscil::next)
//! adds the increment (wrapping) and then reads the cell at
//! `(phase >> 16) & (NUM_CELLS - 1)`, so the index can never leave the
//! table. Table size and update rate are const generics so all of the
//! index arithmetic folds at compile time.

use crate::constants::PHASE_FRAC_BITS;
use crate::error::ConfigError;
use crate::fixmath::{Q15n16, Q16n16, Q24n8};
use crate::node::UnitGenerator;
use crate::rand::XorShift96;

use super::wavetable::{phase_increment, validate_table_len, TableSample};

const FRAC_MASK: u32 = (1 << PHASE_FRAC_BITS) - 1;

/// How a cell is read from the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interpolation {
    /// Truncate the phase to a cell index.
    #[default]
    Nearest,
    /// Blend the two neighbouring cells by the phase fraction.
    Linear,
}

/// Wavetable oscillator over a `NUM_CELLS`-entry table, advanced
/// `UPDATE_RATE` times per second.
///
/// # Example
/// ```ignore
/// use picosynth::osc::{tables::SIN256_INT8, Oscil};
///
/// let mut sine: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
/// sine.set_freq(440);
/// let s = sine.next();
/// ```
pub struct Oscil<'a, T: TableSample, const NUM_CELLS: usize, const UPDATE_RATE: u32> {
    table: &'a [T; NUM_CELLS],
    phase: u32,
    phase_inc: u32,
    interpolation: Interpolation,
}

impl<'a, T: TableSample, const NUM_CELLS: usize, const UPDATE_RATE: u32>
    Oscil<'a, T, NUM_CELLS, UPDATE_RATE>
{
    const GEOMETRY: () = {
        assert!(
            validate_table_len(NUM_CELLS).is_ok(),
            "wavetable length must be a power of two no larger than 65536"
        );
        assert!(UPDATE_RATE > 0, "update rate must be non-zero");
    };

    const MASK: usize = NUM_CELLS - 1;

    /// Oscillator at phase zero, not moving until a frequency is set.
    pub const fn new(table: &'a [T; NUM_CELLS]) -> Self {
        let () = Self::GEOMETRY;
        Oscil {
            table,
            phase: 0,
            phase_inc: 0,
            interpolation: Interpolation::Nearest,
        }
    }

    /// Build from a slice whose length is only known at runtime.
    pub fn from_slice(table: &'a [T]) -> Result<Self, ConfigError> {
        validate_table_len(NUM_CELLS)?;
        if UPDATE_RATE == 0 {
            return Err(ConfigError::ZeroAudioRate);
        }
        let table: &'a [T; NUM_CELLS] = table.try_into().map_err(|_| {
            ConfigError::TableLengthMismatch {
                expected: NUM_CELLS,
                actual: table.len(),
            }
        })?;
        Ok(Oscil {
            table,
            phase: 0,
            phase_inc: 0,
            interpolation: Interpolation::Nearest,
        })
    }

    /// Swap in another table of the same size. Phase is kept.
    pub fn set_table(&mut self, table: &'a [T; NUM_CELLS]) {
        self.table = table;
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Increment for an integer frequency in Hz. Floors.
    pub const fn phase_inc_from_freq(freq: u32) -> u32 {
        phase_increment(NUM_CELLS, freq as u64, 0, UPDATE_RATE)
    }

    /// Set the frequency in whole Hz. Zero stops the phase.
    pub fn set_freq(&mut self, freq: u32) {
        self.phase_inc = Self::phase_inc_from_freq(freq);
    }

    /// Set the frequency from a float. Negative and NaN frequencies give zero.
    pub fn set_freq_f32(&mut self, freq: f32) {
        let inc = freq * (NUM_CELLS as f32 * (1u32 << PHASE_FRAC_BITS) as f32)
            / UPDATE_RATE as f32;
        // Float to int `as` saturates and maps NaN to zero.
        self.phase_inc = inc as u32;
    }

    pub fn set_freq_q24n8(&mut self, freq: Q24n8) {
        self.phase_inc = phase_increment(NUM_CELLS, freq.raw() as u64, 8, UPDATE_RATE);
    }

    pub fn set_freq_q16n16(&mut self, freq: Q16n16) {
        self.phase_inc = phase_increment(NUM_CELLS, freq.raw() as u64, 16, UPDATE_RATE);
    }

    /// Tune to a MIDI note number (69 = 440 Hz).
    pub fn set_freq_midi(&mut self, note: u8) {
        self.set_freq_q16n16(crate::midi::mtof_q16n16(note));
    }

    /// Signed frequency: a negative value plays the table backwards.
    pub fn set_freq_signed_q15n16(&mut self, freq: Q15n16) {
        let magnitude = freq.raw().unsigned_abs();
        let inc = phase_increment(NUM_CELLS, magnitude as u64, 16, UPDATE_RATE);
        self.phase_inc = if freq.is_negative() {
            inc.wrapping_neg()
        } else {
            inc
        };
    }

    pub fn set_phase_inc(&mut self, phase_inc: u32) {
        self.phase_inc = phase_inc;
    }

    pub fn phase_inc(&self) -> u32 {
        self.phase_inc
    }

    /// Jump to the start of cell `index` (wrapped into the table).
    pub fn set_phase(&mut self, index: usize) {
        self.phase = ((index & Self::MASK) as u32) << PHASE_FRAC_BITS;
    }

    pub fn set_phase_fractional(&mut self, phase: u32) {
        self.phase = phase;
    }

    /// Raw 16.16 accumulator.
    pub fn phase_fractional(&self) -> u32 {
        self.phase
    }

    /// Advance one tick and read.
    #[inline]
    pub fn next(&mut self) -> T {
        self.phase = self.phase.wrapping_add(self.phase_inc);
        self.read(self.phase)
    }

    /// Advance one tick and read at a randomly jittered position within
    /// the current cell. Trades quantisation buzz for noise at low
    /// frequencies.
    pub fn next_dithered(&mut self, rng: &mut XorShift96) -> T {
        self.phase = self.phase.wrapping_add(self.phase_inc);
        let jitter = rng.next_u32() & FRAC_MASK;
        self.read(self.phase.wrapping_add(jitter))
    }

    /// Advance one tick and read with a phase offset, in whole cycles as
    /// 15.16 (`1.0` = one full table length).
    pub fn phase_mod(&mut self, modulation: Q15n16) -> T {
        self.phase = self.phase.wrapping_add(self.phase_inc);
        let offset = (modulation.raw() as u32).wrapping_mul(NUM_CELLS as u32);
        self.read(self.phase.wrapping_add(offset))
    }

    /// Cell at `index`, wrapped.
    pub fn at_index(&self, index: usize) -> T {
        self.table[index & Self::MASK]
    }

    #[inline(always)]
    fn read(&self, phase: u32) -> T {
        let index = (phase >> PHASE_FRAC_BITS) as usize & Self::MASK;
        let a = self.table[index];
        match self.interpolation {
            Interpolation::Nearest => a,
            Interpolation::Linear => {
                let b = self.table[(index + 1) & Self::MASK];
                let frac = (phase & FRAC_MASK) as i64;
                let delta = (b.to_i32() - a.to_i32()) as i64;
                T::from_i32(a.to_i32() + ((delta * frac) >> PHASE_FRAC_BITS) as i32)
            }
        }
    }
}

impl<T: TableSample, const NUM_CELLS: usize, const UPDATE_RATE: u32> UnitGenerator
    for Oscil<'_, T, NUM_CELLS, UPDATE_RATE>
{
    #[inline]
    fn update_audio(&mut self) -> i16 {
        self.next().to_audio()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::tables::{saw_table, SIN256_INT8};

    static RAMP: [i8; 8] = [0, 10, 20, 30, 40, 50, 60, 70];

    #[test]
    fn reads_after_advancing() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        // One cell per tick.
        osc.set_freq(1);
        assert_eq!(osc.phase_inc(), 1 << 16);
        assert_eq!(osc.next(), 10);
        assert_eq!(osc.next(), 20);
    }

    #[test]
    fn wraps_modulo_table_length() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        osc.set_phase_inc(3 << 16);
        let got: Vec<i8> = (0..8).map(|_| osc.next()).collect();
        assert_eq!(got, [30, 60, 10, 40, 70, 20, 50, 0]);
    }

    #[test]
    fn arbitrary_increment_stays_in_range() {
        static SAW: [i8; 64] = saw_table::<64>();
        let mut osc: Oscil<i8, 64, 16384> = Oscil::new(&SAW);
        let mut inc = 0x1234_5678u32;
        for _ in 0..1000 {
            osc.set_phase_inc(inc);
            let v = osc.next();
            let cell = (osc.phase_fractional() >> 16) as usize % 64;
            assert_eq!(v, SAW[cell]);
            inc = inc.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        }
    }

    #[test]
    fn total_phase_advance_matches_increment() {
        let mut osc: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
        osc.set_freq(440);
        let inc = osc.phase_inc();
        for _ in 0..1000 {
            osc.next();
        }
        assert_eq!(osc.phase_fractional(), inc.wrapping_mul(1000));
    }

    #[test]
    fn increment_for_reference_tuning() {
        assert_eq!(Oscil::<i16, 2048, 16384>::phase_inc_from_freq(440), 3_604_480);
    }

    #[test]
    fn zero_frequency_holds_output() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        osc.set_phase(3);
        osc.set_freq(0);
        assert_eq!(osc.next(), 30);
        assert_eq!(osc.next(), 30);
    }

    #[test]
    fn fractional_setters_agree() {
        let mut a: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
        let mut b: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
        let mut c: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
        let mut d: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
        a.set_freq(440);
        b.set_freq_q16n16(Q16n16::from_int(440));
        c.set_freq_q24n8(Q24n8::from_int(440));
        d.set_freq_f32(440.0);
        assert_eq!(a.phase_inc(), b.phase_inc());
        assert_eq!(a.phase_inc(), c.phase_inc());
        assert_eq!(a.phase_inc(), d.phase_inc());
    }

    #[test]
    fn negative_float_frequency_is_zero() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        osc.set_freq_f32(-10.0);
        assert_eq!(osc.phase_inc(), 0);
    }

    #[test]
    fn signed_frequency_runs_backwards() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        osc.set_freq_signed_q15n16(Q15n16::from_int(-1));
        assert_eq!(osc.next(), 70);
        assert_eq!(osc.next(), 60);
        osc.set_freq_signed_q15n16(Q15n16::from_int(2));
        assert_eq!(osc.next(), 0);
    }

    #[test]
    fn midi_note_69_is_440() {
        let mut a: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
        a.set_freq_midi(69);
        assert_eq!(a.phase_inc(), Oscil::<i8, 256, 16384>::phase_inc_from_freq(440));
    }

    #[test]
    fn linear_interpolation_blends_neighbours() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        osc.set_interpolation(Interpolation::Linear);
        osc.set_phase_inc(1 << 15); // half a cell
        assert_eq!(osc.next(), 5);
        assert_eq!(osc.next(), 10);
        assert_eq!(osc.next(), 15);
        // Between the last and first cell.
        osc.set_phase_fractional((7 << 16) | 0x8000);
        osc.set_phase_inc(0);
        assert_eq!(osc.next(), 35);
    }

    #[test]
    fn phase_mod_offsets_whole_cycles() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        // Quarter of a cycle = 2 cells.
        let quarter = Q15n16::from_raw(1 << 14);
        assert_eq!(osc.phase_mod(quarter), 20);
        let full = Q15n16::from_int(1);
        assert_eq!(osc.phase_mod(full), 0);
    }

    #[test]
    fn dither_stays_within_one_cell() {
        let mut rng = XorShift96::new();
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        let (mut low, mut high) = (0, 0);
        for _ in 0..100 {
            osc.set_phase_fractional((2 << 16) | 0x8000);
            match osc.next_dithered(&mut rng) {
                20 => low += 1,
                30 => high += 1,
                other => panic!("read outside the cell pair: {}", other),
            }
        }
        assert!(low > 0 && high > 0);
    }

    #[test]
    fn from_slice_checks_length() {
        let data = [0i8; 16];
        assert!(Oscil::<i8, 16, 16384>::from_slice(&data).is_ok());
        assert_eq!(
            Oscil::<i8, 8, 16384>::from_slice(&data).err(),
            Some(ConfigError::TableLengthMismatch {
                expected: 8,
                actual: 16
            })
        );
        let odd = [0i8; 12];
        assert_eq!(
            Oscil::<i8, 12, 16384>::from_slice(&odd).err(),
            Some(ConfigError::TableNotPowerOfTwo { len: 12 })
        );
    }

    #[test]
    fn at_index_wraps() {
        let osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        assert_eq!(osc.at_index(9), 10);
    }

    #[test]
    fn unit_generator_scales_to_16_bits() {
        let mut osc: Oscil<i8, 8, 8> = Oscil::new(&RAMP);
        osc.set_phase_inc(1 << 16);
        assert_eq!(osc.update_audio(), 10 << 8);
    }
}
