//! One-shot and looping sample playback.
//!
//! Unlike [`Oscil`](super::Oscil), a [`Sample`] does not wrap by masking.
//! It reads the cell under the phase and then advances. Once the phase
//! reaches the end offset it either jumps back to the start offset
//! (looping) or stops and returns [`TableSample::SILENCE`]. Only indices
//! below `end <= NUM_CELLS` are ever read, so any table length up to
//! 65535 cells works.

use crate::constants::PHASE_FRAC_BITS;
use crate::fixmath::{Q16n16, Q24n8};
use crate::node::UnitGenerator;

use super::wavetable::{phase_increment, TableSample};

/// Sample player over a `NUM_CELLS`-entry table at `UPDATE_RATE` Hz.
///
/// `set_freq(f)` plays the whole table `f` times per second, so for a
/// recording made at the update rate, `f = UPDATE_RATE / NUM_CELLS` plays
/// it at its original pitch.
pub struct Sample<'a, T: TableSample, const NUM_CELLS: usize, const UPDATE_RATE: u32> {
    table: &'a [T; NUM_CELLS],
    phase: u32,
    phase_inc: u32,
    start: u32,
    end: u32,
    looping: bool,
    playing: bool,
}

impl<'a, T: TableSample, const NUM_CELLS: usize, const UPDATE_RATE: u32>
    Sample<'a, T, NUM_CELLS, UPDATE_RATE>
{
    const GEOMETRY: () = {
        assert!(
            NUM_CELLS > 0 && NUM_CELLS <= u16::MAX as usize,
            "sample table must hold 1 to 65535 cells"
        );
        assert!(UPDATE_RATE > 0, "update rate must be non-zero");
    };

    /// Stopped player covering the whole table, playing at one cell per tick.
    pub const fn new(table: &'a [T; NUM_CELLS]) -> Self {
        let () = Self::GEOMETRY;
        let end = (NUM_CELLS as u32) << PHASE_FRAC_BITS;
        Sample {
            table,
            phase: end,
            phase_inc: 1 << PHASE_FRAC_BITS,
            start: 0,
            end,
            looping: false,
            playing: false,
        }
    }

    pub fn set_table(&mut self, table: &'a [T; NUM_CELLS]) {
        self.table = table;
    }

    /// Restart from the start offset.
    pub fn start(&mut self) {
        self.phase = self.start;
        self.playing = true;
    }

    /// Restart from cell `offset`.
    pub fn start_from(&mut self, offset: u16) {
        self.phase = Self::cell_to_phase(offset);
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.phase = self.end;
        self.playing = false;
    }

    pub fn set_start(&mut self, cell: u16) {
        self.start = Self::cell_to_phase(cell);
    }

    /// Playback stops (or loops) before reading cell `cell`.
    pub fn set_end(&mut self, cell: u16) {
        self.end = Self::cell_to_phase(cell);
    }

    pub fn range_whole_table(&mut self) {
        self.start = 0;
        self.end = (NUM_CELLS as u32) << PHASE_FRAC_BITS;
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    fn cell_to_phase(cell: u16) -> u32 {
        let cell = (cell as usize).min(NUM_CELLS) as u32;
        cell << PHASE_FRAC_BITS
    }

    pub const fn phase_inc_from_freq(freq: u32) -> u32 {
        phase_increment(NUM_CELLS, freq as u64, 0, UPDATE_RATE)
    }

    pub fn set_freq(&mut self, freq: u32) {
        self.phase_inc = Self::phase_inc_from_freq(freq);
    }

    pub fn set_freq_f32(&mut self, freq: f32) {
        let inc = freq * (NUM_CELLS as f32 * (1u32 << PHASE_FRAC_BITS) as f32)
            / UPDATE_RATE as f32;
        self.phase_inc = inc as u32;
    }

    pub fn set_freq_q24n8(&mut self, freq: Q24n8) {
        self.phase_inc = phase_increment(NUM_CELLS, freq.raw() as u64, 8, UPDATE_RATE);
    }

    pub fn set_freq_q16n16(&mut self, freq: Q16n16) {
        self.phase_inc = phase_increment(NUM_CELLS, freq.raw() as u64, 16, UPDATE_RATE);
    }

    /// Play the whole table at the frequency of a MIDI note.
    pub fn set_freq_midi(&mut self, note: u8) {
        self.set_freq_q16n16(crate::midi::mtof_q16n16(note));
    }

    pub fn set_phase_inc(&mut self, phase_inc: u32) {
        self.phase_inc = phase_inc;
    }

    pub fn phase_inc(&self) -> u32 {
        self.phase_inc
    }

    /// Read the current cell, then advance.
    pub fn next(&mut self) -> T {
        if !self.playing {
            return T::SILENCE;
        }
        if self.phase >= self.end {
            let span = self.end.saturating_sub(self.start);
            if !self.looping || span == 0 {
                self.stop();
                return T::SILENCE;
            }
            let overshoot = self.phase.saturating_sub(self.end) % span;
            self.phase = self.start + overshoot;
        }
        let index = (self.phase >> PHASE_FRAC_BITS) as usize;
        let out = self.table.get(index).copied().unwrap_or(T::SILENCE);
        self.phase = self.phase.saturating_add(self.phase_inc);
        out
    }
}

impl<T: TableSample, const NUM_CELLS: usize, const UPDATE_RATE: u32> UnitGenerator
    for Sample<'_, T, NUM_CELLS, UPDATE_RATE>
{
    #[inline]
    fn update_audio(&mut self) -> i16 {
        self.next().to_audio()
    }
}
