//! Wavetable oscillators.
//!
//! - [`Oscil`]: looping phase-accumulator oscillator over a power-of-two table.
//! - [`Sample`]: one-shot or looping player over an arbitrary-length table.
//! - [`tables`]: built-in waveforms.

pub mod oscil;
pub mod sample;
pub mod tables;
pub mod wavetable;

pub use oscil::{Interpolation, Oscil};
pub use sample::Sample;
pub use wavetable::{phase_increment, validate_table_len, TableSample};
