//! Scaled-integer arithmetic.
//!
//! Two layers:
//!
//! - [`UFix`] / [`SFix`]: typed fixed-point values whose integer and
//!   fractional bit counts are const generics, so a `Q16n16` can't be added
//!   to a `Q24n8` by accident. Conversions from floats and integers clamp.
//! - [`widening`]: raw-integer multiplies with the output width and the
//!   rounding rule fixed per function, for generators that scale samples
//!   by envelopes or modulation depths. The built-in oscillators and
//!   `Gain` compute their products exactly in wider integers instead.

pub mod types;
pub mod widening;

pub use types::*;
