//! Saturation arithmetic and DSP instruction wrappers.

pub mod helpers;
pub mod intrinsics;
