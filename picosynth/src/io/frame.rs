//! Output frames: what one audio tick hands to the sink.

use crate::dsp::intrinsics::saturate16;

/// A frame the [`OutputBuffer`](super::OutputBuffer) can carry.
pub trait AudioFrame: Copy + Send {
    /// Mid-scale silence.
    const SILENCE: Self;
}

/// One signed 16-bit sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonoFrame(pub i16);

/// A left/right pair of signed 16-bit samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StereoFrame {
    pub left: i16,
    pub right: i16,
}

impl AudioFrame for MonoFrame {
    const SILENCE: Self = MonoFrame(0);
}

impl AudioFrame for StereoFrame {
    const SILENCE: Self = StereoFrame { left: 0, right: 0 };
}

/// Left-align a `BITS`-bit signed value to 16 bits, saturating if the
/// value overflows its declared width.
#[inline]
fn align<const BITS: u32>(value: i32) -> i16 {
    if BITS >= 16 {
        saturate16(value >> BITS.saturating_sub(16))
    } else {
        let hi = (1i32 << (BITS - 1)) - 1;
        let lo = -(1i32 << (BITS - 1));
        (value.clamp(lo, hi) << 16u32.saturating_sub(BITS)) as i16
    }
}

/// Offset-binary conversion for unipolar sinks (PWM duty, DACs).
#[inline]
fn unsigned<const BITS: u32>(sample: i16) -> u16 {
    ((sample as i32 + 0x8000) >> 16u32.saturating_sub(BITS)) as u16
}

impl MonoFrame {
    pub const fn new(sample: i16) -> Self {
        MonoFrame(sample)
    }

    /// From an 8-bit sample, as read from most wavetables.
    pub const fn from_8bit(sample: i8) -> Self {
        MonoFrame((sample as i16) << 8)
    }

    /// From a value carrying `BITS` significant bits (e.g. a sum of
    /// several scaled oscillators). Saturates.
    pub fn from_n_bit<const BITS: u32>(value: i32) -> Self {
        MonoFrame(align::<BITS>(value))
    }

    /// Unsigned `BITS`-bit level, mid-scale for silence.
    pub fn to_unsigned<const BITS: u32>(self) -> u16 {
        unsigned::<BITS>(self.0)
    }
}

impl StereoFrame {
    pub const fn new(left: i16, right: i16) -> Self {
        StereoFrame { left, right }
    }

    pub const fn from_8bit(left: i8, right: i8) -> Self {
        StereoFrame {
            left: (left as i16) << 8,
            right: (right as i16) << 8,
        }
    }

    pub fn from_n_bit<const BITS: u32>(left: i32, right: i32) -> Self {
        StereoFrame {
            left: align::<BITS>(left),
            right: align::<BITS>(right),
        }
    }

    pub fn to_unsigned<const BITS: u32>(self) -> (u16, u16) {
        (unsigned::<BITS>(self.left), unsigned::<BITS>(self.right))
    }
}

impl From<MonoFrame> for StereoFrame {
    fn from(frame: MonoFrame) -> Self {
        StereoFrame::new(frame.0, frame.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eight_bit_alignment() {
        assert_eq!(MonoFrame::from_8bit(-128), MonoFrame(-32_768));
        assert_eq!(MonoFrame::from_8bit(1), MonoFrame(256));
        assert_eq!(StereoFrame::from_8bit(1, -1), StereoFrame::new(256, -256));
    }

    #[test]
    fn n_bit_alignment_saturates() {
        assert_eq!(MonoFrame::from_n_bit::<12>(2047), MonoFrame(2047 << 4));
        assert_eq!(MonoFrame::from_n_bit::<12>(5000), MonoFrame(2047 << 4));
        assert_eq!(MonoFrame::from_n_bit::<12>(-5000), MonoFrame(-32_768));
        assert_eq!(MonoFrame::from_n_bit::<16>(-1), MonoFrame(-1));
        // Four summed 8-bit oscillators carry 10 bits.
        assert_eq!(MonoFrame::from_n_bit::<10>(4 * 127), MonoFrame(508 << 6));
        assert_eq!(MonoFrame::from_n_bit::<24>(1 << 22), MonoFrame(1 << 14));
        assert_eq!(MonoFrame::from_n_bit::<17>(1 << 17), MonoFrame(i16::MAX));
    }

    #[test]
    fn unsigned_is_offset_binary() {
        assert_eq!(MonoFrame::SILENCE.to_unsigned::<8>(), 128);
        assert_eq!(MonoFrame(i16::MIN).to_unsigned::<12>(), 0);
        assert_eq!(MonoFrame(i16::MAX).to_unsigned::<12>(), 4095);
        assert_eq!(MonoFrame(0).to_unsigned::<16>(), 0x8000);
        assert_eq!(
            StereoFrame::new(i16::MIN, i16::MAX).to_unsigned::<10>(),
            (0, 1023)
        );
    }

    #[test]
    fn mono_to_stereo() {
        assert_eq!(StereoFrame::from(MonoFrame(7)), StereoFrame::new(7, 7));
    }
}
