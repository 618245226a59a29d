//! MIDI note number to frequency.

use crate::fixmath::Q16n16;

/// Notes 0 to 11 (C-1 to B-1) in 16.16 Hz. Higher octaves are shifts.
const OCTAVE_ZERO_Q16N16: [u32; 12] = [
    535_809, 567_670, 601_425, 637_188, 675_077, 715_219,
    757_749, 802_807, 850_544, 901_120, 954_703, 1_011_473,
];

/// Equal-tempered frequency for a (fractional) note. Note 0 gives 0 Hz,
/// so a zeroed note reads as silence.
pub fn mtof(note: f32) -> f32 {
    if note == 0.0 {
        return 0.0;
    }
    440.0 * libm::powf(2.0, (note - 69.0) / 12.0)
}

/// Integer-only lookup, exact to the table's 16 fractional bits within an
/// octave. Note 69 is exactly 440 Hz; notes above 127 clamp.
pub const fn mtof_q16n16(note: u8) -> Q16n16 {
    let note = if note > 127 { 127 } else { note };
    let base = OCTAVE_ZERO_Q16N16[(note % 12) as usize];
    Q16n16::from_raw(base << (note / 12))
}

/// Whole-Hz frequency, floored.
pub const fn mtof_hz(note: u8) -> u16 {
    mtof_q16n16(note).to_int() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_is_440() {
        assert_eq!(mtof_q16n16(69), Q16n16::from_int(440));
        assert_eq!(mtof_hz(69), 440);
        assert!((mtof(69.0) - 440.0).abs() < 1e-3);
    }

    #[test]
    fn octaves_double() {
        assert_eq!(mtof_q16n16(81).raw(), 2 * mtof_q16n16(69).raw());
        assert_eq!(mtof_hz(57), 220);
    }

    #[test]
    fn fixed_and_float_agree() {
        for note in 1..=127u8 {
            let fixed = mtof_q16n16(note).to_f32();
            let float = mtof(note as f32);
            assert!((fixed - float).abs() / float < 1e-4, "note {}", note);
        }
    }

    #[test]
    fn edges() {
        assert_eq!(mtof(0.0), 0.0);
        assert_eq!(mtof_hz(60), 261);
        assert_eq!(mtof_hz(127), 12_543);
        assert_eq!(mtof_q16n16(200), mtof_q16n16(127));
        // Fractional notes fall between neighbours.
        let between = mtof(69.5);
        assert!(between > mtof(69.0) && between < mtof(70.0));
    }
}
