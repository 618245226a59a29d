//! Xorshift96 pseudo-random numbers (Marsaglia 2003), period 2^96 - 1.
//!
//! Cheap enough to call per sample. Not for anything security-related.

#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct XorShift96 {
    x: u32,
    y: u32,
    z: u32,
}

impl XorShift96 {
    pub const fn new() -> Self {
        XorShift96 {
            x: 132_456_789,
            y: 362_436_069,
            z: 521_288_629,
        }
    }

    /// Reseed, e.g. from a floating analog pin. Only the first word is
    /// replaced, so a zero seed still leaves a valid state.
    pub fn seed(&mut self, seed: u32) {
        self.x = seed;
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.x;
        x ^= x << 16;
        x ^= x >> 5;
        x ^= x << 1;
        self.x = self.y;
        self.y = self.z;
        self.z = x ^ self.x ^ self.y;
        self.z
    }

    /// Uniform-ish value in `0..max` (16-bit multiply-shift).
    pub fn below(&mut self, max: u16) -> u16 {
        (((self.next_u32() & 0xFFFF) * max as u32) >> 16) as u16
    }

    /// Value in `min..max`. An empty or inverted range returns `min`.
    pub fn range(&mut self, min: i16, max: i16) -> i16 {
        if max <= min {
            return min;
        }
        let span = (max as i32 - min as i32) as u32;
        let offset = ((self.next_u32() & 0xFFFF) * span) >> 16;
        (min as i32 + offset as i32) as i16
    }
}

impl Default for XorShift96 {
    fn default() -> Self {
        Self::new()
    }
}
