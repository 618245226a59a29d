//! The unit-generator contract and static graph composition.
//!
//! A [`UnitGenerator`] produces one mono sample per audio tick and may do
//! slower parameter work once per control tick. The
//! [`Scheduler`](crate::scheduler::Scheduler) drives an [`AudioGraph`],
//! which turns generators into output frames:
//!
//! ```ignore
//! let graph = Mono((carrier, Gain::new(noise, Q8n8::from_f32(0.25))));
//! ```
//!
//! Tuples and arrays of generators mix by saturating sum. Everything is
//! resolved at compile time; there is no dynamic dispatch per sample.

use crate::dsp::helpers::mix_saturating;
use crate::dsp::intrinsics::saturate16;
use crate::fixmath::Q8n8;
use crate::io::{AudioFrame, MonoFrame, StereoFrame};

/// A synthesis node.
pub trait UnitGenerator {
    /// Called once per control tick, before that tick's first audio frame.
    fn update_control(&mut self) {}

    /// Produce the next sample. Called once per audio tick.
    fn update_audio(&mut self) -> i16;
}

/// What the scheduler runs: control updates plus one frame per tick.
pub trait AudioGraph {
    type Frame: AudioFrame;

    fn update_control(&mut self);

    fn update_audio(&mut self) -> Self::Frame;
}

/// A generator played to a mono output.
pub struct Mono<G>(pub G);

/// Two generators played to the left and right channels.
pub struct Stereo<L, R> {
    pub left: L,
    pub right: R,
}

impl<L, R> Stereo<L, R> {
    pub const fn new(left: L, right: R) -> Self {
        Stereo { left, right }
    }
}

impl<G: UnitGenerator> AudioGraph for Mono<G> {
    type Frame = MonoFrame;

    #[inline]
    fn update_control(&mut self) {
        self.0.update_control();
    }

    #[inline]
    fn update_audio(&mut self) -> MonoFrame {
        MonoFrame(self.0.update_audio())
    }
}

impl<L: UnitGenerator, R: UnitGenerator> AudioGraph for Stereo<L, R> {
    type Frame = StereoFrame;

    #[inline]
    fn update_control(&mut self) {
        self.left.update_control();
        self.right.update_control();
    }

    #[inline]
    fn update_audio(&mut self) -> StereoFrame {
        StereoFrame::new(self.left.update_audio(), self.right.update_audio())
    }
}

impl<G: UnitGenerator + ?Sized> UnitGenerator for &mut G {
    fn update_control(&mut self) {
        (**self).update_control();
    }

    fn update_audio(&mut self) -> i16 {
        (**self).update_audio()
    }
}

macro_rules! impl_mix_tuple {
    ($($name:ident),+) => {
        impl<$($name: UnitGenerator),+> UnitGenerator for ($($name,)+) {
            #[allow(non_snake_case)]
            fn update_control(&mut self) {
                let ($($name,)+) = self;
                $($name.update_control();)+
            }

            #[allow(non_snake_case)]
            #[inline]
            fn update_audio(&mut self) -> i16 {
                let ($($name,)+) = self;
                let mut acc = 0i32;
                $(acc += $name.update_audio() as i32;)+
                saturate16(acc)
            }
        }
    };
}

impl_mix_tuple!(A);
impl_mix_tuple!(A, B);
impl_mix_tuple!(A, B, C);
impl_mix_tuple!(A, B, C, D);
impl_mix_tuple!(A, B, C, D, E);
impl_mix_tuple!(A, B, C, D, E, F);

impl<G: UnitGenerator, const N: usize> UnitGenerator for [G; N] {
    fn update_control(&mut self) {
        for g in self.iter_mut() {
            g.update_control();
        }
    }

    #[inline]
    fn update_audio(&mut self) -> i16 {
        mix_saturating(self.iter_mut().map(|g| g.update_audio()))
    }
}

/// Scales a generator by an 8.8 level (`1.0` = unity, up to just under 256x).
pub struct Gain<G> {
    pub inner: G,
    level: Q8n8,
}

impl<G> Gain<G> {
    pub const UNITY: Q8n8 = Q8n8::from_int(1);

    pub const fn new(inner: G, level: Q8n8) -> Self {
        Gain { inner, level }
    }

    pub fn set_level(&mut self, level: Q8n8) {
        self.level = level;
    }

    pub fn level(&self) -> Q8n8 {
        self.level
    }
}

impl<G: UnitGenerator> UnitGenerator for Gain<G> {
    fn update_control(&mut self) {
        self.inner.update_control();
    }

    #[inline]
    fn update_audio(&mut self) -> i16 {
        let s = self.inner.update_audio() as i32;
        saturate16((s * self.level.raw() as i32) >> 8)
    }
}
