//! PWM output over [`embedded_hal::pwm::SetDutyCycle`].
//!
//! Each signed frame is biased to offset binary and scaled onto the
//! channel's duty range, so silence sits at 50% duty. Filter the pin with
//! an RC low-pass to recover audio.

use embedded_hal::pwm::SetDutyCycle;

use super::frame::{MonoFrame, StereoFrame};
use super::sink::OutputSink;

/// Map a signed sample onto `0..=max_duty`.
#[inline]
fn duty_for(sample: i16, max_duty: u16) -> u16 {
    let level = (sample as i32 + 0x8000) as u32; // 0..=65535
    ((level * max_duty as u32 + 0x7FFF) / 0xFFFF) as u16
}

/// Mono PWM sink. Failed duty updates are counted, not retried.
pub struct PwmSink<P> {
    pwm: P,
    errors: u32,
}

impl<P: SetDutyCycle> PwmSink<P> {
    pub fn new(pwm: P) -> Self {
        PwmSink { pwm, errors: 0 }
    }

    /// Duty updates the channel rejected.
    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> P {
        self.pwm
    }
}

impl<P: SetDutyCycle> OutputSink<MonoFrame> for PwmSink<P> {
    #[inline]
    fn write(&mut self, frame: MonoFrame) {
        let duty = duty_for(frame.0, self.pwm.max_duty_cycle());
        if self.pwm.set_duty_cycle(duty).is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
    }
}

/// Two PWM channels, one per side.
pub struct StereoPwmSink<L, R> {
    left: L,
    right: R,
    errors: u32,
}

impl<L: SetDutyCycle, R: SetDutyCycle> StereoPwmSink<L, R> {
    pub fn new(left: L, right: R) -> Self {
        StereoPwmSink {
            left,
            right,
            errors: 0,
        }
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> (L, R) {
        (self.left, self.right)
    }
}

impl<L: SetDutyCycle, R: SetDutyCycle> OutputSink<StereoFrame> for StereoPwmSink<L, R> {
    #[inline]
    fn write(&mut self, frame: StereoFrame) {
        let l = duty_for(frame.left, self.left.max_duty_cycle());
        if self.left.set_duty_cycle(l).is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
        let r = duty_for(frame.right, self.right.max_duty_cycle());
        if self.right.set_duty_cycle(r).is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
    }
}
