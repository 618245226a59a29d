//! Audio and control rate configuration.
//!
//! [`AudioConfig`] is what the application declares; [`Timing`] is the
//! validated form the [`Scheduler`](crate::scheduler::Scheduler) runs on.
//! Validation is a `const fn`, so a bad configuration can be rejected at
//! compile time:
//!
//! ```ignore
//! const TIMING: Timing = match AudioConfig::new(16_384, 64).validate() {
//!     Ok(t) => t,
//!     Err(_) => panic!("bad rates"),
//! };
//! ```

use crate::constants::{AUDIO_RATE, CONTROL_RATE};
use crate::error::ConfigError;

/// Requested audio and control rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Frames per second delivered to the output sink.
    pub audio_rate: u32,
    /// Control updates per second.
    pub control_rate: u32,
}

impl AudioConfig {
    /// 16384 Hz audio, 64 Hz control: 256 frames per control tick.
    pub const DEFAULT: AudioConfig = AudioConfig::new(AUDIO_RATE, CONTROL_RATE);

    pub const fn new(audio_rate: u32, control_rate: u32) -> Self {
        AudioConfig {
            audio_rate,
            control_rate,
        }
    }

    /// Check the rates and derive the control countdown.
    ///
    /// The audio rate must be a non-zero exact multiple of the control rate,
    /// and the resulting ratio must fit in 16 bits.
    pub const fn validate(&self) -> Result<Timing, ConfigError> {
        let audio_rate = self.audio_rate;
        let control_rate = self.control_rate;
        if audio_rate == 0 {
            return Err(ConfigError::ZeroAudioRate);
        }
        if control_rate == 0 {
            return Err(ConfigError::ZeroControlRate);
        }
        if control_rate > audio_rate {
            return Err(ConfigError::ControlRateAboveAudioRate {
                audio_rate,
                control_rate,
            });
        }
        if audio_rate % control_rate != 0 {
            return Err(ConfigError::NonIntegerRatio {
                audio_rate,
                control_rate,
            });
        }
        let ratio = audio_rate / control_rate;
        if ratio > u16::MAX as u32 {
            return Err(ConfigError::RatioTooLarge { ratio });
        }
        Ok(Timing {
            audio_rate,
            control_rate,
            ticks_per_control: ratio as u16,
        })
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        AudioConfig::DEFAULT
    }
}

/// Validated rates. Only obtainable through [`AudioConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    audio_rate: u32,
    control_rate: u32,
    ticks_per_control: u16,
}

impl Timing {
    pub const fn audio_rate(&self) -> u32 {
        self.audio_rate
    }

    pub const fn control_rate(&self) -> u32 {
        self.control_rate
    }

    /// Audio frames produced between consecutive control updates.
    pub const fn ticks_per_control(&self) -> u16 {
        self.ticks_per_control
    }

    /// Elapsed microseconds after `ticks` frames have been played, floored.
    pub const fn micros(&self, ticks: u64) -> u64 {
        let rate = self.audio_rate as u64;
        (ticks / rate) * 1_000_000 + (ticks % rate) * 1_000_000 / rate
    }
}
