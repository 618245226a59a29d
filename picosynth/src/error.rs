//! Error types for setup-time configuration and the analog sampler.
//!
//! Nothing on the audio path returns these. Runtime trouble (underruns,
//! overruns, sink failures) is counted instead, see
//! [`Diagnostics`](crate::scheduler::Diagnostics).

use core::fmt;

/// Invalid rates or wavetable geometry, detected before playback starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The audio rate was zero.
    ZeroAudioRate,
    /// The control rate was zero.
    ZeroControlRate,
    /// The control rate exceeds the audio rate.
    ControlRateAboveAudioRate { audio_rate: u32, control_rate: u32 },
    /// The audio rate is not an exact multiple of the control rate.
    NonIntegerRatio { audio_rate: u32, control_rate: u32 },
    /// Audio frames per control tick do not fit the 16-bit countdown.
    RatioTooLarge { ratio: u32 },
    /// Wavetable length is zero or not a power of two.
    TableNotPowerOfTwo { len: usize },
    /// Wavetable is longer than a 16.16 phase accumulator can index.
    TableTooLarge { len: usize, max: usize },
    /// A runtime slice did not match the oscillator's declared table size.
    TableLengthMismatch { expected: usize, actual: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::ZeroAudioRate => write!(f, "audio rate must be non-zero"),
            ConfigError::ZeroControlRate => write!(f, "control rate must be non-zero"),
            ConfigError::ControlRateAboveAudioRate { audio_rate, control_rate } => write!(
                f,
                "control rate {} Hz exceeds audio rate {} Hz",
                control_rate, audio_rate
            ),
            ConfigError::NonIntegerRatio { audio_rate, control_rate } => write!(
                f,
                "audio rate {} Hz is not a multiple of control rate {} Hz",
                audio_rate, control_rate
            ),
            ConfigError::RatioTooLarge { ratio } => {
                write!(f, "{} audio ticks per control tick exceeds 65535", ratio)
            }
            ConfigError::TableNotPowerOfTwo { len } => {
                write!(f, "table length {} is not a power of two", len)
            }
            ConfigError::TableTooLarge { len, max } => {
                write!(f, "table length {} exceeds maximum {}", len, max)
            }
            ConfigError::TableLengthMismatch { expected, actual } => {
                write!(f, "expected a {}-cell table, got {}", expected, actual)
            }
        }
    }
}

/// Errors returned by [`AnalogSampler`](crate::analog::AnalogSampler) requests.
///
/// None of these block: a `Busy` caller simply retries later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogError {
    /// Channel index is outside the sampler's channel count.
    InvalidChannel { channel: u8, channels: u8 },
    /// The shared converter is already running a conversion.
    Busy { pending: u8 },
}

impl fmt::Display for AnalogError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalogError::InvalidChannel { channel, channels } => write!(
                f,
                "analog channel {} out of range (0-{})",
                channel,
                channels.saturating_sub(1)
            ),
            AnalogError::Busy { pending } => {
                write!(f, "converter busy with channel {}", pending)
            }
        }
    }
}

/// Failure to bring up a [`Scheduler`](crate::scheduler::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError<E> {
    /// Rates failed validation; nothing was armed.
    Config(ConfigError),
    /// The host timer refused to start.
    Timer(E),
}

impl<E> From<ConfigError> for StartError<E> {
    fn from(error: ConfigError) -> Self {
        StartError::Config(error)
    }
}

impl<E: fmt::Debug> fmt::Display for StartError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StartError::Config(e) => write!(f, "configuration error: {}", e),
            StartError::Timer(e) => write!(f, "timer error: {:?}", e),
        }
    }
}
