//! # picosynth
//!
//! A `no_std`, allocation-free audio synthesis engine for small
//! microcontrollers. User code supplies unit generators; the engine runs
//! them at a fixed audio rate, updates their parameters at a slower
//! control rate and samples analog inputs in the background, without
//! ever blocking the audio path.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Numbers | [`fixmath`] / [`dsp`] | Fixed-point types, widening multiplies, saturation |
//! | Synthesis | [`osc`] / [`node`] | Wavetable oscillators, sample player, the `UnitGenerator` contract |
//! | Output | [`io`] | Frames, the SPSC output ring, sinks and the interrupt handler |
//! | Input | [`analog`] | Non-blocking round-robin ADC sampler |
//! | Engine | [`scheduler`] | The foreground loop binding it all to a timer |
//! | Utilities | [`midi`] / [`rand`] / [`event_delay`] | Note tuning, noise, control-rate timing |
//!
//! ## Quick start
//!
//! ```ignore
//! use picosynth::config::AudioConfig;
//! use picosynth::io::{MonoFrame, OutputBuffer, OutputHandler};
//! use picosynth::node::Mono;
//! use picosynth::osc::{tables::SIN256_INT8, Oscil};
//! use picosynth::scheduler::Scheduler;
//!
//! static BUFFER: OutputBuffer<MonoFrame, 256> = OutputBuffer::new();
//!
//! let mut sine: Oscil<i8, 256, 16384> = Oscil::new(&SIN256_INT8);
//! sine.set_freq(440);
//!
//! let mut engine = Scheduler::start(AudioConfig::DEFAULT, &BUFFER, Mono(sine), (), timer)
//!     .map_err(|failure| failure.error)?;
//!
//! // In the audio timer interrupt:
//! //     handler.on_tick();   // handler = OutputHandler::new(&BUFFER, pwm_sink)
//!
//! engine.run();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `defmt` | no | Logging and `defmt::Format` on public types |
//! | `pwm` | no | `PwmSink` over `embedded_hal::pwm::SetDutyCycle` |
//! | `mcp49xx` | no | `Mcp49xxSink` over `embedded_hal::spi::SpiDevice` |
//!
//! ## Audio parameters
//!
//! - **Audio rate:** 16384 Hz ([`constants::AUDIO_RATE`])
//! - **Control rate:** 64 Hz ([`constants::CONTROL_RATE`])
//! - **Sample format:** `i16` (signed 16-bit)
//! - **Output buffer:** 256 frames ([`constants::OUTPUT_BUFFER_SIZE`])

#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod config;
pub mod error;
pub mod fixmath;
pub mod dsp;
pub mod osc;
pub mod node;
pub mod io;
pub mod analog;
pub mod scheduler;
pub mod midi;
pub mod rand;
pub mod event_delay;
