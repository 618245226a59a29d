//! The output path: frames, the SPSC ring and sinks.
//!
//! ```text
//!  foreground (Scheduler)          timer ISR (OutputHandler)
//!  graph.update_audio() ──push──▶ OutputBuffer ──pop──▶ OutputSink::write
//! ```
//!
//! | Item | Role |
//! |------|------|
//! | [`MonoFrame`] / [`StereoFrame`] | One tick of output |
//! | [`OutputBuffer`] | Lock-free SPSC ring, counts underruns |
//! | [`OutputSink`] | "Accept one frame" hardware contract |
//! | [`OutputHandler`] | The interrupt-side consumer |
//! | `PwmSink` | `SetDutyCycle` sink (feature `pwm`) |
//! | `Mcp49xxSink` | 12-bit SPI DAC sink (feature `mcp49xx`) |

pub mod frame;
pub mod ring;
pub mod sink;

#[cfg(feature = "pwm")]
pub mod pwm;

#[cfg(feature = "mcp49xx")]
pub mod mcp49xx;

pub use frame::{AudioFrame, MonoFrame, StereoFrame};
pub use ring::{OutputBuffer, UnderrunPolicy};
pub use sink::{OutputHandler, OutputSink};

#[cfg(feature = "pwm")]
pub use pwm::{PwmSink, StereoPwmSink};

#[cfg(feature = "mcp49xx")]
pub use mcp49xx::{DacChannel, Mcp49xxSink};
