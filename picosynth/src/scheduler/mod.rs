//! The real-time loop.
//!
//! Two contexts share one [`OutputBuffer`]:
//!
//! - **Timer interrupt**, at the audio rate: an
//!   [`OutputHandler`](crate::io::OutputHandler) pops one frame and writes
//!   it to the sink. Nothing else.
//! - **Foreground**: [`Scheduler::audio_hook`], called as often as
//!   possible. Whenever the buffer has room it produces one frame, running
//!   the control update first on every `ticks_per_control`-th frame, and
//!   lets the sampler take its audio input reading. Then it gives the
//!   analog sampler a chance to advance.
//!
//! [`Scheduler::start`] takes the timer by value, so a timer drives at most
//! one scheduler at a time. [`Scheduler::stop`] halts the timer and hands
//! back everything it owned, as does a failed start.
//!
//! ```ignore
//! static BUFFER: OutputBuffer<MonoFrame, 256> = OutputBuffer::new();
//!
//! let mut scheduler = Scheduler::start(
//!     AudioConfig::DEFAULT,
//!     &BUFFER,
//!     Mono(sine),
//!     AnalogSampler::<_, 4>::new(adc),
//!     timer,
//! )
//! .map_err(|failure| failure.error)?;
//! loop {
//!     scheduler.audio_hook();
//! }
//! ```

use core::fmt;

use crate::analog::AnalogSweep;
use crate::config::{AudioConfig, Timing};
use crate::error::StartError;
use crate::io::OutputBuffer;
use crate::node::AudioGraph;


/// A hardware timer that fires the audio interrupt at a fixed rate.
///
/// The host wires the interrupt vector to an
/// [`OutputHandler`](crate::io::OutputHandler).
pub trait AudioTimer {
    type Error;

    /// Arm the timer to interrupt `rate_hz` times per second.
    fn start(&mut self, rate_hz: u32) -> Result<(), Self::Error>;

    fn stop(&mut self);
}

/// Running counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostics {
    /// Frames generated and pushed.
    pub frames_produced: u32,
    /// Control updates run.
    pub control_ticks: u32,
    /// Generated frames the buffer refused.
    pub overruns: u32,
    /// `audio_hook` passes that found the buffer full and made nothing.
    pub full_passes: u32,
    /// Interrupt ticks that found the buffer empty.
    pub underruns: u32,
}

/// What [`Scheduler::stop`] gives back.
pub struct Parts<G, S, T> {
    pub graph: G,
    pub sampler: S,
    pub timer: T,
}

/// A [`Scheduler::start`] that did not get going.
///
/// Everything passed in comes back, and the buffer is left empty.
pub struct StartFailure<G, S, T: AudioTimer> {
    pub error: StartError<T::Error>,
    pub parts: Parts<G, S, T>,
}

impl<G, S, T> fmt::Debug for StartFailure<G, S, T>
where
    T: AudioTimer,
    T::Error: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("StartFailure")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

/// Foreground half of the audio engine.
pub struct Scheduler<'b, G: AudioGraph, S: AnalogSweep, T: AudioTimer, const N: usize> {
    timing: Timing,
    buffer: &'b OutputBuffer<G::Frame, N>,
    graph: G,
    sampler: S,
    timer: T,
    /// Frames left before the next control update.
    control_countdown: u16,
    frames_produced: u32,
    control_ticks: u32,
    overruns: u32,
    full_passes: u32,
    /// Ticks played up to `ticks_seen`, widened past the buffer's `u32`.
    played: u64,
    ticks_seen: u32,
}

impl<'b, G, S, T, const N: usize> Scheduler<'b, G, S, T, N>
where
    G: AudioGraph,
    S: AnalogSweep,
    T: AudioTimer,
{
    /// Validate the rates, fill the buffer, then arm the timer at the
    /// audio rate.
    ///
    /// The buffer should be empty; playback starts with whatever it holds.
    /// On failure the buffer is emptied again and the graph, sampler and
    /// timer are returned in the error.
    pub fn start(
        config: AudioConfig,
        buffer: &'b OutputBuffer<G::Frame, N>,
        graph: G,
        sampler: S,
        timer: T,
    ) -> Result<Self, StartFailure<G, S, T>> {
        let timing = match config.validate() {
            Ok(timing) => timing,
            Err(e) => {
                return Err(StartFailure {
                    error: e.into(),
                    parts: Parts {
                        graph,
                        sampler,
                        timer,
                    },
                })
            }
        };

        let mut scheduler = Scheduler {
            timing,
            buffer,
            graph,
            sampler,
            timer,
            control_countdown: 0,
            frames_produced: 0,
            control_ticks: 0,
            overruns: 0,
            full_passes: 0,
            played: 0,
            ticks_seen: buffer.frames_read(),
        };
        scheduler.fill();

        if let Err(e) = scheduler.timer.start(timing.audio_rate()) {
            #[cfg(feature = "defmt")]
            defmt::error!("audio timer failed to start");
            // The timer never ran, so nothing else is consuming.
            buffer.discard();
            return Err(StartFailure {
                error: StartError::Timer(e),
                parts: scheduler.into_parts(),
            });
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "audio started: {} Hz audio, {} Hz control, {} frames per control tick",
            timing.audio_rate(),
            timing.control_rate(),
            timing.ticks_per_control()
        );

        Ok(scheduler)
    }

    /// One pass of the foreground loop. Returns whether a frame was made.
    #[inline]
    pub fn audio_hook(&mut self) -> bool {
        let produced = if self.buffer.is_full() {
            self.full_passes = self.full_passes.wrapping_add(1);
            false
        } else {
            self.produce();
            true
        };
        self.sampler.poll();
        self.track_ticks();
        produced
    }

    /// Produce frames until the buffer is full. Returns how many.
    pub fn fill(&mut self) -> usize {
        let mut count = 0;
        while !self.buffer.is_full() {
            self.produce();
            count += 1;
        }
        count
    }

    /// Run the foreground loop forever.
    pub fn run(&mut self) -> ! {
        loop {
            self.audio_hook();
        }
    }

    fn produce(&mut self) {
        if self.control_countdown == 0 {
            self.control_countdown = self.timing.ticks_per_control() - 1;
            self.graph.update_control();
            self.sampler.start_sweep();
            self.control_ticks = self.control_ticks.wrapping_add(1);
        } else {
            self.control_countdown -= 1;
        }

        let frame = self.graph.update_audio();
        // Callers check for space first and we are the only producer.
        if self.buffer.push(frame).is_err() {
            self.overruns = self.overruns.wrapping_add(1);
        } else {
            self.frames_produced = self.frames_produced.wrapping_add(1);
        }
        self.sampler.audio_tick();
    }

    fn unseen_ticks(&self) -> u32 {
        self.buffer.frames_read().wrapping_sub(self.ticks_seen)
    }

    fn track_ticks(&mut self) {
        let unseen = self.unseen_ticks();
        self.played += unseen as u64;
        self.ticks_seen = self.ticks_seen.wrapping_add(unseen);
    }

    fn into_parts(self) -> Parts<G, S, T> {
        Parts {
            graph: self.graph,
            sampler: self.sampler,
            timer: self.timer,
        }
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            frames_produced: self.frames_produced,
            control_ticks: self.control_ticks,
            overruns: self.overruns,
            full_passes: self.full_passes,
            underruns: self.buffer.underruns(),
        }
    }

    /// Frames played by the interrupt since start.
    ///
    /// Kept in 64 bits, so it stays monotonic as long as `audio_hook` runs
    /// at least once every 2^32 ticks.
    pub fn audio_ticks(&self) -> u64 {
        self.played + self.unseen_ticks() as u64
    }

    /// Monotonic time since start, from the played frame count.
    pub fn micros(&self) -> u64 {
        self.timing.micros(self.audio_ticks())
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn buffer(&self) -> &'b OutputBuffer<G::Frame, N> {
        self.buffer
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn sampler_mut(&mut self) -> &mut S {
        &mut self.sampler
    }

    /// Latest audio input sample, if the sampler has an audio input.
    pub fn audio_input(&self) -> Option<u16> {
        self.sampler.audio_input()
    }

    /// Halt the timer and release everything.
    pub fn stop(mut self) -> Parts<G, S, T> {
        self.timer.stop();

        #[cfg(feature = "defmt")]
        defmt::info!("audio stopped: {}", self.diagnostics());

        self.into_parts()
    }
}
