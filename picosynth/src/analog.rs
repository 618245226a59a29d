//! Non-blocking analog sampling.
//!
//! A conversion takes far longer than an audio tick, so it is never waited
//! for. [`AnalogSampler`] starts one conversion at a time and advances on
//! completion events. Under the [`Scheduler`](crate::scheduler::Scheduler),
//! which owns the sampler, completion is detected by
//! [`poll`](AnalogSampler::poll) on every `audio_hook` pass. A sampler used
//! on its own may instead have
//! [`on_conversion_complete`](AnalogSampler::on_conversion_complete) called
//! from the ADC's end-of-conversion interrupt, provided that interrupt owns
//! it. Each completion stores the result and starts the next queued
//! channel, so a whole sweep runs without blocking.
//!
//! Channels queued with [`request`](AnalogSampler::request) are served in
//! FIFO order. A reading obtained mid-sweep may be one sweep old.
//!
//! An optional audio input channel
//! ([`with_audio_input`](AnalogSampler::with_audio_input)) is converted once
//! per produced audio frame. Sweep conversions then take turns with it, one
//! control channel per audio conversion.

use heapless::Deque;

use crate::error::AnalogError;

/// A single shared analog-to-digital converter.
pub trait AdcPeripheral {
    /// Significant bits in a raw reading, 1 to 16.
    const RESOLUTION_BITS: u32;

    /// Begin converting `channel`. Must return immediately.
    fn start_conversion(&mut self, channel: u8);

    fn is_conversion_complete(&mut self) -> bool;

    /// Result of the last finished conversion.
    fn read_conversion(&mut self) -> u16;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelState {
    #[default]
    Idle,
    ConversionPending,
    /// A result arrived and hasn't been taken yet.
    ResultReady,
}

/// The scheduler's view of a sampler.
pub trait AnalogSweep {
    /// Called after every control update.
    fn start_sweep(&mut self);

    /// Called with spare foreground time.
    fn poll(&mut self);

    /// Called once per produced audio frame.
    fn audio_tick(&mut self) {}

    /// Latest audio input sample, if an audio input is configured.
    fn audio_input(&self) -> Option<u16> {
        None
    }
}

/// No analog inputs.
impl AnalogSweep for () {
    fn start_sweep(&mut self) {}

    fn poll(&mut self) {}
}

/// Shift a raw `from`-bit reading to `TO` bits, clamping values the
/// converter should not have produced.
fn rescale<const TO: u32>(raw: u16, from: u32) -> u16 {
    let raw = raw as u32;
    let scaled = if TO >= from {
        raw << (TO - from)
    } else {
        raw >> (from - TO)
    };
    scaled.min((1u32 << TO) - 1) as u16
}

/// Round-robin sampler over `N` channels of one converter.
pub struct AnalogSampler<A, const N: usize> {
    adc: A,
    readings: [u16; N],
    states: [ChannelState; N],
    queue: Deque<u8, N>,
    queued: [bool; N],
    pending: Option<u8>,
    /// Discard the first conversion after switching channels.
    settling_read: bool,
    discarding: bool,
    last_channel: Option<u8>,
    sweeping: bool,
    sweeps: u32,
    audio_channel: Option<u8>,
    audio_pending: bool,
    audio_input: u16,
    audio_conversions: u32,
}

impl<A: AdcPeripheral, const N: usize> AnalogSampler<A, N> {
    const CHANNELS_OK: () = assert!(N > 0 && N <= u8::MAX as usize, "1 to 255 channels");

    pub fn new(adc: A) -> Self {
        let () = Self::CHANNELS_OK;
        AnalogSampler {
            adc,
            readings: [0; N],
            states: [ChannelState::Idle; N],
            queue: Deque::new(),
            queued: [false; N],
            pending: None,
            settling_read: false,
            discarding: false,
            last_channel: None,
            sweeping: false,
            sweeps: 0,
            audio_channel: None,
            audio_pending: false,
            audio_input: 0,
            audio_conversions: 0,
        }
    }

    /// Throw away the first conversion after a channel change, for
    /// converters whose sample-and-hold needs a cycle to settle.
    pub fn with_settling_read(mut self, enabled: bool) -> Self {
        self.settling_read = enabled;
        self
    }

    /// Sample `channel` at the audio rate, readable through
    /// [`audio_input`](Self::audio_input).
    pub fn with_audio_input(mut self, channel: u8) -> Result<Self, AnalogError> {
        self.check(channel)?;
        self.audio_channel = Some(channel);
        Ok(self)
    }

    fn check(&self, channel: u8) -> Result<usize, AnalogError> {
        if (channel as usize) < N {
            Ok(channel as usize)
        } else {
            Err(AnalogError::InvalidChannel {
                channel,
                channels: N as u8,
            })
        }
    }

    /// Start converting `channel` now, if the converter is free.
    pub fn start_conversion(&mut self, channel: u8) -> Result<(), AnalogError> {
        self.check(channel)?;
        if let Some(pending) = self.pending {
            #[cfg(feature = "defmt")]
            defmt::trace!("adc busy with channel {}, rejected {}", pending, channel);
            return Err(AnalogError::Busy { pending });
        }
        self.begin(channel, false);
        Ok(())
    }

    fn begin(&mut self, channel: u8, audio: bool) {
        self.discarding = self.settling_read && self.last_channel != Some(channel);
        self.last_channel = Some(channel);
        self.pending = Some(channel);
        self.audio_pending = audio;
        if !audio {
            self.states[channel as usize] = ChannelState::ConversionPending;
        }
        self.adc.start_conversion(channel);
    }

    /// Queue `channel` for the next sweep and return its latest reading.
    ///
    /// Requesting an already queued channel does nothing more, so the
    /// queue never holds more than `N` entries.
    pub fn request(&mut self, channel: u8) -> Result<u16, AnalogError> {
        let idx = self.check(channel)?;
        if !self.queued[idx] && self.queue.push_back(channel).is_ok() {
            self.queued[idx] = true;
        }
        Ok(self.readings[idx])
    }

    /// Begin serving the queue unless a sweep or a channel conversion is
    /// already running. Returns whether a sweep began.
    ///
    /// While an audio input conversion is in flight the sweep begins when
    /// it completes.
    pub fn start_sweep(&mut self) -> bool {
        if self.sweeping || (self.pending.is_some() && !self.audio_pending) {
            return false;
        }
        if self.audio_pending {
            self.sweeping = !self.queue.is_empty();
            return self.sweeping;
        }
        self.sweeping = self.start_next();
        self.sweeping
    }

    fn start_next(&mut self) -> bool {
        match self.queue.pop_front() {
            Some(channel) => {
                self.queued[channel as usize] = false;
                self.begin(channel, false);
                true
            }
            None => false,
        }
    }

    fn chain(&mut self) {
        self.sweeping = self.start_next();
        if !self.sweeping {
            self.sweeps = self.sweeps.wrapping_add(1);
        }
    }

    /// Convert the audio input channel if one is configured and the
    /// converter is free. Returns whether a conversion was started.
    pub fn audio_tick(&mut self) -> bool {
        match self.audio_channel {
            Some(channel) if self.pending.is_none() => {
                self.begin(channel, true);
                true
            }
            _ => false,
        }
    }

    /// End-of-conversion handler.
    ///
    /// Stores the result and chains the next queued channel. Spurious
    /// calls with nothing pending are ignored.
    pub fn on_conversion_complete(&mut self) {
        let Some(channel) = self.pending else {
            return;
        };
        let value = self.adc.read_conversion();
        if self.discarding {
            self.discarding = false;
            self.adc.start_conversion(channel);
            return;
        }
        self.pending = None;

        if self.audio_pending {
            self.audio_pending = false;
            self.audio_input = value;
            self.audio_conversions = self.audio_conversions.wrapping_add(1);
            if self.sweeping {
                self.chain();
            }
            return;
        }

        let idx = channel as usize;
        self.readings[idx] = value;
        self.states[idx] = ChannelState::ResultReady;

        if self.audio_channel.is_some() && !self.queue.is_empty() {
            // The next channel waits for the audio input's turn.
            self.sweeping = true;
        } else {
            self.chain();
        }
    }

    /// Foreground completion check. Returns whether a conversion finished.
    pub fn poll(&mut self) -> bool {
        if self.pending.is_some() && self.adc.is_conversion_complete() {
            self.on_conversion_complete();
            true
        } else {
            false
        }
    }

    /// Latest completed reading. Never blocks; zero before the first.
    pub fn reading(&self, channel: u8) -> Result<u16, AnalogError> {
        let idx = self.check(channel)?;
        Ok(self.readings[idx])
    }

    const fn resolution_in_range<const BITS: u32>() {
        assert!(
            BITS >= 1 && BITS <= 16 && A::RESOLUTION_BITS >= 1 && A::RESOLUTION_BITS <= 16,
            "readings are 1 to 16 bits wide"
        );
    }

    /// Latest reading rescaled to `BITS` bits (1 to 16).
    pub fn reading_with_resolution<const BITS: u32>(&self, channel: u8) -> Result<u16, AnalogError> {
        const { Self::resolution_in_range::<BITS>() };
        let raw = self.reading(channel)?;
        Ok(rescale::<BITS>(raw, A::RESOLUTION_BITS))
    }

    /// Latest audio input sample, if an audio input is configured.
    pub fn audio_input(&self) -> Option<u16> {
        self.audio_channel.map(|_| self.audio_input)
    }

    /// Latest audio input sample rescaled to `BITS` bits (1 to 16).
    pub fn audio_input_with_resolution<const BITS: u32>(&self) -> Option<u16> {
        const { Self::resolution_in_range::<BITS>() };
        self.audio_input()
            .map(|raw| rescale::<BITS>(raw, A::RESOLUTION_BITS))
    }

    /// Audio input conversions completed so far.
    pub fn audio_conversions(&self) -> u32 {
        self.audio_conversions
    }

    /// Take a fresh result, moving the channel back to idle.
    pub fn take_result(&mut self, channel: u8) -> Option<u16> {
        let idx = self.check(channel).ok()?;
        if self.states[idx] == ChannelState::ResultReady {
            self.states[idx] = ChannelState::Idle;
            Some(self.readings[idx])
        } else {
            None
        }
    }

    pub fn state(&self, channel: u8) -> Result<ChannelState, AnalogError> {
        let idx = self.check(channel)?;
        Ok(self.states[idx])
    }

    pub fn pending_channel(&self) -> Option<u8> {
        self.pending
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Channels waiting for the converter.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Sweeps that ran to an empty queue.
    pub fn sweeps_completed(&self) -> u32 {
        self.sweeps
    }

    pub fn adc(&self) -> &A {
        &self.adc
    }

    pub fn adc_mut(&mut self) -> &mut A {
        &mut self.adc
    }

    pub fn release(self) -> A {
        self.adc
    }
}

impl<A: AdcPeripheral, const N: usize> AnalogSweep for AnalogSampler<A, N> {
    fn start_sweep(&mut self) {
        AnalogSampler::start_sweep(self);
    }

    fn poll(&mut self) {
        AnalogSampler::poll(self);
    }

    fn audio_tick(&mut self) {
        AnalogSampler::audio_tick(self);
    }

    fn audio_input(&self) -> Option<u16> {
        AnalogSampler::audio_input(self)
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockAdc;
    use super::*;

    const LEVELS: [u16; 8] = [100, 200, 300, 400, 500, 600, 700, 800];

    fn adc() -> MockAdc {
        MockAdc::new(LEVELS)
    }

    fn pending_count<A: AdcPeripheral, const N: usize>(s: &AnalogSampler<A, N>) -> usize {
        (0..N as u8)
            .filter(|&c| s.state(c) == Ok(ChannelState::ConversionPending))
            .count()
    }

    #[test]
    fn start_then_complete() {
        let mut s: AnalogSampler<MockAdc, 4> = AnalogSampler::new(adc());
        s.start_conversion(2).unwrap();
        assert_eq!(s.state(2), Ok(ChannelState::ConversionPending));
        assert_eq!(s.pending_channel(), Some(2));
        s.on_conversion_complete();
        assert_eq!(s.state(2), Ok(ChannelState::ResultReady));
        assert_eq!(s.reading(2), Ok(300));
        assert_eq!(s.take_result(2), Some(300));
        assert_eq!(s.state(2), Ok(ChannelState::Idle));
        assert_eq!(s.take_result(2), None);
    }

    #[test]
    fn busy_converter_rejects() {
        let mut s: AnalogSampler<MockAdc, 4> = AnalogSampler::new(adc());
        s.start_conversion(0).unwrap();
        assert_eq!(s.start_conversion(1), Err(AnalogError::Busy { pending: 0 }));
        assert_eq!(s.state(1), Ok(ChannelState::Idle));
        assert_eq!(s.adc().started, [0]);
    }

    #[test]
    fn invalid_channel_rejected() {
        let mut s: AnalogSampler<MockAdc, 4> = AnalogSampler::new(adc());
        let err = AnalogError::InvalidChannel {
            channel: 4,
            channels: 4,
        };
        assert_eq!(s.start_conversion(4), Err(err));
        assert_eq!(s.request(4), Err(err));
        assert_eq!(s.reading(4), Err(err));
        assert_eq!(s.take_result(4), None);
    }

    #[test]
    fn round_robin_sweep_one_in_flight() {
        let mut s: AnalogSampler<MockAdc, 4> = AnalogSampler::new(adc());
        for ch in [0, 1, 2] {
            assert_eq!(s.request(ch), Ok(0));
        }
        assert!(s.start_sweep());

        let mut completed = Vec::new();
        while let Some(ch) = s.pending_channel() {
            assert_eq!(pending_count(&s), 1);
            // Nothing else can sneak in while a conversion runs.
            assert!(s.start_conversion(3).is_err());
            s.on_conversion_complete();
            completed.push(ch);
        }
        assert_eq!(completed, [0, 1, 2]);
        assert_eq!(s.adc().started, [0, 1, 2]);
        assert_eq!(s.sweeps_completed(), 1);
        assert_eq!(pending_count(&s), 0);
    }

    #[test]
    fn duplicate_requests_collapse() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        for _ in 0..10 {
            s.request(1).unwrap();
            s.request(0).unwrap();
        }
        assert_eq!(s.queued(), 2);
        s.start_sweep();
        s.on_conversion_complete();
        s.on_conversion_complete();
        assert_eq!(s.adc().started, [1, 0]);
    }

    #[test]
    fn request_returns_previous_sweep() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        assert_eq!(s.request(0), Ok(0));
        s.start_sweep();
        s.on_conversion_complete();
        assert_eq!(s.request(0), Ok(100));
    }

    #[test]
    fn requeue_during_conversion() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        s.request(0).unwrap();
        s.start_sweep();
        // Channel 0 is converting, not queued, so it can go in again.
        s.request(0).unwrap();
        s.on_conversion_complete();
        assert_eq!(s.pending_channel(), Some(0));
        s.on_conversion_complete();
        assert_eq!(s.adc().started, [0, 0]);
    }

    #[test]
    fn poll_drives_completion() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        s.request(1).unwrap();
        s.start_sweep();
        assert!(!s.poll());
        s.adc_mut().finish();
        assert!(s.poll());
        assert!(!s.is_busy());
        assert!(!s.poll());
    }

    #[test]
    fn start_sweep_while_busy_is_noop() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        s.start_conversion(0).unwrap();
        s.request(1).unwrap();
        assert!(!s.start_sweep());
        assert_eq!(s.queued(), 1);
        // The manual conversion chains into the queue when it finishes.
        s.on_conversion_complete();
        assert_eq!(s.pending_channel(), Some(1));
    }

    #[test]
    fn spurious_completion_ignored() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        s.on_conversion_complete();
        assert_eq!(s.sweeps_completed(), 0);
        assert_eq!(s.state(0), Ok(ChannelState::Idle));
    }

    #[test]
    fn settling_read_discards_first_conversion() {
        let mut s: AnalogSampler<MockAdc, 4> =
            AnalogSampler::new(adc()).with_settling_read(true);
        s.adc_mut().stale = Some(9999);
        s.start_conversion(3).unwrap();
        s.on_conversion_complete();
        // Still pending: the settling conversion was thrown away.
        assert_eq!(s.state(3), Ok(ChannelState::ConversionPending));
        s.on_conversion_complete();
        assert_eq!(s.reading(3), Ok(400));
        assert_eq!(s.adc().started, [3, 3]);
        // Same channel again: no settling needed.
        s.start_conversion(3).unwrap();
        s.on_conversion_complete();
        assert_eq!(s.adc().started, [3, 3, 3]);
    }

    #[test]
    fn rescaled_readings() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        s.adc_mut().levels[0] = 1023;
        s.start_conversion(0).unwrap();
        s.on_conversion_complete();
        assert_eq!(s.reading_with_resolution::<8>(0), Ok(255));
        assert_eq!(s.reading_with_resolution::<12>(0), Ok(4092));
        assert_eq!(s.reading_with_resolution::<10>(0), Ok(1023));
    }

    #[test]
    fn rescale_clamps_to_target_width() {
        let mut s: AnalogSampler<MockAdc, 2> = AnalogSampler::new(adc());
        s.adc_mut().levels = [1023, 0xFFFF, 0, 0, 0, 0, 0, 0];
        s.start_conversion(0).unwrap();
        s.on_conversion_complete();
        s.start_conversion(1).unwrap();
        s.on_conversion_complete();
        assert_eq!(s.reading_with_resolution::<16>(0), Ok(65_472));
        assert_eq!(s.reading_with_resolution::<1>(0), Ok(1));
        // Out-of-range raw values saturate instead of wrapping.
        assert_eq!(s.reading_with_resolution::<16>(1), Ok(u16::MAX));
        assert_eq!(s.reading_with_resolution::<12>(1), Ok(4095));
        assert_eq!(s.reading_with_resolution::<10>(1), Ok(1023));
    }

    #[test]
    fn no_audio_input_by_default() {
        let mut s: AnalogSampler<MockAdc, 4> = AnalogSampler::new(adc());
        assert_eq!(s.audio_input(), None);
        assert!(!s.audio_tick());
        assert!(s.adc().started.is_empty());
        let err = AnalogError::InvalidChannel {
            channel: 9,
            channels: 4,
        };
        assert_eq!(AnalogSampler::<MockAdc, 4>::new(adc()).with_audio_input(9).err(), Some(err));
    }

    #[test]
    fn audio_input_alternates_with_sweep() {
        let mut s: AnalogSampler<MockAdc, 4> =
            AnalogSampler::new(adc()).with_audio_input(3).unwrap();
        assert_eq!(s.audio_input(), Some(0));
        s.request(0).unwrap();
        s.request(1).unwrap();
        assert!(s.start_sweep());
        assert!(!s.audio_tick());

        s.on_conversion_complete();
        // Channel 1 waits for the audio input's turn.
        assert_eq!(s.pending_channel(), None);
        assert!(s.audio_tick());
        s.on_conversion_complete();
        assert_eq!(s.audio_input(), Some(400));
        assert_eq!(s.pending_channel(), Some(1));

        s.on_conversion_complete();
        assert_eq!(s.sweeps_completed(), 1);
        assert!(s.audio_tick());
        s.on_conversion_complete();

        assert_eq!(s.adc().started, [0, 3, 1, 3]);
        assert_eq!(s.reading(0), Ok(100));
        assert_eq!(s.reading(1), Ok(200));
        assert_eq!(s.audio_conversions(), 2);
        assert_eq!(s.state(3), Ok(ChannelState::Idle));
        assert_eq!(s.audio_input_with_resolution::<8>(), Some(100));
    }

    #[test]
    fn sweep_waits_for_audio_conversion() {
        let mut s: AnalogSampler<MockAdc, 4> =
            AnalogSampler::new(adc()).with_audio_input(2).unwrap();
        s.request(0).unwrap();
        assert!(s.audio_tick());
        assert!(s.start_sweep());
        assert!(!s.start_sweep());
        assert_eq!(s.pending_channel(), Some(2));
        s.on_conversion_complete();
        assert_eq!(s.pending_channel(), Some(0));
        s.on_conversion_complete();
        assert_eq!(s.reading(0), Ok(100));
        assert_eq!(s.audio_input(), Some(300));
        assert_eq!(s.sweeps_completed(), 1);
    }

    #[test]
    fn unit_sweep_is_inert() {
        let mut none = ();
        AnalogSweep::start_sweep(&mut none);
        AnalogSweep::poll(&mut none);
        AnalogSweep::audio_tick(&mut none);
        assert_eq!(AnalogSweep::audio_input(&none), None);
    }
}
