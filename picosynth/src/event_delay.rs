//! A countdown checked at control rate, in place of a blocking delay.

/// Fires after a set number of milliseconds, measured in update ticks.
///
/// ```ignore
/// let mut beat = EventDelay::new(CONTROL_RATE);
/// beat.start_with(250);
/// // in update_control():
/// if beat.ready() {
///     envelope.trigger();
///     beat.start();
/// }
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventDelay {
    update_rate: u32,
    ticks: u32,
    remaining: u32,
}

impl EventDelay {
    /// `update_rate` is how often [`ready`](Self::ready) is called, in Hz.
    pub const fn new(update_rate: u32) -> Self {
        EventDelay {
            update_rate,
            ticks: 0,
            remaining: 0,
        }
    }

    /// Set the delay used by the next [`start`](Self::start). Floors to
    /// whole ticks.
    pub fn set(&mut self, millis: u32) {
        let ticks = millis as u64 * self.update_rate as u64 / 1000;
        self.ticks = ticks.min(u32::MAX as u64) as u32;
    }

    pub fn start(&mut self) {
        self.remaining = self.ticks;
    }

    pub fn start_with(&mut self, millis: u32) {
        self.set(millis);
        self.start();
    }

    /// Count one tick; true once the delay has elapsed, and from then on
    /// until restarted.
    pub fn ready(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
        }
        self.remaining == 0
    }

    /// Delay length in ticks.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
