//! Lock-free single-producer single-consumer output ring.
//!
//! The foreground loop pushes frames; the audio timer interrupt pops one
//! per tick. Indices are free-running `usize` counters masked by `N - 1`,
//! so all `N` slots are usable and `write - read` is the fill level.
//!
//! Only atomic loads and stores are used (no read-modify-write), which
//! keeps the ring usable on cores without CAS such as Cortex-M0.
//!
//! # Safety Contract
//!
//! - Only ONE context may call [`push()`](OutputBuffer::push) (the producer).
//! - Only ONE context may call [`pop()`](OutputBuffer::pop) or
//!   [`pop_or_underrun()`](OutputBuffer::pop_or_underrun) (the consumer).
//! - The two may run concurrently, e.g. foreground and ISR.

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use super::frame::AudioFrame;

/// What the consumer plays when the ring is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnderrunPolicy {
    /// Play [`AudioFrame::SILENCE`].
    #[default]
    Silence,
    /// Hold the last frame that was actually played.
    RepeatLast,
}

/// Fixed-capacity frame FIFO between generation and playback.
///
/// `N` must be a power of two and at least 2.
pub struct OutputBuffer<F, const N: usize> {
    slots: [UnsafeCell<F>; N],
    /// Frames ever written (producer-owned).
    write: AtomicUsize,
    /// Frames ever read (consumer-owned).
    read: AtomicUsize,
    /// Last frame popped (consumer-owned).
    last: UnsafeCell<F>,
    policy: UnderrunPolicy,
    underruns: AtomicU32,
    ticks: AtomicU32,
}

// SAFETY: F: Send because frames cross from the producer to the consumer
// context. Each index is stored by exactly one side, and Release/Acquire
// pairs on the indices order slot accesses. `last` is touched only by the
// consumer.
unsafe impl<F: Send, const N: usize> Sync for OutputBuffer<F, N> {}
unsafe impl<F: Send, const N: usize> Send for OutputBuffer<F, N> {}

impl<F: AudioFrame, const N: usize> OutputBuffer<F, N> {
    const CAPACITY_OK: () = assert!(
        N >= 2 && N.is_power_of_two(),
        "output buffer capacity must be a power of two >= 2"
    );

    const MASK: usize = N - 1;

    /// Empty ring that plays silence on underrun.
    pub const fn new() -> Self {
        Self::with_policy(UnderrunPolicy::Silence)
    }

    pub const fn with_policy(policy: UnderrunPolicy) -> Self {
        let () = Self::CAPACITY_OK;
        OutputBuffer {
            slots: [const { UnsafeCell::new(F::SILENCE) }; N],
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            last: UnsafeCell::new(F::SILENCE),
            policy,
            underruns: AtomicU32::new(0),
            ticks: AtomicU32::new(0),
        }
    }

    /// Append a frame (producer side).
    ///
    /// A full ring is left untouched and the frame is handed back.
    pub fn push(&self, frame: F) -> Result<(), F> {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        if write.wrapping_sub(read) >= N {
            return Err(frame);
        }

        // SAFETY: sole producer; fewer than N frames are unread, so the
        // consumer is not looking at this slot.
        unsafe {
            *self.slots[write & Self::MASK].get() = frame;
        }

        self.write.store(write.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Take the oldest frame (consumer side).
    pub fn pop(&self) -> Option<F> {
        let read = self.read.load(Ordering::Relaxed);
        if read == self.write.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: sole consumer; `read != write` means the producer has
        // published this slot and will not write it until `read` advances.
        let frame = unsafe { *self.slots[read & Self::MASK].get() };
        unsafe {
            *self.last.get() = frame;
        }

        self.read.store(read.wrapping_add(1), Ordering::Release);
        Some(frame)
    }

    /// One playback tick (consumer side): the oldest frame, or the
    /// underrun fallback. Never blocks.
    #[inline]
    pub fn pop_or_underrun(&self) -> F {
        let ticks = self.ticks.load(Ordering::Relaxed);
        self.ticks.store(ticks.wrapping_add(1), Ordering::Relaxed);
        match self.pop() {
            Some(frame) => frame,
            None => {
                let n = self.underruns.load(Ordering::Relaxed);
                self.underruns.store(n.wrapping_add(1), Ordering::Relaxed);
                match self.policy {
                    UnderrunPolicy::Silence => F::SILENCE,
                    // SAFETY: consumer-owned.
                    UnderrunPolicy::RepeatLast => unsafe { *self.last.get() },
                }
            }
        }
    }

    /// Drop every unread frame and forget the last one played (consumer
    /// side). Returns how many frames were dropped.
    ///
    /// Only sound while no consumer is running, e.g. before the audio
    /// timer is armed.
    pub fn discard(&self) -> usize {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        // SAFETY: consumer-owned.
        unsafe {
            *self.last.get() = F::SILENCE;
        }
        self.read.store(write, Ordering::Release);
        write.wrapping_sub(read)
    }

    /// Frames waiting to be played.
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        write.wrapping_sub(read).min(N)
    }

    /// Slots the producer can fill right now.
    pub fn free(&self) -> usize {
        N - self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn policy(&self) -> UnderrunPolicy {
        self.policy
    }

    /// Playback ticks served by [`pop_or_underrun`](Self::pop_or_underrun),
    /// fallbacks included. Wraps after 2^32.
    pub fn frames_read(&self) -> u32 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Ticks that found the ring empty.
    pub fn underruns(&self) -> u32 {
        self.underruns.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    pub(crate) fn set_frames_read(&self, ticks: u32) {
        self.ticks.store(ticks, Ordering::Relaxed);
    }
}

impl<F: AudioFrame, const N: usize> Default for OutputBuffer<F, N> {
    fn default() -> Self {
        Self::new()
    }
}
