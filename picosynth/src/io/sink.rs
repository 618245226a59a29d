//! The output-sink contract and the interrupt-side handler.

use super::frame::AudioFrame;
use super::ring::OutputBuffer;

/// Hardware that accepts exactly one frame per audio tick.
///
/// Implementations must not block: they are called from the timer
/// interrupt. Closures taking a frame are sinks too.
pub trait OutputSink<F> {
    fn write(&mut self, frame: F);
}

impl<F, T: FnMut(F)> OutputSink<F> for T {
    #[inline]
    fn write(&mut self, frame: F) {
        self(frame)
    }
}

/// Consumer half of the output path, registered with the host's timer
/// interrupt.
///
/// ```ignore
/// #[interrupt]
/// fn TIM2() {
///     HANDLER.lock(|h| h.on_tick());
/// }
/// ```
pub struct OutputHandler<'b, F: AudioFrame, S: OutputSink<F>, const N: usize> {
    buffer: &'b OutputBuffer<F, N>,
    sink: S,
}

impl<'b, F: AudioFrame, S: OutputSink<F>, const N: usize> OutputHandler<'b, F, S, N> {
    pub fn new(buffer: &'b OutputBuffer<F, N>, sink: S) -> Self {
        OutputHandler { buffer, sink }
    }

    /// Pop one frame (or the underrun fallback) and write it.
    #[inline]
    pub fn on_tick(&mut self) {
        let frame = self.buffer.pop_or_underrun();
        self.sink.write(frame);
    }

    pub fn buffer(&self) -> &'b OutputBuffer<F, N> {
        self.buffer
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give the sink back.
    pub fn release(self) -> S {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MonoFrame;

    #[test]
    fn tick_moves_one_frame() {
        let ring: OutputBuffer<MonoFrame, 4> = OutputBuffer::new();
        ring.push(MonoFrame(1)).unwrap();
        ring.push(MonoFrame(2)).unwrap();

        let mut played = Vec::new();
        let mut handler = OutputHandler::new(&ring, |f: MonoFrame| played.push(f.0));
        handler.on_tick();
        assert_eq!(ring.len(), 1);
        handler.on_tick();
        handler.on_tick();
        drop(handler);

        assert_eq!(played, [1, 2, 0]);
        assert_eq!(ring.underruns(), 1);
    }

    #[test]
    fn struct_sinks() {
        struct Last(i16);
        impl OutputSink<MonoFrame> for Last {
            fn write(&mut self, frame: MonoFrame) {
                self.0 = frame.0;
            }
        }

        let ring: OutputBuffer<MonoFrame, 2> = OutputBuffer::new();
        ring.push(MonoFrame(-7)).unwrap();
        let mut handler = OutputHandler::new(&ring, Last(0));
        handler.on_tick();
        assert_eq!(handler.sink().0, -7);
        assert_eq!(handler.release().0, -7);
    }
}
