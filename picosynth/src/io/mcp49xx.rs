//! MCP4822/MCP4922-style 12-bit SPI DAC output.
//!
//! Each write is one 16-bit command: channel select, buffered reference
//! off, 1x gain, output enabled, then 12 data bits.

use embedded_hal::spi::SpiDevice;

use super::frame::{MonoFrame, StereoFrame};
use super::sink::OutputSink;

const CHANNEL_B: u16 = 1 << 15;
const GAIN_1X: u16 = 1 << 13;
const ACTIVE: u16 = 1 << 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DacChannel {
    A,
    B,
}

/// Command word for a 12-bit level on `channel`.
pub const fn command(channel: DacChannel, level: u16) -> u16 {
    let select = match channel {
        DacChannel::A => 0,
        DacChannel::B => CHANNEL_B,
    };
    select | GAIN_1X | ACTIVE | (level & 0x0FFF)
}

/// DAC sink. Mono frames go to the configured channel; stereo frames go
/// to A (left) and B (right). Failed transfers are counted.
pub struct Mcp49xxSink<S> {
    spi: S,
    channel: DacChannel,
    errors: u32,
}

impl<S: SpiDevice> Mcp49xxSink<S> {
    pub fn new(spi: S, channel: DacChannel) -> Self {
        Mcp49xxSink {
            spi,
            channel,
            errors: 0,
        }
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> S {
        self.spi
    }

    fn send(&mut self, channel: DacChannel, level: u16) {
        let word = command(channel, level).to_be_bytes();
        if self.spi.write(&word).is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
    }
}

impl<S: SpiDevice> OutputSink<MonoFrame> for Mcp49xxSink<S> {
    fn write(&mut self, frame: MonoFrame) {
        self.send(self.channel, frame.to_unsigned::<12>());
    }
}

impl<S: SpiDevice> OutputSink<StereoFrame> for Mcp49xxSink<S> {
    fn write(&mut self, frame: StereoFrame) {
        let (left, right) = frame.to_unsigned::<12>();
        self.send(DacChannel::A, left);
        self.send(DacChannel::B, right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::spi::{self, ErrorType, Operation};
    use crate::io::AudioFrame;

    #[derive(Debug)]
    struct MockError;

    impl spi::Error for MockError {
        fn kind(&self) -> spi::ErrorKind {
            spi::ErrorKind::Other
        }
    }

    /// Records every 16-bit word written.
    struct MockSpi {
        words: Vec<u16>,
        fail: bool,
    }

    impl ErrorType for MockSpi {
        type Error = MockError;
    }

    impl SpiDevice for MockSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(MockError);
            }
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    for pair in bytes.chunks(2) {
                        self.words.push(u16::from_be_bytes([pair[0], pair[1]]));
                    }
                }
            }
            Ok(())
        }
    }

    fn mock() -> MockSpi {
        MockSpi {
            words: Vec::new(),
            fail: false,
        }
    }

    #[test]
    fn command_layout() {
        assert_eq!(command(DacChannel::A, 0x0ABC), 0x3ABC);
        assert_eq!(command(DacChannel::B, 0xFFFF), 0xBFFF);
    }

    #[test]
    fn mono_frames_to_one_channel() {
        let mut dac = Mcp49xxSink::new(mock(), DacChannel::B);
        dac.write(MonoFrame::SILENCE);
        dac.write(MonoFrame(i16::MAX));
        assert_eq!(dac.release().words, [0xB800, 0xBFFF]);
    }

    #[test]
    fn stereo_frames_to_both_channels() {
        let mut dac = Mcp49xxSink::new(mock(), DacChannel::A);
        dac.write(StereoFrame::new(i16::MIN, 0));
        assert_eq!(dac.release().words, [0x3000, 0xB800]);
    }

    #[test]
    fn failed_transfers_counted() {
        let mut spi = mock();
        spi.fail = true;
        let mut dac = Mcp49xxSink::new(spi, DacChannel::A);
        OutputSink::<StereoFrame>::write(&mut dac, StereoFrame::SILENCE);
        assert_eq!(dac.errors(), 2);
    }
}
