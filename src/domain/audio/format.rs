//! PCM stream format

use std::fmt;

/// Bytes per 16-bit sample
pub const BYTES_PER_SAMPLE: u16 = 2;

/// Bits per sample for every PCM stream this crate handles
pub const BITS_PER_SAMPLE: u16 = 16;

/// Shape of an interleaved 16-bit PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

impl StreamFormat {
    pub const fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Bytes occupied by one interleaved frame
    pub const fn block_align(&self) -> u16 {
        self.channels * BYTES_PER_SAMPLE
    }

    /// Bytes per second of audio
    pub const fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = match self.channels {
            1 => "mono",
            2 => "stereo",
            _ => "multichannel",
        };
        write!(f, "{} Hz {} 16-bit", self.sample_rate, layout)
    }
}
