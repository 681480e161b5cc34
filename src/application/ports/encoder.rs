//! MP3 encoder port interfaces

use thiserror::Error;

use crate::domain::container::ChannelBuffers;

/// Encoder errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncoderError {
    #[error("Failed to initialise encoder: {0}")]
    Init(String),

    #[error("Unsupported bitrate: {0} kbps")]
    UnsupportedBitrate(u32),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Flushing encoder failed: {0}")]
    Flush(String),
}

/// Parameters an encoder is created with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderSettings {
    pub channels: u16,
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
}

/// A single-use MP3 encoder.
///
/// Called once with the whole recording, then flushed and dropped.
pub trait Mp3Encoder {
    /// Encode every sample in `channels`, returning the frames produced so far
    fn encode_all(&mut self, channels: &ChannelBuffers) -> Result<Vec<u8>, EncoderError>;

    /// Emit the frames still buffered inside the encoder
    fn flush(&mut self) -> Result<Vec<u8>, EncoderError>;
}

/// Port for creating encoders inside the transcode worker
pub trait EncoderFactory: Send + Sync + 'static {
    fn create(&self, settings: EncoderSettings) -> Result<Box<dyn Mp3Encoder>, EncoderError>;
}
