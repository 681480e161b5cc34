//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>ms, <number>s, <number>m, or <number>m<number>s (e.g., 100ms, 30s, 1m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// A PCM container whose header cannot be understood.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    #[error("Container too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("Not a RIFF/WAVE container")]
    InvalidSignature,

    #[error("Missing 'fmt ' chunk before audio data")]
    MissingFormatChunk,

    #[error("Missing 'data' chunk")]
    MissingDataChunk,

    #[error("Unsupported format tag {0:#06x} (only integer PCM is supported)")]
    UnsupportedFormatTag(u16),

    #[error("Unsupported bit depth {0} (only 16-bit samples are supported)")]
    UnsupportedBitDepth(u16),

    #[error("Unsupported channel count {0} (only mono or stereo)")]
    UnsupportedChannelCount(u16),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
