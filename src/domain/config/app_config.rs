//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;

/// Default constant MP3 bitrate in kbps
pub const DEFAULT_BITRATE_KBPS: u32 = 256;

/// Default capture sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Default capture channel count
pub const DEFAULT_CHANNELS: u16 = 2;

/// Bitrates the MP3 encoder accepts for constant-bitrate output
pub const VALID_BITRATES_KBPS: &[u32] = &[
    8, 16, 24, 32, 40, 48, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub duration: Option<String>,
    pub timeout: Option<String>,
    pub bitrate: Option<u32>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub chunk_interval: Option<String>,
    pub output_dir: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            duration: Some("10s".to_string()),
            timeout: Some("60s".to_string()),
            bitrate: Some(DEFAULT_BITRATE_KBPS),
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            channels: Some(DEFAULT_CHANNELS),
            chunk_interval: Some("100ms".to_string()),
            output_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            duration: other.duration.or(self.duration),
            timeout: other.timeout.or(self.timeout),
            bitrate: other.bitrate.or(self.bitrate),
            sample_rate: other.sample_rate.or(self.sample_rate),
            channels: other.channels.or(self.channels),
            chunk_interval: other.chunk_interval.or(self.chunk_interval),
            output_dir: other.output_dir.or(self.output_dir),
        }
    }

    /// Get the chunk interval, or 100ms if not set/invalid
    pub fn chunk_interval_or_default(&self) -> Duration {
        self.chunk_interval
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_chunk_interval)
    }

    /// Get the bitrate, or 256 kbps if not set/unsupported
    pub fn bitrate_or_default(&self) -> u32 {
        self.bitrate
            .filter(|b| VALID_BITRATES_KBPS.contains(b))
            .unwrap_or(DEFAULT_BITRATE_KBPS)
    }

    /// Get the preferred capture sample rate, or 44.1kHz if not set
    pub fn sample_rate_or_default(&self) -> u32 {
        self.sample_rate
            .filter(|r| *r > 0)
            .unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    /// Get the preferred capture channel count, or stereo if not set/invalid
    pub fn channels_or_default(&self) -> u16 {
        self.channels
            .filter(|c| (1..=2).contains(c))
            .unwrap_or(DEFAULT_CHANNELS)
    }

    /// Get the output directory, if any
    pub fn output_dir(&self) -> Option<&str> {
        self.output_dir.as_deref()
    }
}
