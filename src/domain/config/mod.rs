//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, DEFAULT_BITRATE_KBPS, DEFAULT_CHANNELS, DEFAULT_SAMPLE_RATE, VALID_BITRATES_KBPS,
};
