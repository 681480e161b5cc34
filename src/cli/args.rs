//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::audio::StreamFormat;
use crate::domain::recording::Duration;

/// mic2mp3 - record the microphone as WAV and transcode it to MP3
#[derive(Parser, Debug)]
#[command(name = "mic2mp3")]
#[command(version)]
#[command(about = "Record microphone audio as PCM WAV and transcode it to MP3")]
#[command(long_about = None)]
pub struct Cli {
    /// Show progress logs (RUST_LOG overrides)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record from the default microphone and save an MP3
    Record {
        /// Recording duration (e.g., 10s, 1m, 2m30s); Ctrl+C stops early
        #[arg(short = 'd', long, value_name = "TIME")]
        duration: Option<String>,

        /// Where to write the MP3
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also write the captured WAV
        #[arg(long, value_name = "FILE")]
        keep_wav: Option<PathBuf>,

        /// Preferred channel count (1 or 2)
        #[arg(short = 'c', long, value_name = "N")]
        channels: Option<u16>,

        /// Preferred sample rate in Hz
        #[arg(short = 'r', long, value_name = "HZ")]
        sample_rate: Option<u32>,

        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Transcode a 16-bit PCM WAV file to MP3
    Convert {
        /// Input WAV file
        input: PathBuf,

        /// Where to write the MP3 (defaults to the input with an .mp3 extension)
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Print the header of a PCM WAV file
    Inspect {
        /// Input WAV file
        input: PathBuf,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// MP3 encoding options shared by `record` and `convert`
#[derive(Args, Debug, Clone, Default)]
pub struct EncodeArgs {
    /// Constant MP3 bitrate in kbps
    #[arg(short = 'b', long, value_name = "KBPS", env = "MIC2MP3_BITRATE")]
    pub bitrate: Option<u32>,

    /// Give up on encoding after this long (e.g., 60s)
    #[arg(short = 't', long, value_name = "TIME", env = "MIC2MP3_TIMEOUT")]
    pub timeout: Option<String>,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed record options
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub duration: Duration,
    pub output: PathBuf,
    pub keep_wav: Option<PathBuf>,
    pub preferred: StreamFormat,
    pub chunk_interval: Duration,
    pub encode: EncodeOptions,
}

/// Parsed encoding options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub bitrate_kbps: u32,
    pub timeout: Duration,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "duration",
    "timeout",
    "bitrate",
    "sample_rate",
    "channels",
    "chunk_interval",
    "output_dir",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
