//! mic2mp3 - microphone capture and MP3 transcoding
//!
//! This crate records the default microphone as a 16-bit PCM WAV container
//! and transcodes PCM WAV data to constant-bitrate MP3 on isolated worker
//! threads.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: WAV container codec, capture state, durations, config and errors
//! - **Application**: Capture session and transcode pipeline, plus port traits
//! - **Infrastructure**: Adapter implementations (cpal, LAME, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
