//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod config;
pub mod encoder;
pub mod microphone;

// Re-export common types
pub use config::ConfigStore;
pub use encoder::{EncoderError, EncoderFactory, EncoderSettings, Mp3Encoder};
pub use microphone::{
    AcquireError, MediaStream, Microphone, RecorderEvent, RecorderEventCallback,
    StreamConstraints,
};
