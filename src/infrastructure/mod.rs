//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, LAME and the XDG config directory.

pub mod config;
pub mod encoder;
pub mod microphone;

// Re-export adapters
pub use config::XdgConfigStore;
pub use encoder::{LameEncoder, LameEncoderFactory};
pub use microphone::CpalMicrophone;
