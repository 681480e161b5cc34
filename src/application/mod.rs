//! Application layer - Use cases and port interfaces
//!
//! Contains the capture and transcode operations and the trait
//! definitions for the microphone and MP3 encoder they depend on.

pub mod capture;
pub mod ports;
pub mod transcode;

// Re-export use cases
pub use capture::{CaptureCallbacks, CaptureError, CaptureSession, CaptureSettings};
pub use transcode::{
    ConvertCallbacks, ConvertError, Mp3Converter, TranscodeError, TranscodePipeline,
};
