//! Domain layer - Core logic
//!
//! Contains value objects, the PCM container codec, the capture state
//! machine and domain errors. This layer has no dependencies on external
//! systems.

pub mod audio;
pub mod capture;
pub mod config;
pub mod container;
pub mod error;
pub mod recording;

// Re-export common types
pub use audio::{AudioBlob, ContentKind, StreamFormat};
pub use capture::{CaptureLifecycle, CaptureState, ChunkAccumulator};
pub use config::AppConfig;
pub use error::*;
pub use recording::Duration;
