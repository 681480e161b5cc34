//! Microphone port interfaces

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::StreamFormat;
use crate::domain::container::ChunkEncoder;
use crate::domain::recording::Duration;

/// Microphone acquisition errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("Audio capture is not supported on this system")]
    NotSupported,

    #[error("Microphone access was denied")]
    PermissionDenied,

    #[error("Failed to open microphone: {0}")]
    Other(String),
}

/// What the caller would like from the microphone.
/// Adapters pick the closest format the device offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub channels: u16,
    pub sample_rate: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            channels: 2,
            sample_rate: 44_100,
        }
    }
}

/// Events emitted by a running recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// A chunk of container bytes, possibly empty
    DataAvailable(Vec<u8>),
    /// The recorder finished. May be delivered more than once.
    Stopped,
}

/// Callback receiving recorder events, in order, from the capture thread
pub type RecorderEventCallback = Arc<dyn Fn(RecorderEvent) + Send + Sync>;

/// An acquired microphone stream with its recorder.
pub trait MediaStream: Send {
    /// The sample layout the device actually delivers
    fn format(&self) -> StreamFormat;

    /// Start emitting container chunks every `timeslice`.
    fn start(
        &mut self,
        encoder: Box<dyn ChunkEncoder>,
        timeslice: Duration,
        on_event: RecorderEventCallback,
    ) -> Result<(), AcquireError>;

    /// Ask the recorder to emit its final chunk followed by `Stopped`.
    /// Returns without waiting for either.
    fn request_stop(&mut self);

    /// Stop every track and release the device.
    ///
    /// May block until the device is closed, so async callers run it on the
    /// blocking pool.
    fn stop_tracks(&mut self);
}

/// Port for microphone acquisition
#[async_trait]
pub trait Microphone: Send + Sync {
    /// Whether this platform can capture audio at all
    fn is_supported(&self) -> bool;

    /// Acquire a microphone stream.
    ///
    /// This is the only call in a capture session that suspends.
    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, AcquireError>;
}
