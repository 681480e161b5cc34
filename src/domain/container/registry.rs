//! Process-wide registry of container encoders available to capture.
//!
//! Registration cannot be undone and a second registration of the same
//! kind is refused, so callers go through [`FormatRegistry::ensure_registered`]
//! which checks and registers under a single lock.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::audio::{ContentKind, StreamFormat};

use super::wav::WavChunkEncoder;

/// Turns captured interleaved samples into container bytes, chunk by chunk.
pub trait ChunkEncoder: Send {
    /// Encode the next run of interleaved samples
    fn encode_chunk(&mut self, samples: &[i16]) -> Vec<u8>;

    /// Format this encoder was created for
    fn format(&self) -> StreamFormat;
}

/// Constructor stored in the registry
pub type ChunkEncoderFactory = fn(StreamFormat) -> Box<dyn ChunkEncoder>;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Encoder for {0} is already registered")]
    AlreadyRegistered(ContentKind),
}

static GLOBAL: Lazy<Arc<FormatRegistry>> = Lazy::new(|| Arc::new(FormatRegistry::new()));

/// Map of content kinds to chunk encoder constructors
#[derive(Default)]
pub struct FormatRegistry {
    encoders: Mutex<HashMap<ContentKind, ChunkEncoderFactory>>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<FormatRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Whether an encoder for `kind` is registered
    pub fn is_type_supported(&self, kind: ContentKind) -> bool {
        self.encoders.lock().contains_key(&kind)
    }

    /// Register an encoder. Refuses to replace an existing one.
    pub fn register(
        &self,
        kind: ContentKind,
        factory: ChunkEncoderFactory,
    ) -> Result<(), RegistryError> {
        let mut encoders = self.encoders.lock();
        if encoders.contains_key(&kind) {
            return Err(RegistryError::AlreadyRegistered(kind));
        }
        encoders.insert(kind, factory);
        Ok(())
    }

    /// Register `factory` unless `kind` is already supported.
    ///
    /// Returns `true` when this call performed the registration.
    pub fn ensure_registered(&self, kind: ContentKind, factory: ChunkEncoderFactory) -> bool {
        let mut encoders = self.encoders.lock();
        if encoders.contains_key(&kind) {
            return false;
        }
        encoders.insert(kind, factory);
        debug!("Registered chunk encoder for {}", kind);
        true
    }

    /// Make the WAV chunk encoder available
    pub fn ensure_wav(&self) -> bool {
        self.ensure_registered(ContentKind::PcmContainer, WavChunkEncoder::boxed)
    }

    /// Instantiate the encoder registered for `kind`
    pub fn create_encoder(
        &self,
        kind: ContentKind,
        format: StreamFormat,
    ) -> Option<Box<dyn ChunkEncoder>> {
        let factory = *self.encoders.lock().get(&kind)?;
        Some(factory(format))
    }
}
