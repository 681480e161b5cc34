//! Audio blob value object

use std::fmt;

/// Content kind carried by an [`AudioBlob`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// RIFF/WAVE container with interleaved 16-bit PCM
    PcmContainer,
    /// Raw MPEG layer III frame stream
    Mp3Container,
}

impl ContentKind {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PcmContainer => "audio/wav",
            Self::Mp3Container => "audio/mp3",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::PcmContainer => "wav",
            Self::Mp3Container => "mp3",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable audio bytes tagged with their content kind.
///
/// Stages hand blobs to each other by value; nothing clones the payload
/// on the way through the pipeline.
#[derive(Debug, PartialEq, Eq)]
pub struct AudioBlob {
    bytes: Vec<u8>,
    kind: ContentKind,
}

impl AudioBlob {
    /// Create a blob from owned bytes
    pub fn new(bytes: Vec<u8>, kind: ContentKind) -> Self {
        Self { bytes, kind }
    }

    /// Create a PCM container blob
    pub fn pcm(bytes: Vec<u8>) -> Self {
        Self::new(bytes, ContentKind::PcmContainer)
    }

    /// Concatenate chunks, in order, into one blob
    pub fn concat<I>(chunks: I, kind: ContentKind) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut iter = chunks.into_iter();
        let mut bytes = iter.next().unwrap_or_default();
        for chunk in iter {
            bytes.extend_from_slice(&chunk);
        }
        Self { bytes, kind }
    }

    /// Get the raw bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Get the content kind
    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Get the size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob carries no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.len();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
