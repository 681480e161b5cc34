//! Ordered buffer of captured container chunks

use crate::domain::audio::{AudioBlob, ContentKind};

/// Collects raw chunks in arrival order until the recording is finalized.
#[derive(Debug, Default)]
pub struct ChunkAccumulator {
    chunks: Vec<Vec<u8>>,
    total_bytes: usize,
}

impl ChunkAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Zero-length chunks are not data and are dropped.
    ///
    /// Returns whether the chunk was kept.
    pub fn push(&mut self, chunk: Vec<u8>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.total_bytes += chunk.len();
        self.chunks.push(chunk);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks held
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Drain everything into one PCM container blob.
    ///
    /// Returns `None` when nothing was accumulated, leaving the accumulator
    /// empty either way.
    pub fn take_blob(&mut self) -> Option<AudioBlob> {
        if self.chunks.is_empty() {
            return None;
        }
        self.total_bytes = 0;
        let chunks = std::mem::take(&mut self.chunks);
        Some(AudioBlob::concat(chunks, ContentKind::PcmContainer))
    }

    /// Discard everything
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.total_bytes = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_chunks_are_dropped() {
        let mut acc = ChunkAccumulator::new();
        assert!(!acc.push(Vec::new()));
        assert!(acc.is_empty());
        assert_eq!(acc.total_bytes(), 0);
    }

    #[test]
    fn take_blob_concatenates_in_order_and_clears() {
        let mut acc = ChunkAccumulator::new();
        acc.push(vec![1, 2]);
        acc.push(vec![]);
        acc.push(vec![3]);
        assert_eq!(acc.len(), 2);
        assert_eq!(acc.total_bytes(), 3);

        let blob = acc.take_blob().unwrap();
        assert_eq!(blob.bytes(), &[1, 2, 3]);
        assert_eq!(blob.kind(), ContentKind::PcmContainer);
        assert!(acc.is_empty());
        assert_eq!(acc.total_bytes(), 0);
    }

    #[test]
    fn take_blob_on_empty_is_none() {
        let mut acc = ChunkAccumulator::new();
        assert!(acc.take_blob().is_none());
    }

    #[test]
    fn second_take_is_none() {
        let mut acc = ChunkAccumulator::new();
        acc.push(vec![7]);
        assert!(acc.take_blob().is_some());
        assert!(acc.take_blob().is_none());
    }

    #[test]
    fn clear_discards() {
        let mut acc = ChunkAccumulator::new();
        acc.push(vec![1]);
        acc.clear();
        assert!(acc.is_empty());
    }
}
