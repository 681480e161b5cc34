//! PCM container codec
//!
//! Parses RIFF/WAVE headers, splits interleaved 16-bit payloads into
//! per-channel buffers, and assembles encoder output into a compressed blob.

mod channels;
mod header;
mod registry;
pub mod wav;

pub use channels::{deinterleave, ChannelBuffers};
pub use header::{interleaved_sample_count, parse_header, PcmHeader, MIN_HEADER_SIZE};
pub use registry::{ChunkEncoder, ChunkEncoderFactory, FormatRegistry, RegistryError};
pub use wav::WavChunkEncoder;

use crate::domain::audio::{AudioBlob, ContentKind};

/// Join encoder output into an MP3 blob.
///
/// `encoded` is reused as the output buffer, so only `trailing` is copied.
pub fn serialize(encoded: Vec<u8>, trailing: &[u8]) -> AudioBlob {
    let mut bytes = encoded;
    bytes.extend_from_slice(trailing);
    AudioBlob::new(bytes, ContentKind::Mp3Container)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_concatenates_in_order() {
        let blob = serialize(vec![0xFF, 0xFB, 1], &[2, 3]);
        assert_eq!(blob.bytes(), &[0xFF, 0xFB, 1, 2, 3]);
        assert_eq!(blob.kind(), ContentKind::Mp3Container);
    }

    #[test]
    fn serialize_length_is_sum_of_inputs() {
        let blob = serialize(vec![0; 417], &[0; 33]);
        assert_eq!(blob.len(), 450);
    }
}
