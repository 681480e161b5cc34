//! RIFF/WAVE writing helpers.
//!
//! Capture emits the container incrementally: the first chunk carries a
//! 44-byte header with placeholder sizes, later chunks carry bare samples.
//! [`patch_sizes`] fixes the size fields once the whole container exists.
//!
//! Header layout:
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    file size - 8
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16 (PCM format chunk size)
//! [20-21]  1 (PCM format code)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate
//! [32-33]  block_align
//! [34-35]  bits per sample
//! [36-39]  "data"
//! [40-43]  data size
//! ```

use crate::domain::audio::{StreamFormat, BITS_PER_SAMPLE};
use crate::domain::error::ContainerError;

use super::header::parse_header;
use super::registry::ChunkEncoder;

/// Size of the canonical WAV header in bytes
pub const WAV_HEADER_SIZE: usize = 44;

/// Size placeholder written while the final length is unknown
pub const STREAMING_SIZE: u32 = u32::MAX;

/// Generate a 44-byte WAV header for `data_size` bytes of 16-bit PCM.
pub fn generate_header(format: StreamFormat, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let chunk_size = data_size.saturating_add(36);

    let mut header = [0u8; WAV_HEADER_SIZE];

    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
    header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
    header[34..36].copy_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Build a complete container from interleaved samples.
pub fn encode_container(format: StreamFormat, samples: &[i16]) -> Vec<u8> {
    let data_size = (samples.len() * 2) as u32;
    let mut bytes = Vec::with_capacity(WAV_HEADER_SIZE + samples.len() * 2);
    bytes.extend_from_slice(&generate_header(format, data_size));
    append_samples(&mut bytes, samples);
    bytes
}

/// Rewrite the RIFF and data size fields to match the container length.
///
/// Sizes beyond `u32::MAX` are clamped.
pub fn patch_sizes(bytes: &mut [u8]) -> Result<(), ContainerError> {
    let header = parse_header(bytes)?;
    let data_offset = header.data_offset as usize;

    let riff_size = clamp_u32(bytes.len() - 8);
    let data_size = clamp_u32(bytes.len() - data_offset);

    bytes[4..8].copy_from_slice(&riff_size.to_le_bytes());
    bytes[data_offset - 4..data_offset].copy_from_slice(&data_size.to_le_bytes());
    Ok(())
}

fn clamp_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn append_samples(bytes: &mut Vec<u8>, samples: &[i16]) {
    bytes.reserve(samples.len() * 2);
    for sample in samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
}

/// Streaming WAV encoder handed to the capture mechanism.
#[derive(Debug)]
pub struct WavChunkEncoder {
    format: StreamFormat,
    header_written: bool,
}

impl WavChunkEncoder {
    pub fn new(format: StreamFormat) -> Self {
        Self {
            format,
            header_written: false,
        }
    }

    /// Factory signature used by the format registry
    pub fn boxed(format: StreamFormat) -> Box<dyn ChunkEncoder> {
        Box::new(Self::new(format))
    }
}

impl ChunkEncoder for WavChunkEncoder {
    fn encode_chunk(&mut self, samples: &[i16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        if !self.header_written {
            bytes.extend_from_slice(&generate_header(self.format, STREAMING_SIZE));
            self.header_written = true;
        }
        append_samples(&mut bytes, samples);
        bytes
    }

    fn format(&self) -> StreamFormat {
        self.format
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u16(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn header_magic_and_fields() {
        let header = generate_header(StreamFormat::new(2, 48_000), 9600);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");

        assert_eq!(read_u16(&header, 20), 1);
        assert_eq!(read_u16(&header, 22), 2);
        assert_eq!(read_u32(&header, 24), 48_000);
        assert_eq!(read_u32(&header, 28), 192_000);
        assert_eq!(read_u16(&header, 32), 4);
        assert_eq!(read_u16(&header, 34), 16);
        assert_eq!(read_u32(&header, 40), 9600);
        assert_eq!(read_u32(&header, 4), 9636);
    }

    #[test]
    fn encode_container_writes_little_endian_samples() {
        let bytes = encode_container(StreamFormat::new(1, 8000), &[1, -1, 256]);
        assert_eq!(bytes.len(), WAV_HEADER_SIZE + 6);
        assert_eq!(&bytes[44..], &[0x01, 0x00, 0xFF, 0xFF, 0x00, 0x01]);
    }

    #[test]
    fn chunk_encoder_writes_header_once() {
        let mut encoder = WavChunkEncoder::new(StreamFormat::new(2, 44_100));
        let first = encoder.encode_chunk(&[1, 2]);
        let second = encoder.encode_chunk(&[3, 4]);

        assert_eq!(first.len(), WAV_HEADER_SIZE + 4);
        assert_eq!(&first[0..4], b"RIFF");
        assert_eq!(read_u32(&first, 40), STREAMING_SIZE);
        assert_eq!(second, vec![3, 0, 4, 0]);
    }

    #[test]
    fn chunk_encoder_empty_chunk_after_header_is_empty() {
        let mut encoder = WavChunkEncoder::new(StreamFormat::new(1, 16_000));
        encoder.encode_chunk(&[]);
        assert!(encoder.encode_chunk(&[]).is_empty());
    }

    #[test]
    fn patch_sizes_fixes_streaming_header() {
        let mut encoder = WavChunkEncoder::new(StreamFormat::new(1, 16_000));
        let mut bytes = encoder.encode_chunk(&[10, 20, 30]);
        bytes.extend(encoder.encode_chunk(&[40]));

        patch_sizes(&mut bytes).unwrap();
        assert_eq!(read_u32(&bytes, 4), (bytes.len() - 8) as u32);
        assert_eq!(read_u32(&bytes, 40), 8);
    }

    #[test]
    fn patch_sizes_rejects_garbage() {
        let mut bytes = vec![0u8; 64];
        assert_eq!(patch_sizes(&mut bytes), Err(ContainerError::InvalidSignature));
    }
}
