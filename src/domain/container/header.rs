//! PCM container header parsing

use crate::domain::audio::{StreamFormat, BITS_PER_SAMPLE, BYTES_PER_SAMPLE};
use crate::domain::error::ContainerError;

/// Smallest byte count a RIFF/WAVE container with a PCM format chunk can have
pub const MIN_HEADER_SIZE: usize = 44;

const RIFF_HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
const PCM_FORMAT_CHUNK_SIZE: usize = 16;
const EXTENSIBLE_FORMAT_CHUNK_SIZE: usize = 40;

const FORMAT_PCM: u16 = 0x0001;
const FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Format fields recovered from a PCM container.
///
/// `data_offset` always lies within the container it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmHeader {
    pub channel_count: u16,
    pub sample_rate: u32,
    pub data_offset: u32,
}

impl PcmHeader {
    /// Stream format described by this header
    pub fn format(&self) -> StreamFormat {
        StreamFormat::new(self.channel_count, self.sample_rate)
    }

    /// Payload bytes following the header in a container of `container_len` bytes
    pub fn payload_len(&self, container_len: usize) -> usize {
        container_len.saturating_sub(self.data_offset as usize)
    }

    /// Complete interleaved frames in a container of `container_len` bytes
    pub fn frame_count(&self, container_len: usize) -> usize {
        self.payload_len(container_len) / self.format().block_align() as usize
    }

    /// Payload bytes that do not form a complete frame and are ignored
    pub fn trailing_bytes(&self, container_len: usize) -> usize {
        self.payload_len(container_len) % self.format().block_align() as usize
    }

    /// Audio duration in milliseconds
    pub fn duration_ms(&self, container_len: usize) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        self.frame_count(container_len) as u64 * 1000 / self.sample_rate as u64
    }
}

/// Read the format fields from a RIFF/WAVE container.
///
/// Walks the chunk list until the `data` chunk; sizes declared for the
/// `data` chunk are ignored, the payload runs to the end of the buffer.
pub fn parse_header(bytes: &[u8]) -> Result<PcmHeader, ContainerError> {
    let len = bytes.len();
    if len < MIN_HEADER_SIZE {
        return Err(ContainerError::TooShort {
            len,
            min: MIN_HEADER_SIZE,
        });
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(ContainerError::InvalidSignature);
    }

    let mut format: Option<StreamFormat> = None;
    let mut pos = RIFF_HEADER_SIZE;

    while pos + CHUNK_HEADER_SIZE <= len {
        let id = &bytes[pos..pos + 4];
        let size = read_u32(bytes, pos + 4) as usize;
        let body = pos + CHUNK_HEADER_SIZE;

        match id {
            b"fmt " => format = Some(parse_format_chunk(bytes, body, size)?),
            b"data" => {
                let format = format.ok_or(ContainerError::MissingFormatChunk)?;
                return Ok(PcmHeader {
                    channel_count: format.channels,
                    sample_rate: format.sample_rate,
                    data_offset: body as u32,
                });
            }
            _ => {}
        }

        // Chunks are word aligned
        pos = body.saturating_add(size).saturating_add(size & 1);
    }

    Err(ContainerError::MissingDataChunk)
}

fn parse_format_chunk(
    bytes: &[u8],
    body: usize,
    size: usize,
) -> Result<StreamFormat, ContainerError> {
    if size < PCM_FORMAT_CHUNK_SIZE || body + PCM_FORMAT_CHUNK_SIZE > bytes.len() {
        return Err(ContainerError::TooShort {
            len: bytes.len(),
            min: body + PCM_FORMAT_CHUNK_SIZE,
        });
    }

    let mut tag = read_u16(bytes, body);
    if tag == FORMAT_EXTENSIBLE
        && size >= EXTENSIBLE_FORMAT_CHUNK_SIZE
        && body + EXTENSIBLE_FORMAT_CHUNK_SIZE <= bytes.len()
    {
        // First two bytes of the sub-format GUID carry the real tag
        tag = read_u16(bytes, body + 24);
    }
    if tag != FORMAT_PCM {
        return Err(ContainerError::UnsupportedFormatTag(tag));
    }

    let channels = read_u16(bytes, body + 2);
    if !(1..=2).contains(&channels) {
        return Err(ContainerError::UnsupportedChannelCount(channels));
    }

    let bits = read_u16(bytes, body + 14);
    if bits != BITS_PER_SAMPLE {
        return Err(ContainerError::UnsupportedBitDepth(bits));
    }

    Ok(StreamFormat::new(channels, read_u32(bytes, body + 4)))
}

/// Number of 16-bit samples (all channels) in the payload.
///
/// A trailing odd byte is dropped.
pub fn interleaved_sample_count(bytes: &[u8], header: &PcmHeader) -> usize {
    header.payload_len(bytes.len()) / BYTES_PER_SAMPLE as usize
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::container::wav::{encode_container, generate_header};

    #[test]
    fn parses_canonical_stereo_header() {
        let bytes = encode_container(StreamFormat::new(2, 44_100), &[0; 8]);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.channel_count, 2);
        assert_eq!(header.sample_rate, 44_100);
        assert_eq!(header.data_offset, 44);
        assert_eq!(header.frame_count(bytes.len()), 4);
    }

    #[test]
    fn parses_mono_header() {
        let bytes = encode_container(StreamFormat::new(1, 16_000), &[0; 3]);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.channel_count, 1);
        assert_eq!(header.sample_rate, 16_000);
    }

    #[test]
    fn skips_unknown_chunks_before_data() {
        let canonical = generate_header(StreamFormat::new(2, 48_000), 4);
        let mut bytes = canonical[..36].to_vec();
        // "LIST" chunk with odd size and its pad byte
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(&[1, 2, 3, 0]);
        bytes.extend_from_slice(&canonical[36..]);
        bytes.extend_from_slice(&[0; 4]);

        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.data_offset, 56);
        assert_eq!(header.sample_rate, 48_000);
    }

    #[test]
    fn rejects_short_input() {
        let err = parse_header(&[0u8; 10]).unwrap_err();
        assert_eq!(err, ContainerError::TooShort { len: 10, min: 44 });
    }

    #[test]
    fn rejects_wrong_signature() {
        let mut bytes = encode_container(StreamFormat::new(1, 8000), &[0; 4]);
        bytes[0..4].copy_from_slice(b"RIFX");
        assert_eq!(parse_header(&bytes), Err(ContainerError::InvalidSignature));
    }

    #[test]
    fn rejects_float_format() {
        let mut bytes = encode_container(StreamFormat::new(1, 8000), &[0; 4]);
        bytes[20..22].copy_from_slice(&3u16.to_le_bytes());
        assert_eq!(
            parse_header(&bytes),
            Err(ContainerError::UnsupportedFormatTag(3))
        );
    }

    #[test]
    fn rejects_24_bit_samples() {
        let mut bytes = encode_container(StreamFormat::new(1, 8000), &[0; 4]);
        bytes[34..36].copy_from_slice(&24u16.to_le_bytes());
        assert_eq!(
            parse_header(&bytes),
            Err(ContainerError::UnsupportedBitDepth(24))
        );
    }

    #[test]
    fn rejects_surround() {
        let mut bytes = encode_container(StreamFormat::new(2, 8000), &[0; 4]);
        bytes[22..24].copy_from_slice(&6u16.to_le_bytes());
        assert_eq!(
            parse_header(&bytes),
            Err(ContainerError::UnsupportedChannelCount(6))
        );
    }

    #[test]
    fn rejects_data_before_format() {
        let mut bytes = b"RIFF\0\0\0\0WAVE".to_vec();
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&32u32.to_le_bytes());
        bytes.extend_from_slice(&[0; 32]);
        assert_eq!(parse_header(&bytes), Err(ContainerError::MissingFormatChunk));
    }

    #[test]
    fn rejects_missing_data_chunk() {
        let bytes = encode_container(StreamFormat::new(1, 8000), &[0; 4]);
        let mut truncated = bytes[..36].to_vec();
        truncated.extend_from_slice(b"junk");
        truncated.extend_from_slice(&4u32.to_le_bytes());
        truncated.extend_from_slice(&[0; 4]);
        assert_eq!(parse_header(&truncated), Err(ContainerError::MissingDataChunk));
    }

    #[test]
    fn sample_count_drops_odd_trailing_byte() {
        let mut bytes = encode_container(StreamFormat::new(2, 8000), &[1, 2, 3, 4]);
        bytes.push(0x7F);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(interleaved_sample_count(&bytes, &header), 4);
        assert_eq!(header.trailing_bytes(bytes.len()), 1);
    }

    #[test]
    fn duration_from_frames() {
        let bytes = encode_container(StreamFormat::new(1, 8000), &[0; 4000]);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.duration_ms(bytes.len()), 500);
    }
}
