//! Channel-planar sample buffers

use super::header::PcmHeader;

/// Per-channel 16-bit sample buffers.
///
/// For stereo both buffers hold one sample per frame. For mono only `left`
/// is filled and `right` stays empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelBuffers {
    left: Vec<i16>,
    right: Vec<i16>,
    channel_count: u16,
}

impl ChannelBuffers {
    /// Build from already separated channels.
    /// Pass an empty `right` for mono.
    pub fn new(left: Vec<i16>, right: Vec<i16>) -> Self {
        let channel_count = if right.is_empty() { 1 } else { 2 };
        Self {
            left,
            right,
            channel_count,
        }
    }

    pub fn left(&self) -> &[i16] {
        &self.left
    }

    /// Right channel, `None` for mono
    pub fn right(&self) -> Option<&[i16]> {
        (self.channel_count == 2).then_some(self.right.as_slice())
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Split the interleaved payload of a PCM container into channel buffers.
///
/// One linear pass over complete frames; a partial trailing frame is ignored.
pub fn deinterleave(bytes: &[u8], header: &PcmHeader) -> ChannelBuffers {
    let payload = bytes.get(header.data_offset as usize..).unwrap_or_default();
    let stereo = header.channel_count == 2;
    let stride = header.format().block_align() as usize;
    let frames = payload.len() / stride;

    let mut left = Vec::with_capacity(frames);
    let mut right = if stereo {
        Vec::with_capacity(frames)
    } else {
        Vec::new()
    };

    for frame in payload.chunks_exact(stride) {
        left.push(i16::from_le_bytes([frame[0], frame[1]]));
        if stereo {
            right.push(i16::from_le_bytes([frame[2], frame[3]]));
        }
    }

    ChannelBuffers {
        left,
        right,
        channel_count: header.channel_count,
    }
}
