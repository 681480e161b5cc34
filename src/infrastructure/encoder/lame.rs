//! MP3 encoder backed by LAME
//!
//! Constant bitrate, highest quality setting. A new encoder is built for
//! every transcode job and dropped after flushing.

use mp3lame_encoder::{Bitrate, Builder, DualPcm, Encoder, FlushNoGap, MonoPcm, Quality};

use crate::application::ports::{EncoderError, EncoderFactory, EncoderSettings, Mp3Encoder};
use crate::domain::container::ChannelBuffers;

/// LAME's worst case for the final flush
const FLUSH_BUFFER_SIZE: usize = 7200;

/// Builds [`LameEncoder`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct LameEncoderFactory;

impl LameEncoderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl EncoderFactory for LameEncoderFactory {
    fn create(&self, settings: EncoderSettings) -> Result<Box<dyn Mp3Encoder>, EncoderError> {
        Ok(Box::new(LameEncoder::new(settings)?))
    }
}

/// Map a kbps value to LAME's CBR table
fn lame_bitrate(kbps: u32) -> Result<Bitrate, EncoderError> {
    let bitrate = match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => return Err(EncoderError::UnsupportedBitrate(other)),
    };
    Ok(bitrate)
}

/// One LAME encoder instance
pub struct LameEncoder {
    inner: Encoder,
    channels: u16,
}

impl LameEncoder {
    pub fn new(settings: EncoderSettings) -> Result<Self, EncoderError> {
        let bitrate = lame_bitrate(settings.bitrate_kbps)?;
        let channels = u8::try_from(settings.channels)
            .map_err(|_| EncoderError::Init(format!("{} channels", settings.channels)))?;

        let mut builder = Builder::new()
            .ok_or_else(|| EncoderError::Init("failed to allocate LAME encoder".to_string()))?;
        builder
            .set_num_channels(channels)
            .map_err(|e| EncoderError::Init(format!("channel count: {:?}", e)))?;
        builder
            .set_sample_rate(settings.sample_rate)
            .map_err(|e| EncoderError::Init(format!("sample rate: {:?}", e)))?;
        builder
            .set_brate(bitrate)
            .map_err(|e| EncoderError::Init(format!("bitrate: {:?}", e)))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| EncoderError::Init(format!("quality: {:?}", e)))?;

        let inner = builder
            .build()
            .map_err(|e| EncoderError::Init(format!("{:?}", e)))?;

        Ok(Self {
            inner,
            channels: settings.channels,
        })
    }
}

impl Mp3Encoder for LameEncoder {
    fn encode_all(&mut self, channels: &ChannelBuffers) -> Result<Vec<u8>, EncoderError> {
        let frames = channels.frames();
        let mut out: Vec<u8> = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(frames));

        match (self.channels, channels.right()) {
            (2, Some(right)) => self.inner.encode_to_vec(
                DualPcm {
                    left: channels.left(),
                    right,
                },
                &mut out,
            ),
            (1, None) => self.inner.encode_to_vec(MonoPcm(channels.left()), &mut out),
            (expected, _) => {
                return Err(EncoderError::Encode(format!(
                    "encoder built for {} channel(s), got {}",
                    expected,
                    channels.channel_count()
                )))
            }
        }
        .map_err(|e| EncoderError::Encode(format!("{:?}", e)))?;

        Ok(out)
    }

    fn flush(&mut self) -> Result<Vec<u8>, EncoderError> {
        let mut out: Vec<u8> = Vec::with_capacity(FLUSH_BUFFER_SIZE);
        self.inner
            .flush_to_vec::<FlushNoGap>(&mut out)
            .map_err(|e| EncoderError::Flush(format!("{:?}", e)))?;
        Ok(out)
    }
}
