//! Transcode use case: PCM container in, MP3 out.
//!
//! Every job runs on its own short-lived worker thread. The caller only
//! waits on a oneshot channel, bounded by the job deadline; when the
//! deadline passes the caller stops waiting and the worker's result is
//! discarded.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::audio::{AudioBlob, ContentKind};
use crate::domain::config::DEFAULT_BITRATE_KBPS;
use crate::domain::container;
use crate::domain::error::ContainerError;
use crate::domain::recording::Duration;

use super::ports::{EncoderError, EncoderFactory, EncoderSettings};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

/// Errors that end a transcode job
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    #[error("Transcoding did not finish within {0}")]
    Timeout(Duration),

    #[error("Transcode worker failed: {0}")]
    WorkerFault(String),

    #[error("Malformed PCM container: {0}")]
    Decode(#[from] ContainerError),

    #[error(transparent)]
    Encode(#[from] EncoderError),
}

/// Runs PCM-to-MP3 jobs on isolated worker threads
pub struct TranscodePipeline<F: EncoderFactory> {
    factory: Arc<F>,
    bitrate_kbps: u32,
    timeout: Duration,
}

impl<F: EncoderFactory> TranscodePipeline<F> {
    /// Create a pipeline with the default bitrate (256 kbps) and deadline (60s)
    pub fn new(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            timeout: Duration::default_timeout(),
        }
    }

    /// Use a different constant bitrate
    pub fn with_bitrate(mut self, bitrate_kbps: u32) -> Self {
        self.bitrate_kbps = bitrate_kbps;
        self
    }

    /// Use a different job deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Transcode a PCM container into an MP3 blob.
    ///
    /// Resolves exactly once: with the MP3, a decode/encode failure reported
    /// by the worker, `WorkerFault` if the worker died, or `Timeout`.
    pub async fn transcode(&self, blob: AudioBlob) -> Result<AudioBlob, TranscodeError> {
        let job_id = NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        let factory = Arc::clone(&self.factory);
        let bitrate_kbps = self.bitrate_kbps;

        info!(
            "Transcode job {} submitted ({}, {})",
            job_id,
            blob.kind(),
            blob.human_readable_size()
        );

        thread::Builder::new()
            .name(format!("transcode-{}", job_id))
            .spawn(move || {
                let outcome = run_job(factory.as_ref(), blob, bitrate_kbps, || tx.is_closed());
                if tx.send(outcome).is_err() {
                    debug!("Transcode job {} finished after its caller gave up", job_id);
                }
            })
            .map_err(|e| TranscodeError::WorkerFault(format!("failed to spawn worker: {}", e)))?;

        let outcome = match tokio::time::timeout(self.timeout.as_std(), rx).await {
            Err(_) => {
                warn!("Transcode job {} timed out after {}", job_id, self.timeout);
                return Err(TranscodeError::Timeout(self.timeout));
            }
            Ok(Err(_)) => {
                warn!("Transcode job {} worker exited without a result", job_id);
                return Err(TranscodeError::WorkerFault(
                    "worker exited without a result".to_string(),
                ));
            }
            Ok(Ok(outcome)) => outcome,
        };

        let mp3 = outcome?;
        if mp3.kind() != ContentKind::Mp3Container {
            return Err(TranscodeError::WorkerFault(format!(
                "worker returned {} instead of {}",
                mp3.kind(),
                ContentKind::Mp3Container
            )));
        }

        info!(
            "Transcode job {} finished ({})",
            job_id,
            mp3.human_readable_size()
        );
        Ok(mp3)
    }
}

/// parse -> de-interleave -> encode -> flush -> serialize, strictly in order.
///
/// `abandoned` is polled between steps; once the caller stopped waiting the
/// remaining steps are skipped.
fn run_job<F, A>(
    factory: &F,
    blob: AudioBlob,
    bitrate_kbps: u32,
    abandoned: A,
) -> Result<AudioBlob, TranscodeError>
where
    F: EncoderFactory + ?Sized,
    A: Fn() -> bool,
{
    let header = container::parse_header(blob.bytes())?;
    let channels = container::deinterleave(blob.bytes(), &header);
    drop(blob);

    if abandoned() {
        return Err(abandoned_error());
    }

    let mut encoder = factory.create(EncoderSettings {
        channels: header.channel_count,
        sample_rate: header.sample_rate,
        bitrate_kbps,
    })?;
    let encoded = encoder.encode_all(&channels)?;

    if abandoned() {
        return Err(abandoned_error());
    }

    let trailing = encoder.flush()?;
    Ok(container::serialize(encoded, &trailing))
}

fn abandoned_error() -> TranscodeError {
    TranscodeError::WorkerFault("caller stopped waiting".to_string())
}

/// Called with the finished MP3
pub type ConvertCompleteCallback = Box<dyn Fn(&AudioBlob) + Send + Sync>;

/// Called with the reason a conversion failed
pub type ConvertErrorCallback = Box<dyn Fn(&TranscodeError) + Send + Sync>;

/// Callback slots for [`Mp3Converter`]
#[derive(Default)]
pub struct ConvertCallbacks {
    pub on_complete: Option<ConvertCompleteCallback>,
    pub on_error: Option<ConvertErrorCallback>,
}

/// Errors from [`Mp3Converter::convert`]
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    #[error("Conversion is already in progress")]
    AlreadyInProgress,

    #[error(transparent)]
    Transcode(#[from] TranscodeError),
}

/// Caller-facing converter allowing one conversion at a time.
pub struct Mp3Converter<F: EncoderFactory> {
    pipeline: TranscodePipeline<F>,
    callbacks: ConvertCallbacks,
    in_progress: AtomicBool,
}

impl<F: EncoderFactory> Mp3Converter<F> {
    pub fn new(pipeline: TranscodePipeline<F>, callbacks: ConvertCallbacks) -> Self {
        Self {
            pipeline,
            callbacks,
            in_progress: AtomicBool::new(false),
        }
    }

    /// Whether a conversion is currently running
    pub fn in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    pub fn pipeline(&self) -> &TranscodePipeline<F> {
        &self.pipeline
    }

    /// Convert a PCM container to MP3.
    ///
    /// A second call while one is running is refused before any work
    /// starts; that refusal does not reach `on_error`.
    pub async fn convert(&self, blob: AudioBlob) -> Result<AudioBlob, ConvertError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ConvertError::AlreadyInProgress);
        }
        let _guard = InProgressGuard(&self.in_progress);

        match self.pipeline.transcode(blob).await {
            Ok(mp3) => {
                if let Some(ref cb) = self.callbacks.on_complete {
                    cb(&mp3);
                }
                Ok(mp3)
            }
            Err(e) => {
                if let Some(ref cb) = self.callbacks.on_error {
                    cb(&e);
                }
                Err(e.into())
            }
        }
    }
}

/// Clears the in-progress flag on every exit path, including cancellation
struct InProgressGuard<'a>(&'a AtomicBool);

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
