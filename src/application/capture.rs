//! Capture session use case
//!
//! Owns one microphone stream at a time, appends every non-empty chunk the
//! recorder emits, and hands the concatenated PCM container to `on_complete`
//! when the recorder reports that it stopped.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::Mutex;
use thiserror::Error;

use crate::domain::audio::{AudioBlob, ContentKind};
use crate::domain::capture::{
    CaptureLifecycle, CaptureState, ChunkAccumulator, InvalidStateTransition,
};
use crate::domain::container::FormatRegistry;
use crate::domain::recording::Duration;

use super::ports::{
    AcquireError, MediaStream, Microphone, RecorderEvent, RecorderEventCallback,
    StreamConstraints,
};

/// Errors from starting or stopping a capture session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Audio capture is not supported on this system")]
    NotSupported,

    #[error("Microphone permission was denied")]
    NoPermission,

    #[error("Capture is already active ({0})")]
    AlreadyActive(CaptureState),

    #[error("No active recording to stop")]
    StreamUnavailable,

    #[error("Capture failed: {0}")]
    Other(String),
}

impl From<AcquireError> for CaptureError {
    fn from(err: AcquireError) -> Self {
        match err {
            AcquireError::NotSupported => Self::NotSupported,
            AcquireError::PermissionDenied => Self::NoPermission,
            AcquireError::Other(message) => Self::Other(message),
        }
    }
}

pub type CompleteCallback = Box<dyn Fn(AudioBlob) + Send + Sync>;
pub type NoticeCallback = Box<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Box<dyn Fn(&CaptureError) + Send + Sync>;
pub type StateChangeCallback = Box<dyn Fn(CaptureState) + Send + Sync>;

/// Callback slots for a capture session. Only `on_complete` is required.
pub struct CaptureCallbacks {
    on_complete: CompleteCallback,
    on_not_supported: Option<NoticeCallback>,
    on_no_permission: Option<NoticeCallback>,
    on_other_error: Option<ErrorCallback>,
    on_state_change: Option<StateChangeCallback>,
}

impl CaptureCallbacks {
    pub fn new<F>(on_complete: F) -> Self
    where
        F: Fn(AudioBlob) + Send + Sync + 'static,
    {
        Self {
            on_complete: Box::new(on_complete),
            on_not_supported: None,
            on_no_permission: None,
            on_other_error: None,
            on_state_change: None,
        }
    }

    pub fn on_not_supported<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_not_supported = Some(Box::new(f));
        self
    }

    pub fn on_no_permission<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_no_permission = Some(Box::new(f));
        self
    }

    pub fn on_other_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&CaptureError) + Send + Sync + 'static,
    {
        self.on_other_error = Some(Box::new(f));
        self
    }

    pub fn on_state_change<F>(mut self, f: F) -> Self
    where
        F: Fn(CaptureState) + Send + Sync + 'static,
    {
        self.on_state_change = Some(Box::new(f));
        self
    }
}

/// Stream preferences for a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    pub constraints: StreamConstraints,
    /// How often the recorder emits a chunk
    pub timeslice: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            timeslice: Duration::default_chunk_interval(),
        }
    }
}

/// State reachable from the recorder's event callback
struct Shared {
    lifecycle: Mutex<CaptureLifecycle>,
    accumulator: Mutex<ChunkAccumulator>,
    callbacks: CaptureCallbacks,
}

impl Shared {
    fn transition<F>(&self, step: F) -> Result<CaptureState, InvalidStateTransition>
    where
        F: FnOnce(&mut CaptureLifecycle) -> Result<(), InvalidStateTransition>,
    {
        let state = {
            let mut lifecycle = self.lifecycle.lock();
            step(&mut lifecycle)?;
            lifecycle.state()
        };
        debug!("Capture state -> {}", state);
        if let Some(ref cb) = self.callbacks.on_state_change {
            cb(state);
        }
        Ok(state)
    }

    fn report(&self, err: &CaptureError) {
        match err {
            CaptureError::NotSupported => {
                if let Some(ref cb) = self.callbacks.on_not_supported {
                    cb();
                }
            }
            CaptureError::NoPermission => {
                if let Some(ref cb) = self.callbacks.on_no_permission {
                    cb();
                }
            }
            other => {
                if let Some(ref cb) = self.callbacks.on_other_error {
                    cb(other);
                }
            }
        }
    }

    fn finish_stopping(&self) {
        if let Err(e) = self.transition(CaptureLifecycle::stopped) {
            warn!("{}", e);
        }
    }

    fn handle_event(&self, event: RecorderEvent) {
        match event {
            RecorderEvent::DataAvailable(chunk) => {
                let len = chunk.len();
                if self.accumulator.lock().push(chunk) {
                    debug!("Captured chunk of {} bytes", len);
                }
            }
            RecorderEvent::Stopped => {
                let blob = self.accumulator.lock().take_blob();
                match blob {
                    Some(blob) => {
                        info!("Recording complete ({})", blob.human_readable_size());
                        (self.callbacks.on_complete)(blob);
                    }
                    None => debug!("Recorder stopped with nothing buffered"),
                }
            }
        }
    }
}

/// Single-flight microphone capture session
pub struct CaptureSession<M: Microphone> {
    microphone: M,
    registry: Arc<FormatRegistry>,
    settings: CaptureSettings,
    shared: Arc<Shared>,
    stream: Mutex<Option<Box<dyn MediaStream>>>,
}

impl<M: Microphone> CaptureSession<M> {
    /// Create a session backed by the process-wide format registry
    pub fn new(microphone: M, settings: CaptureSettings, callbacks: CaptureCallbacks) -> Self {
        Self::with_registry(microphone, settings, callbacks, FormatRegistry::global())
    }

    pub fn with_registry(
        microphone: M,
        settings: CaptureSettings,
        callbacks: CaptureCallbacks,
        registry: Arc<FormatRegistry>,
    ) -> Self {
        Self {
            microphone,
            registry,
            settings,
            shared: Arc::new(Shared {
                lifecycle: Mutex::new(CaptureLifecycle::new()),
                accumulator: Mutex::new(ChunkAccumulator::new()),
                callbacks,
            }),
            stream: Mutex::new(None),
        }
    }

    pub fn state(&self) -> CaptureState {
        self.shared.lifecycle.lock().state()
    }

    pub fn is_recording(&self) -> bool {
        self.shared.lifecycle.lock().is_recording()
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Acquire the microphone and start recording.
    ///
    /// Fails with `AlreadyActive` if a session is already running; that
    /// failure neither touches the running stream nor its buffered chunks.
    /// Dropping the returned future before it resolves puts the session
    /// back to `Idle`.
    pub async fn start(&self) -> Result<(), CaptureError> {
        if let Err(e) = self.shared.transition(CaptureLifecycle::begin_acquiring) {
            let err = CaptureError::AlreadyActive(e.current_state);
            warn!("{}", err);
            self.shared.report(&err);
            return Err(err);
        }
        let guard = AcquiringGuard::new(&self.shared);
        self.shared.accumulator.lock().clear();

        if self.registry.ensure_wav() {
            debug!("Registered {} chunk encoder", ContentKind::PcmContainer);
        }

        match self.open_stream().await {
            Ok(()) => {
                guard.disarm();
                if let Err(e) = self.shared.transition(CaptureLifecycle::acquired) {
                    warn!("{}", e);
                }
                info!("Recording started");
                Ok(())
            }
            Err(err) => {
                warn!("Failed to start capture: {}", err);
                drop(guard);
                self.shared.report(&err);
                Err(err)
            }
        }
    }

    async fn open_stream(&self) -> Result<(), CaptureError> {
        if !self.microphone.is_supported() {
            return Err(CaptureError::NotSupported);
        }

        let mut stream = self
            .microphone
            .request_stream(self.settings.constraints)
            .await?;

        let format = stream.format();
        let Some(encoder) = self
            .registry
            .create_encoder(ContentKind::PcmContainer, format)
        else {
            release(stream).await;
            return Err(CaptureError::Other(format!(
                "no chunk encoder registered for {}",
                ContentKind::PcmContainer
            )));
        };

        let shared = Arc::clone(&self.shared);
        let on_event: RecorderEventCallback = Arc::new(move |event| shared.handle_event(event));

        if let Err(e) = stream.start(encoder, self.settings.timeslice, on_event) {
            release(stream).await;
            return Err(e.into());
        }

        debug!("Microphone stream started at {}", format);
        *self.stream.lock() = Some(stream);
        Ok(())
    }

    /// Stop recording and release the microphone.
    ///
    /// The recorder's final chunk and its `Stopped` event drive `on_complete`.
    /// The stream is released on the blocking pool; the session is `Idle`
    /// again once that finishes, even if this future is dropped first.
    /// Fails with `StreamUnavailable`, and changes nothing, when not recording.
    pub async fn stop(&self) -> Result<(), CaptureError> {
        if self
            .shared
            .transition(CaptureLifecycle::begin_stopping)
            .is_err()
        {
            let err = CaptureError::StreamUnavailable;
            warn!("{}", err);
            self.shared.report(&err);
            return Err(err);
        }

        let stream = self.stream.lock().take();
        let shared = Arc::clone(&self.shared);
        let finished = tokio::task::spawn_blocking(move || {
            if let Some(mut stream) = stream {
                stream.request_stop();
                stream.stop_tracks();
            }
            shared.finish_stopping();
        })
        .await;

        if finished.is_err() {
            warn!("Releasing the microphone stream panicked");
            self.shared.finish_stopping();
        }
        info!("Recording stopped");
        Ok(())
    }
}

/// Stop every track of a stream that never started recording
async fn release(stream: Box<dyn MediaStream>) {
    let mut stream = stream;
    if tokio::task::spawn_blocking(move || stream.stop_tracks())
        .await
        .is_err()
    {
        warn!("Releasing the microphone stream panicked");
    }
}

/// Returns the session to `Idle` unless acquisition completed
struct AcquiringGuard<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl<'a> AcquiringGuard<'a> {
    fn new(shared: &'a Shared) -> Self {
        Self {
            shared,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AcquiringGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.shared.transition(CaptureLifecycle::acquisition_failed) {
                warn!("{}", e);
            }
        }
    }
}

impl<M: Microphone> Drop for CaptureSession<M> {
    fn drop(&mut self) {
        let Some(mut stream) = self.stream.get_mut().take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || stream.stop_tracks());
            }
            Err(_) => stream.stop_tracks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_errors_map_to_capture_errors() {
        assert_eq!(
            CaptureError::from(AcquireError::NotSupported),
            CaptureError::NotSupported
        );
        assert_eq!(
            CaptureError::from(AcquireError::PermissionDenied),
            CaptureError::NoPermission
        );
        assert_eq!(
            CaptureError::from(AcquireError::Other("busy".into())),
            CaptureError::Other("busy".into())
        );
    }

    #[test]
    fn default_settings() {
        let settings = CaptureSettings::default();
        assert_eq!(settings.constraints.channels, 2);
        assert_eq!(settings.constraints.sample_rate, 44_100);
        assert_eq!(settings.timeslice.as_millis(), 100);
    }

    #[test]
    fn already_active_message_names_state() {
        let err = CaptureError::AlreadyActive(CaptureState::Recording);
        assert_eq!(err.to_string(), "Capture is already active (recording)");
    }
}
