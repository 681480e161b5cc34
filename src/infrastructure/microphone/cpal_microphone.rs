//! Microphone adapter using cpal
//!
//! The cpal stream is not `Send`, so it lives on a dedicated capture thread
//! for its whole life. The session talks to that thread over a command
//! channel; the thread drains captured samples through the chunk encoder
//! once per timeslice and reports chunks through the recorder callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};
use log::{debug, warn};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::application::ports::{
    AcquireError, MediaStream, Microphone, RecorderEvent, RecorderEventCallback,
    StreamConstraints,
};
use crate::domain::audio::StreamFormat;
use crate::domain::container::ChunkEncoder;
use crate::domain::recording::Duration;

/// Shortest interval between chunk flushes
const MIN_TIMESLICE_MS: u64 = 10;

/// Default input device of the default cpal host
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalMicrophone;

impl CpalMicrophone {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Microphone for CpalMicrophone {
    fn is_supported(&self) -> bool {
        !cpal::available_hosts().is_empty()
    }

    async fn request_stream(
        &self,
        constraints: StreamConstraints,
    ) -> Result<Box<dyn MediaStream>, AcquireError> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (command_tx, command_rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || capture_thread(constraints, ready_tx, command_rx))
            .map_err(|e| AcquireError::Other(format!("failed to spawn capture thread: {}", e)))?;

        let format = ready_rx
            .await
            .map_err(|_| AcquireError::Other("capture thread exited during setup".to_string()))??;

        debug!("Acquired default input device at {}", format);
        Ok(Box::new(CpalStream {
            format,
            commands: command_tx,
            thread: Some(handle),
        }))
    }
}

enum Command {
    Start {
        encoder: Box<dyn ChunkEncoder>,
        timeslice: Duration,
        on_event: RecorderEventCallback,
    },
    Stop,
    Release,
}

/// Handle to a stream owned by the capture thread
struct CpalStream {
    format: StreamFormat,
    commands: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl CpalStream {
    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                warn!("Capture thread panicked");
            }
        }
    }
}

impl MediaStream for CpalStream {
    fn format(&self) -> StreamFormat {
        self.format
    }

    fn start(
        &mut self,
        encoder: Box<dyn ChunkEncoder>,
        timeslice: Duration,
        on_event: RecorderEventCallback,
    ) -> Result<(), AcquireError> {
        self.commands
            .send(Command::Start {
                encoder,
                timeslice,
                on_event,
            })
            .map_err(|_| AcquireError::Other("capture thread is no longer running".to_string()))
    }

    fn request_stop(&mut self) {
        if self.commands.send(Command::Stop).is_err() {
            debug!("Capture thread already finished");
        }
    }

    fn stop_tracks(&mut self) {
        // The thread may already be gone after `request_stop`
        let _ = self.commands.send(Command::Release);
        self.join();
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        // Detached: the thread drops the device once it sees the release
        let _ = self.commands.send(Command::Release);
    }
}

fn capture_thread(
    constraints: StreamConstraints,
    ready: oneshot::Sender<Result<StreamFormat, AcquireError>>,
    commands: Receiver<Command>,
) {
    let samples = Arc::new(Mutex::new(Vec::<i16>::new()));
    let recording = Arc::new(AtomicBool::new(false));

    let (stream, format) = match open_input(constraints, &samples, &recording) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if ready.send(Ok(format)).is_err() {
        debug!("Microphone request abandoned");
        return;
    }

    let (mut encoder, timeslice, on_event) = match commands.recv() {
        Ok(Command::Start {
            encoder,
            timeslice,
            on_event,
        }) => (encoder, timeslice, on_event),
        _ => return,
    };

    recording.store(true, Ordering::SeqCst);
    let tick = timeslice.as_std().max(std::time::Duration::from_millis(MIN_TIMESLICE_MS));

    loop {
        match commands.recv_timeout(tick) {
            Err(RecvTimeoutError::Timeout) => {
                flush_chunk(&samples, encoder.as_mut(), &on_event);
            }
            Ok(Command::Start { .. }) => warn!("Ignoring start for a running recorder"),
            Ok(Command::Stop) | Ok(Command::Release) | Err(RecvTimeoutError::Disconnected) => {
                break
            }
        }
    }

    recording.store(false, Ordering::SeqCst);
    drop(stream);

    flush_chunk(&samples, encoder.as_mut(), &on_event);
    on_event(RecorderEvent::Stopped);
}

fn flush_chunk(
    samples: &Mutex<Vec<i16>>,
    encoder: &mut dyn ChunkEncoder,
    on_event: &RecorderEventCallback,
) {
    let pending = std::mem::take(&mut *samples.lock());
    let chunk = encoder.encode_chunk(&pending);
    on_event(RecorderEvent::DataAvailable(chunk));
}

fn open_input(
    constraints: StreamConstraints,
    samples: &Arc<Mutex<Vec<i16>>>,
    recording: &Arc<AtomicBool>,
) -> Result<(cpal::Stream, StreamFormat), AcquireError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(AcquireError::NotSupported)?;

    let (config, sample_format) = input_config(&device, constraints)?;
    let device_channels = config.channels;
    let output_channels = output_channels(constraints.channels);
    let format = StreamFormat::new(output_channels, config.sample_rate.0);

    let error_callback = |err: cpal::StreamError| warn!("Audio stream error: {}", err);

    let stream = match sample_format {
        SampleFormat::I16 => {
            let samples = Arc::clone(samples);
            let recording = Arc::clone(recording);
            device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        let frames = remix(data, device_channels, output_channels);
                        samples.lock().extend_from_slice(&frames);
                    }
                },
                error_callback,
                None,
            )
        }
        SampleFormat::F32 => {
            let samples = Arc::clone(samples);
            let recording = Arc::clone(recording);
            device.build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if recording.load(Ordering::SeqCst) {
                        let i16_data: Vec<i16> =
                            data.iter().map(|&s| (s * 32767.0) as i16).collect();
                        let frames = remix(&i16_data, device_channels, output_channels);
                        samples.lock().extend_from_slice(&frames);
                    }
                },
                error_callback,
                None,
            )
        }
        other => {
            return Err(AcquireError::Other(format!(
                "unsupported sample format {:?}",
                other
            )))
        }
    }
    .map_err(|e| classify(e.to_string()))?;

    stream.play().map_err(|e| classify(e.to_string()))?;
    Ok((stream, format))
}

/// Pick the device config closest to the requested channels and rate
fn input_config(
    device: &cpal::Device,
    constraints: StreamConstraints,
) -> Result<(StreamConfig, SampleFormat), AcquireError> {
    let supported = device
        .supported_input_configs()
        .map_err(|e| classify(e.to_string()))?;

    let mut best: Option<SupportedStreamConfigRange> = None;
    for config in supported {
        if config.sample_format() != SampleFormat::I16
            && config.sample_format() != SampleFormat::F32
        {
            continue;
        }
        let is_better = match &best {
            None => true,
            Some(current) => score(&config, constraints) > score(current, constraints),
        };
        if is_better {
            best = Some(config);
        }
    }

    let range = best.ok_or_else(|| AcquireError::Other("no 16-bit or float input config".into()))?;
    let sample_rate = pick_rate(
        range.min_sample_rate().0,
        range.max_sample_rate().0,
        constraints.sample_rate,
    );

    let config = StreamConfig {
        channels: range.channels(),
        sample_rate: SampleRate(sample_rate),
        buffer_size: cpal::BufferSize::Default,
    };
    Ok((config, range.sample_format()))
}

fn score(config: &SupportedStreamConfigRange, constraints: StreamConstraints) -> u8 {
    let mut score = 0;
    if config.channels() == constraints.channels {
        score += 2;
    }
    if (config.min_sample_rate().0..=config.max_sample_rate().0).contains(&constraints.sample_rate)
    {
        score += 1;
    }
    score
}

/// Requested rate if the range allows it, else the nearest bound
fn pick_rate(min: u32, max: u32, requested: u32) -> u32 {
    requested.clamp(min, max.max(min))
}

/// Channels written to the container: the request, limited to mono or stereo
fn output_channels(requested: u16) -> u16 {
    requested.clamp(1, 2)
}

/// Convert interleaved device frames to `to` channels (1 or 2).
///
/// Mono output averages every device channel, stereo output keeps the
/// first two and duplicates a mono device.
fn remix(samples: &[i16], from: u16, to: u16) -> Vec<i16> {
    if from == to {
        return samples.to_vec();
    }
    let from = from.max(1) as usize;

    let mut out = Vec::with_capacity(samples.len() / from * to as usize);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            let sum: i32 = frame.iter().map(|&s| s as i32).sum();
            out.push((sum / from as i32) as i16);
        } else if from == 1 {
            out.extend_from_slice(&[frame[0], frame[0]]);
        } else {
            out.extend_from_slice(&frame[..2]);
        }
    }
    out
}

fn classify(message: String) -> AcquireError {
    let lower = message.to_lowercase();
    if ["permission", "denied", "access"]
        .iter()
        .any(|word| lower.contains(word))
    {
        AcquireError::PermissionDenied
    } else {
        AcquireError::Other(message)
    }
}
