//! Command runners for record, convert and inspect

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use colored::*;
use log::{debug, warn};
use tokio::fs;
use tokio::sync::mpsc;

use crate::application::ports::{ConfigStore, StreamConstraints};
use crate::application::{
    CaptureCallbacks, CaptureSession, CaptureSettings, ConvertCallbacks, Mp3Converter,
    TranscodeError, TranscodePipeline,
};
use crate::domain::audio::{AudioBlob, ContentKind};
use crate::domain::config::{AppConfig, VALID_BITRATES_KBPS};
use crate::domain::container::{self, wav};
use crate::domain::recording::Duration;
use crate::infrastructure::{CpalMicrophone, LameEncoderFactory, XdgConfigStore};

use super::args::{EncodeOptions, RecordOptions};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How long to wait for the recorder's final chunk after stopping
const FINAL_CHUNK_WAIT_MS: u64 = 2000;

/// Record from the microphone, then encode to MP3
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let shutdown = ShutdownSignal::new();
    shutdown.setup();

    let (blob_tx, mut blob_rx) = mpsc::unbounded_channel();
    let callbacks = CaptureCallbacks::new(move |blob| {
        if blob_tx.send(blob).is_err() {
            warn!("Recording finished after the command gave up on it");
        }
    })
    .on_not_supported(|| {
        eprintln!(
            "{} No audio input device is available on this system",
            "⚠".yellow()
        );
    })
    .on_no_permission(|| {
        eprintln!(
            "{} Grant this terminal access to the microphone and try again",
            "⚠".yellow()
        );
    })
    .on_state_change(|state| debug!("Capture session is {}", state));

    let settings = CaptureSettings {
        constraints: StreamConstraints {
            channels: options.preferred.channels,
            sample_rate: options.preferred.sample_rate,
        },
        timeslice: options.chunk_interval,
    };
    let session = CaptureSession::new(CpalMicrophone::new(), settings, callbacks);

    if let Err(e) = session.start().await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let total_ms = options.duration.as_millis();
    let started = Instant::now();
    let mut ticker = tokio::time::interval(std::time::Duration::from_millis(100));
    presenter.start_spinner("Recording...");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let elapsed = started.elapsed().as_millis() as u64;
                presenter.update_recording_progress(elapsed.min(total_ms), total_ms);
                if elapsed >= total_ms {
                    break;
                }
            }
            _ = shutdown.wait() => {
                debug!("Recording interrupted");
                break;
            }
        }
    }

    if let Err(e) = session.stop().await {
        presenter.spinner_fail(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let wait = std::time::Duration::from_millis(FINAL_CHUNK_WAIT_MS);
    let blob = match tokio::time::timeout(wait, blob_rx.recv()).await {
        Ok(Some(blob)) => blob,
        _ => {
            presenter.spinner_fail("No audio was captured");
            return ExitCode::from(EXIT_ERROR);
        }
    };
    presenter.spinner_success(&format!("Recorded {}", blob.human_readable_size()));

    let mut wav_bytes = blob.into_bytes();
    if let Err(e) = wav::patch_sizes(&mut wav_bytes) {
        presenter.error(&format!("Captured audio is not a valid WAV: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    if let Some(ref path) = options.keep_wav {
        if let Err(e) = write_file(path, &wav_bytes).await {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
        presenter.info(&format!("Saved WAV to {}", path.display()));
    }

    encode_and_write(
        &mut presenter,
        AudioBlob::pcm(wav_bytes),
        &options.output,
        options.encode,
    )
    .await
}

/// Transcode a WAV file to MP3
pub async fn run_convert(input: &Path, output: Option<PathBuf>, encode: EncodeOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let bytes = match fs::read(input).await {
        Ok(bytes) => bytes,
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", input.display(), e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let output = output.unwrap_or_else(|| input.with_extension(ContentKind::Mp3Container.extension()));
    encode_and_write(&mut presenter, AudioBlob::pcm(bytes), &output, encode).await
}

/// Print the header of a WAV file
pub async fn run_inspect(input: &Path) -> ExitCode {
    let presenter = Presenter::new();

    let bytes = match fs::read(input).await {
        Ok(bytes) => bytes,
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", input.display(), e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let header = match container::parse_header(&bytes) {
        Ok(header) => header,
        Err(e) => {
            presenter.error(&format!("Malformed PCM container: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let len = bytes.len();
    presenter.key_value("format", &header.format().to_string());
    presenter.key_value("channels", &header.channel_count.to_string());
    presenter.key_value("sample_rate", &header.sample_rate.to_string());
    presenter.key_value("data_offset", &header.data_offset.to_string());
    presenter.key_value("frames", &header.frame_count(len).to_string());
    presenter.key_value(
        "duration",
        &Duration::from_millis(header.duration_ms(len)).to_string(),
    );
    presenter.key_value("trailing_bytes", &header.trailing_bytes(len).to_string());

    ExitCode::from(EXIT_SUCCESS)
}

async fn encode_and_write(
    presenter: &mut Presenter,
    blob: AudioBlob,
    output: &Path,
    encode: EncodeOptions,
) -> ExitCode {
    let converter = Mp3Converter::new(
        TranscodePipeline::new(LameEncoderFactory::new())
            .with_bitrate(encode.bitrate_kbps)
            .with_timeout(encode.timeout),
        ConvertCallbacks {
            on_complete: Some(Box::new(|mp3: &AudioBlob| {
                debug!("Encoded {}", mp3.human_readable_size())
            })),
            on_error: Some(Box::new(|e: &TranscodeError| warn!("Encoding failed: {}", e))),
        },
    );

    presenter.start_spinner(&format!("Encoding MP3 at {} kbps...", encode.bitrate_kbps));
    let mp3 = match converter.convert(blob).await {
        Ok(mp3) => mp3,
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    if let Err(e) = write_file(output, mp3.bytes()).await {
        presenter.spinner_fail(&e);
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.spinner_success(&format!("Encoded MP3 ({})", mp3.human_readable_size()));
    presenter.output(&output.to_string_lossy());
    ExitCode::from(EXIT_SUCCESS)
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    fs::write(path, bytes)
        .await
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

/// Resolve encoding options from merged config
pub fn encode_options(config: &AppConfig) -> Result<EncodeOptions, String> {
    let bitrate_kbps = match config.bitrate {
        Some(kbps) if !VALID_BITRATES_KBPS.contains(&kbps) => {
            return Err(format!("Unsupported bitrate: {} kbps", kbps));
        }
        Some(kbps) => kbps,
        None => config.bitrate_or_default(),
    };

    let timeout = parse_duration_setting("timeout", config.timeout.as_deref())?
        .unwrap_or_else(Duration::default_timeout);

    Ok(EncodeOptions {
        bitrate_kbps,
        timeout,
    })
}

/// Parse an optional duration setting, naming the setting on failure
pub fn parse_duration_setting(name: &str, value: Option<&str>) -> Result<Option<Duration>, String> {
    value
        .map(|s| {
            s.parse::<Duration>()
                .map_err(|e| format!("Invalid {}: {}", name, e))
        })
        .transpose()
}

/// Default MP3 path for a new recording
pub fn default_recording_path(output_dir: Option<&str>) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    PathBuf::from(output_dir.unwrap_or(".")).join(format!(
        "recording-{}.{}",
        stamp,
        ContentKind::Mp3Container.extension()
    ))
}

/// Load and merge configuration from file and CLI.
///
/// Environment variables reach the CLI layer through clap, so the
/// effective order is defaults < file < env < command line.
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config file {}: {}", store.path().display(), e);
            AppConfig::empty()
        }
    };

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_options_use_defaults() {
        let options = encode_options(&AppConfig::empty()).unwrap();
        assert_eq!(options.bitrate_kbps, 256);
        assert_eq!(options.timeout.as_secs(), 60);
    }

    #[test]
    fn encode_options_reject_unsupported_bitrate() {
        let config = AppConfig {
            bitrate: Some(100),
            ..Default::default()
        };
        assert!(encode_options(&config).is_err());
    }

    #[test]
    fn encode_options_reject_bad_timeout() {
        let config = AppConfig {
            timeout: Some("soon".to_string()),
            ..Default::default()
        };
        let err = encode_options(&config).unwrap_err();
        assert!(err.contains("timeout"));
    }

    #[test]
    fn parse_duration_setting_passes_none_through() {
        assert_eq!(parse_duration_setting("duration", None), Ok(None));
        assert_eq!(
            parse_duration_setting("duration", Some("2s")),
            Ok(Some(Duration::from_secs(2)))
        );
    }

    #[test]
    fn default_recording_path_uses_output_dir() {
        let path = default_recording_path(Some("/tmp/takes"));
        assert!(path.starts_with("/tmp/takes"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("mp3"));
    }
}
