//! mic2mp3 CLI entry point

use std::process::ExitCode;

use clap::Parser;

use mic2mp3::cli::{
    app::{
        default_recording_path, encode_options, load_merged_config, parse_duration_setting,
        run_convert, run_inspect, run_record, EXIT_ERROR, EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands, EncodeArgs, RecordOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use mic2mp3::domain::audio::StreamFormat;
use mic2mp3::domain::config::AppConfig;
use mic2mp3::domain::recording::Duration;
use mic2mp3::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Inspect { input } => run_inspect(&input).await,
        Commands::Convert {
            input,
            output,
            encode,
        } => {
            let config = load_merged_config(encode_config(encode)).await;
            let options = match encode_options(&config) {
                Ok(options) => options,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            run_convert(&input, output, options).await
        }
        Commands::Record {
            duration,
            output,
            keep_wav,
            channels,
            sample_rate,
            encode,
        } => {
            let cli_config = AppConfig {
                duration,
                channels,
                sample_rate,
                ..encode_config(encode)
            };
            let config = load_merged_config(cli_config).await;

            let encode = match encode_options(&config) {
                Ok(options) => options,
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };

            let duration = match parse_duration_setting("duration", config.duration.as_deref()) {
                Ok(d) => d.unwrap_or_else(Duration::default_duration),
                Err(e) => {
                    presenter.error(&e);
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };

            if let Some(c) = config.channels.filter(|c| !(1..=2).contains(c)) {
                presenter.error(&format!("Invalid channels: {} (expected 1 or 2)", c));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }

            let options = RecordOptions {
                duration,
                output: output.unwrap_or_else(|| default_recording_path(config.output_dir())),
                keep_wav,
                preferred: StreamFormat::new(
                    config.channels_or_default(),
                    config.sample_rate_or_default(),
                ),
                chunk_interval: config.chunk_interval_or_default(),
                encode,
            };

            run_record(options).await
        }
    }
}

/// Command-line encoding flags as a config layer
fn encode_config(encode: EncodeArgs) -> AppConfig {
    AppConfig {
        bitrate: encode.bitrate,
        timeout: encode.timeout,
        ..Default::default()
    }
}

/// `warn` by default, `info` with --verbose; RUST_LOG wins when set
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
