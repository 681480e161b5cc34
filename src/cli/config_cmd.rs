//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, VALID_BITRATES_KBPS};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    apply_config_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match config_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = config_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

/// Read a key from the config as display text
fn config_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "duration" => config.duration.clone(),
        "timeout" => config.timeout.clone(),
        "bitrate" => config.bitrate.map(|b| b.to_string()),
        "sample_rate" => config.sample_rate.map(|r| r.to_string()),
        "channels" => config.channels.map(|c| c.to_string()),
        "chunk_interval" => config.chunk_interval.clone(),
        "output_dir" => config.output_dir.clone(),
        _ => None,
    }
}

/// Validate `value` for `key` and store it in the config
fn apply_config_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    match key {
        "duration" | "timeout" | "chunk_interval" => {
            let parsed = value
                .parse::<Duration>()
                .map_err(|e| invalid(e.to_string()))?;
            if parsed.as_millis() == 0 {
                return Err(invalid("Value must be greater than zero".to_string()));
            }
            let slot = match key {
                "duration" => &mut config.duration,
                "timeout" => &mut config.timeout,
                _ => &mut config.chunk_interval,
            };
            *slot = Some(value.to_string());
        }
        "bitrate" => {
            let kbps = value
                .parse::<u32>()
                .ok()
                .filter(|b| VALID_BITRATES_KBPS.contains(b))
                .ok_or_else(|| invalid(format!("Valid bitrates (kbps): {}", bitrate_list())))?;
            config.bitrate = Some(kbps);
        }
        "sample_rate" => {
            let rate = value
                .parse::<u32>()
                .ok()
                .filter(|r| *r > 0)
                .ok_or_else(|| invalid("Value must be a positive number of Hz".to_string()))?;
            config.sample_rate = Some(rate);
        }
        "channels" => {
            let channels = value
                .parse::<u16>()
                .ok()
                .filter(|c| (1..=2).contains(c))
                .ok_or_else(|| invalid("Value must be 1 or 2".to_string()))?;
            config.channels = Some(channels);
        }
        "output_dir" => {
            if value.trim().is_empty() {
                return Err(invalid("Value must not be empty".to_string()));
            }
            config.output_dir = Some(value.to_string());
        }
        _ => return Err(invalid("Unknown key".to_string())),
    }
    Ok(())
}

fn bitrate_list() -> String {
    VALID_BITRATES_KBPS
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
