//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for persisting the user's recording and encoding preferences
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load the stored config; a missing file yields an empty config
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Write the config, creating parent directories as needed
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write the default config. Fails if a file is already there.
    async fn init(&self) -> Result<(), ConfigError>;
}
