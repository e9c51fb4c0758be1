use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local directory holding config and the database
pub const CONFIG_DIR: &str = ".stepsync";

/// Upper bound for day-count windows reaching back from now
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid pull_page_size: {0}. Must be at least 1")]
    InvalidPullPageSize(usize),

    #[error("Invalid max_range_days: {0}. Must be at least 1")]
    InvalidMaxRangeDays(u32),

    #[error("Invalid weight_lookup_timeout_ms: {0}. Must be positive")]
    InvalidWeightLookupTimeout(u64),

    #[error("Invalid pull_lookback_days: {0}. Must be between 1 and {MAX_LOOKBACK_DAYS}")]
    InvalidPullLookbackDays(u32),

    #[error("Invalid retention_days: {0}. Must be at most {MAX_LOOKBACK_DAYS}")]
    InvalidRetentionDays(u32),

    #[error("Invalid server port: {0}")]
    InvalidServerPort(u16),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .stepsync/config.yaml (project config, created by init)
    /// 3. .stepsync/local.yaml (project local overrides, optional)
    /// 4. Environment variables (STEPSYNC_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Load configuration rooted at `dir` instead of the working directory
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("STEPSYNC_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(
                config.logging.rotation.clone(),
            ));
        }

        if config.logging.retention_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::InvalidRetentionDays(
                config.logging.retention_days,
            ));
        }

        if config.sync.pull_page_size == 0 {
            return Err(ConfigError::InvalidPullPageSize(config.sync.pull_page_size));
        }

        if config.sync.max_range_days == 0 {
            return Err(ConfigError::InvalidMaxRangeDays(config.sync.max_range_days));
        }

        if config.sync.pull_lookback_days == 0 || config.sync.pull_lookback_days > MAX_LOOKBACK_DAYS {
            return Err(ConfigError::InvalidPullLookbackDays(
                config.sync.pull_lookback_days,
            ));
        }

        if config.sync.weight_lookup_timeout_ms == 0 {
            return Err(ConfigError::InvalidWeightLookupTimeout(
                config.sync.weight_lookup_timeout_ms,
            ));
        }

        if config.server.port == 0 {
            return Err(ConfigError::InvalidServerPort(config.server.port));
        }

        Ok(())
    }
}
