//! Monitor configuration: file, environment overrides and validation.
//!
//! The settings mirror the properties a host plug-in exposes for the monitor:
//! the shared key, the port, the readiness retry policy and daemon mode.
//! Values are read from `{config_dir}/monitor.json` and then overridden from
//! `MONITOR_*` environment variables.

use crate::error::config::ConfigError;
use crate::monitor::{Monitor, RetryPolicy};
use crate::{DEFAULT_RETRY_COUNT, DEFAULT_RETRY_INTERVAL_MS};

use common::{ErrorLocation, MonitorKey};

use std::panic::Location;
use std::path::Path;

use const_format::concatcp;
use log::{debug, info};
use serde::{Deserialize, Deserializer};

const CONFIG_FILE_NAME: &str = "monitor.json";
const ENV_PREFIX: &str = "MONITOR_";

pub const ENV_KEY: &str = concatcp!(ENV_PREFIX, "KEY");
pub const ENV_PORT: &str = concatcp!(ENV_PREFIX, "PORT");
pub const ENV_RETRY_COUNT: &str = concatcp!(ENV_PREFIX, "RETRY_COUNT");
pub const ENV_RETRY_INTERVAL: &str = concatcp!(ENV_PREFIX, "RETRY_INTERVAL");
pub const ENV_DAEMON: &str = concatcp!(ENV_PREFIX, "DAEMON");
/// Directory holding `monitor.json`, read by hosts that locate the file themselves.
pub const ENV_CONFIG_DIR: &str = concatcp!(ENV_PREFIX, "CONFIG_DIR");

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Shared key clients must present. Required.
    #[serde(default, deserialize_with = "deserialize_key")]
    pub key: MonitorKey,

    /// Port the monitor listens on. Required.
    #[serde(default)]
    pub port: u16,

    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Milliseconds between readiness checks.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,

    /// Run the monitor on a background task.
    #[serde(default)]
    pub daemon: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            key: MonitorKey::default(),
            port: 0,
            retry_count: default_retry_count(),
            retry_interval: default_retry_interval(),
            daemon: false,
        }
    }
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<MonitorKey, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(MonitorKey::from)
}

fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}
fn default_retry_interval() -> u64 {
    DEFAULT_RETRY_INTERVAL_MS
}

impl MonitorConfig {
    pub fn new(key: impl Into<MonitorKey>, port: u16) -> Self {
        Self {
            key: key.into(),
            port,
            ..Self::default()
        }
    }

    /// Load config from `{config_dir}/monitor.json`.
    ///
    /// A missing file yields defaults, which still need a key and port from
    /// the environment before they validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Monitor config not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            })?;

        let config: MonitorConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        info!("Monitor config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Load from file, apply process environment overrides, then validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on read, parse, override or validation failure.
    pub fn resolve(config_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(config_dir)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override settings from `lookup`, typically the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::OverrideError`] if a numeric or boolean variable
    /// does not parse.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = lookup(ENV_KEY) {
            debug!("Monitor key overridden from {ENV_KEY}");
            self.key = MonitorKey::from(key);
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = parse_override(ENV_PORT, &port)?;
        }
        if let Some(count) = lookup(ENV_RETRY_COUNT) {
            self.retry_count = parse_override(ENV_RETRY_COUNT, &count)?;
        }
        if let Some(interval) = lookup(ENV_RETRY_INTERVAL) {
            self.retry_interval = parse_override(ENV_RETRY_INTERVAL, &interval)?;
        }
        if let Some(daemon) = lookup(ENV_DAEMON) {
            self.daemon = parse_override(ENV_DAEMON, &daemon)?;
        }
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_empty() {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("Monitor key is required"),
            });
        }

        if self.port == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: String::from("Monitor port is required"),
            });
        }

        if self.retry_count == 0 {
            return Err(ConfigError::ValidationError {
                location: ErrorLocation::from(Location::caller()),
                reason: format!("Invalid retry count: {} (must be at least 1)", self.retry_count),
            });
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, self.retry_interval)
    }

    /// Build the monitor these settings describe.
    pub fn monitor(&self) -> Monitor {
        Monitor::with_retry_policy(self.key.clone(), self.port, self.retry_policy())
    }
}

fn parse_override<T>(variable: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::OverrideError {
        location: ErrorLocation::from(Location::caller()),
        variable: variable.to_string(),
        reason: format!("'{raw}': {e}"),
    })
}
