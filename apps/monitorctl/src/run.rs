//! Resolve settings, initialize logging and send the command.

use crate::cli::Cli;
use crate::error::MonitorctlError;
use crate::logger::initialize as LoggerInitialize;

use monitor_core::config::{ENV_CONFIG_DIR, MonitorConfig};
use monitor_core::logger::LogFacade;

use common::{ErrorLocation, MonitorKey};

use std::fs::create_dir_all;
use std::panic::Location;
use std::path::{Path, PathBuf};

use log::info;

/// Subdirectory of the user config dir used when nothing else is given.
const CONFIG_SUBDIR: &str = "monitor";

/// Pick the config directory: command line, then `MONITOR_CONFIG_DIR`, then
/// `<user config dir>/monitor`.
///
/// # Errors
///
/// Returns [`MonitorctlError::Monitorctl`] if none of those is available.
pub fn resolve_config_dir(
    cli_dir: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<PathBuf, MonitorctlError> {
    cli_dir
        .map(Path::to_path_buf)
        .or_else(|| lookup(ENV_CONFIG_DIR).map(PathBuf::from))
        .or_else(|| dirs::config_dir().map(|dir| dir.join(CONFIG_SUBDIR)))
        .ok_or_else(|| MonitorctlError::Monitorctl {
            message: String::from("No configuration directory available"),
            location: ErrorLocation::from(Location::caller()),
        })
}

/// Load `monitor.json`, apply environment overrides, then command-line
/// overrides, and validate the result.
///
/// # Errors
///
/// Returns [`MonitorctlError::Config`] if the file is unreadable or the
/// resulting settings are invalid.
pub fn resolve_settings(
    cli: &Cli,
    config_dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<MonitorConfig, MonitorctlError> {
    let mut config = MonitorConfig::load(config_dir)?;
    config.apply_overrides(lookup)?;

    if let Some(key) = &cli.key {
        config.key = MonitorKey::from(key.as_str());
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    config.validate()?;
    Ok(config)
}

/// Run one `monitorctl` invocation against the process environment.
///
/// # Errors
///
/// Returns [`MonitorctlError`] if settings or logging cannot be set up.
/// Delivery failures are logged, not returned.
pub async fn execute(cli: &Cli) -> Result<(), MonitorctlError> {
    let env = |name: &str| std::env::var(name).ok();

    let config_dir = resolve_config_dir(cli.config_dir.as_deref(), env)?;
    let log_dir = cli.log_dir.clone().unwrap_or_else(|| config_dir.clone());

    create_dir_all(&log_dir).map_err(|e| MonitorctlError::Logger {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
    })?;
    LoggerInitialize(&log_dir)?;

    info!("Config directory: {}", config_dir.display());
    let config = resolve_settings(cli, &config_dir, env)?;

    config
        .monitor()
        .send_command(&cli.command_line(), &LogFacade)
        .await;
    Ok(())
}
