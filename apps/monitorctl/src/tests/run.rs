// Unit tests for settings resolution

use crate::cli::Cli;
use crate::error::MonitorctlError;
use crate::run::{resolve_config_dir, resolve_settings};

use monitor_core::config::{ENV_CONFIG_DIR, ENV_KEY, ENV_PORT};
use monitor_core::error::ConfigError;

use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

#[test]
fn given_cli_config_dir_when_resolving_then_wins_over_environment() {
    let dir = resolve_config_dir(Some(Path::new("/from/cli")), |_| {
        Some(String::from("/from/env"))
    })
    .unwrap();

    assert_eq!(dir, PathBuf::from("/from/cli"));
}

#[test]
fn given_environment_config_dir_when_resolving_then_used() {
    let dir = resolve_config_dir(None, |name| {
        (name == ENV_CONFIG_DIR).then(|| String::from("/from/env"))
    })
    .unwrap();

    assert_eq!(dir, PathBuf::from("/from/env"));
}

/// **VALUE**: Verifies command-line values override both file and environment.
///
/// **WHY THIS MATTERS**: An operator stopping a stray monitor by hand should not
/// have to edit `monitor.json` or export variables to target it.
#[test]
fn given_file_env_and_cli_values_when_resolving_settings_then_cli_wins() {
    // GIVEN: A config file, an env override for the port, and a CLI key
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("monitor.json"),
        r#"{ "key": "from-file", "port": 9000 }"#,
    )
    .unwrap();
    let cli = Cli::parse_from(["monitorctl", "--key", "from-cli"]);

    // WHEN: Resolving settings
    let config = resolve_settings(&cli, temp_dir.path(), |name| {
        (name == ENV_PORT).then(|| String::from("9001"))
    })
    .unwrap();

    // THEN: Key from the command line, port from the environment
    assert!(config.key.matches("from-cli"));
    assert_eq!(config.port, 9001);
}

#[test]
fn given_no_file_and_env_values_when_resolving_settings_then_valid() {
    let temp_dir = TempDir::new().unwrap();
    let cli = Cli::parse_from(["monitorctl"]);

    let config = resolve_settings(&cli, temp_dir.path(), |name| match name {
        n if n == ENV_KEY => Some(String::from("env-key")),
        n if n == ENV_PORT => Some(String::from("10000")),
        _ => None,
    })
    .unwrap();

    assert!(config.key.matches("env-key"));
    assert_eq!(config.port, 10000);
}

#[test]
fn given_no_key_anywhere_when_resolving_settings_then_returns_validation_error() {
    let temp_dir = TempDir::new().unwrap();
    let cli = Cli::parse_from(["monitorctl", "--port", "10000"]);

    let result = resolve_settings(&cli, temp_dir.path(), |_| None);

    assert!(matches!(
        result,
        Err(MonitorctlError::Config(ConfigError::ValidationError { .. }))
    ));
}
