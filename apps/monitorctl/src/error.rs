use monitor_core::error::ConfigError;

use common::ErrorLocation;

use thiserror::Error;

/// Errors that stop `monitorctl` before a command is sent.
///
/// Failures while sending are logged by the monitor client and never
/// surface here.
#[derive(Debug, Error)]
pub enum MonitorctlError {
    /// Error from this binary
    #[error("Monitorctl Error: {message} {location}")]
    Monitorctl {
        message: String,
        location: ErrorLocation,
    },

    /// Logging could not be set up
    #[error("Logger Error: {message} {location}")]
    Logger {
        message: String,
        location: ErrorLocation,
    },

    /// Monitor settings are missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}
