use crate::error::config::ConfigError;
use crate::error::registry::RegistryError;

use thiserror::Error as ThisError;

/// Failures that prevent a run goal from reaching the monitor at all.
///
/// Once the monitor is running, failures are reported through the
/// [`MonitorLogger`](crate::logger::MonitorLogger) instead.
#[derive(Debug, ThisError)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
