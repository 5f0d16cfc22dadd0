pub mod config;
pub mod launch;
pub mod monitor;
pub mod registry;

pub use config::ConfigError;
pub use launch::LaunchError;
pub use monitor::MonitorError;
pub use registry::RegistryError;
