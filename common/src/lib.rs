//! Shared leaf types for the monitor workspace.
//!
//! This crate holds the small types every other crate needs and that carry
//! no protocol logic of their own:
//!
//! - [`ErrorLocation`] - source location captured for every error variant
//! - [`MonitorKey`] - the shared secret a client must present to the monitor
//!
//! ## Architecture
//!
//! - **common** (this crate): Leaf types
//! - **monitor-core**: Control-channel protocol and lifecycle orchestration
//! - **monitorctl**: Command-line sender wiring everything together

pub mod error;
pub mod monitor_key;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use monitor_key::MonitorKey;

#[cfg(test)]
mod tests;
