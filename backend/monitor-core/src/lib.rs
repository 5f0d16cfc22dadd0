//! Control-channel protocol for long-running servers hosted inside another
//! program.
//!
//! A [`Monitor`](monitor::Monitor) binds a local TCP port, starts a
//! [`ControlledResource`](resource::ControlledResource), and then accepts one
//! authenticated command per connection until a `stop` arrives. The matching
//! client side ([`Monitor::send_command`](monitor::Monitor::send_command))
//! writes the two-line payload and hangs up.

pub mod config;
pub mod error;
pub mod launcher;
pub mod logger;
pub mod monitor;
pub mod protocol;
pub mod registry;
pub mod resource;

#[cfg(test)]
mod tests;

/// Retry count used when none is configured.
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Interval between readiness checks, in milliseconds, when none is configured.
pub const DEFAULT_RETRY_INTERVAL_MS: u64 = 500;
/// Hostname used when binding or connecting to the resolved local host fails.
pub const LOOPBACK_HOSTNAME: &str = "localhost";
/// Pending connection queue length for the listening socket.
pub const MONITOR_BACKLOG: u32 = 1;
