//! Capabilities the monitor consumes from the server it controls.

use crate::logger::MonitorLogger;

/// A long-running server whose lifecycle is driven by a monitor.
///
/// `start` and `stop` may return before the server has actually changed state;
/// the monitor polls [`is_started`](Self::is_started) and
/// [`is_stopped`](Self::is_stopped) to find out when it has.
///
/// The monitor never calls these methods concurrently from its dispatch loop,
/// but implementations are shared behind an `Arc` and must use interior
/// mutability for any state they change.
pub trait ControlledResource: Send + Sync {
    /// Set a server property.
    fn configure(&self, name: &str, value: &str);

    fn start(&self);

    fn stop(&self);

    fn pause(&self);

    fn resume(&self);

    fn is_started(&self) -> bool;

    fn is_stopped(&self) -> bool;
}

/// Receives notifications when a monitored server has started or stopped.
///
/// Each callback fires at most once per monitor run, `started` before the
/// first command is dispatched and `stopped` after the `stop` command.
pub trait MonitorObserver: Send + Sync {
    fn started(&self, resource: &dyn ControlledResource, logger: &dyn MonitorLogger);

    fn stopped(&self, resource: &dyn ControlledResource, logger: &dyn MonitorLogger);
}
