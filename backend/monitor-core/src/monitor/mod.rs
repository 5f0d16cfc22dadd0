//! The monitor: listener, sender and lifecycle orchestration.

mod address;
mod client;
mod handle;
pub(crate) mod lifecycle;
pub(crate) mod listener;
pub mod readiness;
mod shutdown;

pub use handle::MonitorHandle;
pub use lifecycle::LifecycleState;
pub use readiness::{Readiness, RetryPolicy};
pub use shutdown::ShutdownSignal;

use crate::logger::{MonitorLogger, SEND_COMMAND_ERROR, sending_command_message};
use crate::resource::{ControlledResource, MonitorObserver};

use lifecycle::{Lifecycle, orchestrate};

use common::MonitorKey;

use std::sync::Arc;

use log::debug;
use tokio::spawn as TokioSpawn;

/// Controls a server through a key-protected TCP command channel.
///
/// The key and port are fixed for the lifetime of the monitor.
#[derive(Debug, Clone)]
pub struct Monitor {
    key: MonitorKey,
    port: u16,
    retry_policy: RetryPolicy,
}

impl Monitor {
    /// Create a monitor with the default retry policy.
    pub fn new(key: impl Into<MonitorKey>, port: u16) -> Self {
        Self::with_retry_policy(key, port, RetryPolicy::default())
    }

    pub fn with_retry_policy(
        key: impl Into<MonitorKey>,
        port: u16,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            key: key.into(),
            port,
            retry_policy,
        }
    }

    pub fn key(&self) -> &MonitorKey {
        &self.key
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Run the monitor in the foreground.
    ///
    /// Binds the port, starts `resource`, then dispatches commands until a
    /// `stop` arrives. Returns the terminal lifecycle state; failures are
    /// reported only through `logger`.
    pub async fn run(
        &self,
        resource: &dyn ControlledResource,
        logger: &dyn MonitorLogger,
        observer: Option<&dyn MonitorObserver>,
    ) -> LifecycleState {
        let (lifecycle, _state) = Lifecycle::new();
        let mut shutdown = ShutdownSignal::never();

        orchestrate(self, resource, logger, observer, &lifecycle, &mut shutdown).await
    }

    /// Run the monitor on a background task.
    ///
    /// Returns once the port is bound (or binding has failed) and a
    /// best-effort wait for the resource to report started has finished.
    pub async fn run_daemon(
        &self,
        resource: Arc<dyn ControlledResource>,
        logger: Arc<dyn MonitorLogger>,
        observer: Option<Arc<dyn MonitorObserver>>,
    ) -> MonitorHandle {
        let (lifecycle, mut state) = Lifecycle::new();
        let (shutdown_tx, shutdown) = ShutdownSignal::channel();
        let mut launcher_shutdown = shutdown.clone();

        let monitor = self.clone();
        let task_resource = Arc::clone(&resource);
        let task = TokioSpawn(async move {
            let mut shutdown = shutdown;
            orchestrate(
                &monitor,
                task_resource.as_ref(),
                logger.as_ref(),
                observer.as_deref(),
                &lifecycle,
                &mut shutdown,
            )
            .await
        });

        let bound = state
            .wait_for(|current| *current != LifecycleState::Binding)
            .await
            .map(|current| *current != LifecycleState::BindFailed)
            .unwrap_or(false);

        if bound {
            let readiness = readiness::wait_for_start(
                resource.as_ref(),
                &self.retry_policy,
                &mut launcher_shutdown,
            )
            .await;
            debug!("Daemon monitor launched, start readiness: {readiness:?}");
        }

        MonitorHandle::new(task, shutdown_tx, state)
    }

    /// Send one command to a running monitor.
    ///
    /// Never fails: connection and write errors are logged through `logger`.
    pub async fn send_command(&self, command: &str, logger: &dyn MonitorLogger) {
        logger.log_info(&sending_command_message(command));

        if let Err(e) = client::deliver(&self.key, self.port, command).await {
            logger.log_error_with_cause(SEND_COMMAND_ERROR, &e);
        }
    }

    /// Send one command using a throwaway monitor built from `key` and `port`.
    pub async fn send_command_once(
        key: impl Into<MonitorKey>,
        port: u16,
        command: &str,
        logger: &dyn MonitorLogger,
    ) {
        Monitor::new(key, port).send_command(command, logger).await;
    }
}
