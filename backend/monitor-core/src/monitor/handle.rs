//! Handle to a monitor running in daemon mode.

use crate::error::monitor::MonitorError;
use crate::monitor::lifecycle::LifecycleState;

use common::ErrorLocation;

use std::panic::Location;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Handle to a monitor running on a background task.
///
/// The task runs the full lifecycle, including both observer callbacks,
/// whether or not anyone joins it.
///
/// # Lifecycle
///
/// - [`join`](Self::join) waits for the run to finish
/// - [`shutdown`](Self::shutdown) closes the listener from outside
/// - [`detach`](Self::detach) (or dropping the handle) lets the task run on;
///   shutdown can no longer be requested afterwards
pub struct MonitorHandle {
    task: JoinHandle<LifecycleState>,
    shutdown: watch::Sender<bool>,
    state: watch::Receiver<LifecycleState>,
}

impl MonitorHandle {
    pub(crate) fn new(
        task: JoinHandle<LifecycleState>,
        shutdown: watch::Sender<bool>,
        state: watch::Receiver<LifecycleState>,
    ) -> Self {
        Self {
            task,
            shutdown,
            state,
        }
    }

    /// Current lifecycle state of the background run.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Close the listener and abandon any readiness wait in progress.
    ///
    /// The resource is not stopped; the run ends in
    /// [`LifecycleState::Terminated`] without a `stopped` notification.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Wait for the background run to finish.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Join`] if the task panicked or was cancelled.
    pub async fn join(self) -> Result<LifecycleState, MonitorError> {
        self.task.await.map_err(|e| MonitorError::Join {
            message: format!("Monitor task failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    pub fn detach(self) {}
}
