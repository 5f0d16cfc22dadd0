//! The state machine that drives one monitor run.
//!
//! ```text
//! Binding ──► BindFailed
//!    │
//!    ▼
//! Starting ──► AwaitingStart ──► Running ──► Stopping ──► AwaitingStop ──► Terminated
//!                                   │                                         ▲
//!                                   └──────────── shutdown ───────────────────┘
//! ```
//!
//! The accept loop always runs once `start()` has been issued. Readiness only
//! decides whether the observer is notified.

use crate::logger::{MONITOR_RUN_ERROR, MonitorLogger, START_NOT_CONFIRMED, STOP_NOT_CONFIRMED};
use crate::monitor::Monitor;
use crate::monitor::listener::{LoopExit, bind_monitor, run_accept_loop};
use crate::monitor::readiness::{Readiness, wait_for_start, wait_for_stop};
use crate::monitor::shutdown::ShutdownSignal;
use crate::resource::{ControlledResource, MonitorObserver};

use log::debug;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Binding,
    /// The port could not be bound on either address. Terminal.
    BindFailed,
    Starting,
    AwaitingStart,
    Running,
    Stopping,
    AwaitingStop,
    Terminated,
}

impl LifecycleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::BindFailed | LifecycleState::Terminated)
    }
}

/// Publishes state transitions to anyone holding a receiver.
pub(crate) struct Lifecycle {
    state: watch::Sender<LifecycleState>,
}

impl Lifecycle {
    pub(crate) fn new() -> (Self, watch::Receiver<LifecycleState>) {
        let (state, receiver) = watch::channel(LifecycleState::Binding);
        (Self { state }, receiver)
    }

    fn enter(&self, next: LifecycleState) -> LifecycleState {
        let previous = self.state.send_replace(next);
        debug!("Monitor lifecycle: {previous:?} -> {next:?}");
        next
    }
}

pub(crate) async fn orchestrate(
    monitor: &Monitor,
    resource: &dyn ControlledResource,
    logger: &dyn MonitorLogger,
    observer: Option<&dyn MonitorObserver>,
    lifecycle: &Lifecycle,
    shutdown: &mut ShutdownSignal,
) -> LifecycleState {
    lifecycle.enter(LifecycleState::Binding);

    let listener = match bind_monitor(monitor.port()).await {
        Ok(listener) => listener,
        Err(e) => {
            logger.log_error_with_cause(MONITOR_RUN_ERROR, &e);
            return lifecycle.enter(LifecycleState::BindFailed);
        }
    };

    lifecycle.enter(LifecycleState::Starting);
    resource.start();

    lifecycle.enter(LifecycleState::AwaitingStart);
    match wait_for_start(resource, monitor.retry_policy(), shutdown).await {
        Readiness::Ready => {
            if let Some(observer) = observer {
                observer.started(resource, logger);
            }
        }
        Readiness::NotReady => logger.log_error(START_NOT_CONFIRMED),
        Readiness::Interrupted => {}
    }

    lifecycle.enter(LifecycleState::Running);
    let exit = run_accept_loop(&listener, monitor.key(), resource, logger, shutdown).await;
    drop(listener);

    if exit == LoopExit::Shutdown {
        return lifecycle.enter(LifecycleState::Terminated);
    }

    // The stop command has already been dispatched to the resource.
    lifecycle.enter(LifecycleState::Stopping);

    lifecycle.enter(LifecycleState::AwaitingStop);
    match wait_for_stop(resource, monitor.retry_policy(), shutdown).await {
        Readiness::Ready => {
            if let Some(observer) = observer {
                observer.stopped(resource, logger);
            }
        }
        Readiness::NotReady => logger.log_error(STOP_NOT_CONFIRMED),
        Readiness::Interrupted => {}
    }

    lifecycle.enter(LifecycleState::Terminated)
}
