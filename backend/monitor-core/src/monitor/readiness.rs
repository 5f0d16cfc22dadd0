//! Bounded waits for a server's asynchronous start and stop.
//!
//! `start()` and `stop()` on a [`ControlledResource`] may return before the
//! server has changed state. These helpers only observe: they poll the
//! predicate and never call `start` or `stop` themselves.
//!
//! # Policy
//!
//! Both waits check the predicate at most `count` times in total. The first
//! check happens immediately; every later check is preceded by a sleep of
//! `interval`. A shutdown request during a sleep abandons the wait.

use crate::monitor::shutdown::ShutdownSignal;
use crate::resource::ControlledResource;
use crate::{DEFAULT_RETRY_COUNT, DEFAULT_RETRY_INTERVAL_MS};

use std::time::Duration;

use backoff::backoff::{Backoff, Constant};
use log::{debug, trace};
use tokio::time::sleep as TokioSleep;

/// How many times, and how often, readiness is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    count: u32,
    interval: Duration,
}

impl RetryPolicy {
    /// A `count` of zero is treated as one: the predicate is always checked.
    pub fn new(count: u32, interval_ms: u64) -> Self {
        Self {
            count: count.max(1),
            interval: Duration::from_millis(interval_ms),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_COUNT, DEFAULT_RETRY_INTERVAL_MS)
    }
}

/// Outcome of a readiness wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    /// The retry budget ran out.
    NotReady,
    /// Shutdown was requested while sleeping between checks.
    Interrupted,
}

impl Readiness {
    pub fn is_ready(self) -> bool {
        self == Readiness::Ready
    }
}

/// Wait for [`ControlledResource::is_started`] to report `true`.
pub async fn wait_for_start(
    resource: &dyn ControlledResource,
    policy: &RetryPolicy,
    shutdown: &mut ShutdownSignal,
) -> Readiness {
    wait_until(|| resource.is_started(), policy, shutdown, "started").await
}

/// Wait for [`ControlledResource::is_stopped`] to report `true`.
pub async fn wait_for_stop(
    resource: &dyn ControlledResource,
    policy: &RetryPolicy,
    shutdown: &mut ShutdownSignal,
) -> Readiness {
    wait_until(|| resource.is_stopped(), policy, shutdown, "stopped").await
}

async fn wait_until(
    mut predicate: impl FnMut() -> bool,
    policy: &RetryPolicy,
    shutdown: &mut ShutdownSignal,
    condition: &str,
) -> Readiness {
    if predicate() {
        return Readiness::Ready;
    }

    let mut backoff = Constant::new(policy.interval());
    let retries = policy.count() - 1;

    for attempt in 1..=retries {
        let delay = backoff.next_backoff().unwrap_or(policy.interval());
        trace!("Server not {condition}, retry {attempt}/{retries} after {delay:?}");

        tokio::select! {
            () = TokioSleep(delay) => {}
            () = shutdown.requested() => {
                debug!("Wait for server {condition} interrupted by shutdown");
                return Readiness::Interrupted;
            }
        }

        if predicate() {
            return Readiness::Ready;
        }
    }

    debug!("Server not {condition} after {} checks", policy.count());
    Readiness::NotReady
}
