// Unit tests for readiness polling
// The orchestrator-level behaviour is covered in integration_tests/monitor/lifecycle.rs

use crate::monitor::readiness::{Readiness, RetryPolicy, wait_for_start, wait_for_stop};
use crate::monitor::ShutdownSignal;
use crate::tests::support::RecordingResource;
use crate::{DEFAULT_RETRY_COUNT, DEFAULT_RETRY_INTERVAL_MS};

use std::time::{Duration, Instant};

/// **VALUE**: Verifies an already-started resource is reported ready without sleeping.
///
/// **WHY THIS MATTERS**: Most servers start synchronously. Sleeping anyway would add
/// the retry interval to every build that uses the monitor.
///
/// **BUG THIS CATCHES**: Would catch a loop that sleeps before the first check.
#[tokio::test]
async fn given_started_resource_when_waiting_for_start_then_returns_ready_without_sleeping() {
    // GIVEN: A resource that is already started and a very long interval
    let resource = RecordingResource::started();
    let policy = RetryPolicy::new(3, 10_000);
    let mut shutdown = ShutdownSignal::never();

    // WHEN: Waiting for start
    let begun = Instant::now();
    let readiness = wait_for_start(&resource, &policy, &mut shutdown).await;

    // THEN: Ready after a single check and no sleep
    assert_eq!(readiness, Readiness::Ready);
    assert_eq!(resource.started_checks(), 1);
    assert!(begun.elapsed() < Duration::from_secs(5), "Should not have slept");
}

/// **VALUE**: Verifies the retry budget is exactly `count` checks.
///
/// **BUG THIS CATCHES**: Would catch the off-by-one where the loop either checks
/// `count - 1` times or never re-checks after sleeping.
#[tokio::test]
async fn given_never_started_resource_when_waiting_for_start_then_fails_after_count_checks() {
    // GIVEN: A resource that never reports started
    let resource = RecordingResource::never_ready();
    let policy = RetryPolicy::new(4, 5);
    let mut shutdown = ShutdownSignal::never();

    // WHEN: Waiting for start
    let readiness = wait_for_start(&resource, &policy, &mut shutdown).await;

    // THEN: Not ready after exactly four checks
    assert_eq!(readiness, Readiness::NotReady);
    assert_eq!(resource.started_checks(), 4);
}

#[tokio::test]
async fn given_slow_starting_resource_when_waiting_for_start_then_returns_on_first_true_check() {
    let resource = RecordingResource::started_on_check(2);
    let policy = RetryPolicy::new(5, 5);
    let mut shutdown = ShutdownSignal::never();

    let readiness = wait_for_start(&resource, &policy, &mut shutdown).await;

    assert_eq!(readiness, Readiness::Ready);
    assert_eq!(resource.started_checks(), 2, "Should stop polling once started");
}

#[tokio::test]
async fn given_interval_when_retrying_then_sleeps_between_checks() {
    let resource = RecordingResource::never_ready();
    let policy = RetryPolicy::new(3, 50);
    let mut shutdown = ShutdownSignal::never();

    let begun = Instant::now();
    let readiness = wait_for_start(&resource, &policy, &mut shutdown).await;

    assert_eq!(readiness, Readiness::NotReady);
    assert!(
        begun.elapsed() >= Duration::from_millis(100),
        "Two sleeps of 50ms expected, took {:?}",
        begun.elapsed()
    );
}

/// **VALUE**: Verifies a shutdown request aborts the wait instead of retrying.
///
/// **WHY THIS MATTERS**: A host shutting down must not be held up for the full retry
/// budget by a server that will never start.
#[tokio::test]
async fn given_shutdown_requested_when_waiting_then_returns_interrupted() {
    // GIVEN: A never-ready resource, a long interval, and a pending shutdown
    let resource = RecordingResource::never_ready();
    let policy = RetryPolicy::new(3, 10_000);
    let (trigger, mut shutdown) = ShutdownSignal::channel();
    trigger.send_replace(true);

    // WHEN: Waiting for start
    let readiness = wait_for_start(&resource, &policy, &mut shutdown).await;

    // THEN: Interrupted after the single immediate check
    assert_eq!(readiness, Readiness::Interrupted);
    assert_eq!(resource.started_checks(), 1);
}

#[tokio::test]
async fn given_stopped_resource_when_waiting_for_stop_then_checks_once() {
    let resource = RecordingResource::started();
    let policy = RetryPolicy::new(3, 10_000);
    let mut shutdown = ShutdownSignal::never();

    let readiness = wait_for_stop(&resource, &policy, &mut shutdown).await;

    assert!(readiness.is_ready());
    assert_eq!(resource.stopped_checks(), 1);
}

#[tokio::test]
async fn given_never_stopped_resource_when_waiting_for_stop_then_fails_after_count_checks() {
    let resource = RecordingResource::never_ready();
    let policy = RetryPolicy::new(3, 5);
    let mut shutdown = ShutdownSignal::never();

    let readiness = wait_for_stop(&resource, &policy, &mut shutdown).await;

    assert_eq!(readiness, Readiness::NotReady);
    assert_eq!(resource.stopped_checks(), 3);
    assert!(resource.calls().is_empty(), "Polling must not call start/stop");
}

#[test]
fn given_zero_count_when_building_policy_then_checks_at_least_once() {
    let policy = RetryPolicy::new(0, 10);

    assert_eq!(policy.count(), 1);
    assert_eq!(policy.interval(), Duration::from_millis(10));
}

#[test]
fn given_default_policy_then_uses_documented_defaults() {
    let policy = RetryPolicy::default();

    assert_eq!(policy.count(), DEFAULT_RETRY_COUNT);
    assert_eq!(policy.interval(), Duration::from_millis(DEFAULT_RETRY_INTERVAL_MS));
}

#[tokio::test]
async fn given_dropped_trigger_when_checking_shutdown_then_never_requested() {
    let (trigger, shutdown) = ShutdownSignal::channel();
    assert!(!shutdown.is_requested());

    drop(trigger);

    assert!(!shutdown.is_requested());
    let mut shutdown = shutdown;
    let fired = tokio::time::timeout(Duration::from_millis(50), shutdown.requested()).await;
    assert!(fired.is_err(), "A dropped trigger must not fire shutdown");
}
