use crate::helpers::{
    OBSERVED_STARTED, OBSERVED_STOPPED, RecordingLogger, RecordingObserver, TEST_KEY,
    TEST_TIMEOUT, TestServer, connect_raw, free_port, join_within_timeout, launch_daemon,
};

use monitor_core::logger::{
    INVALID_MONITOR_KEY, MONITOR_RUN_ERROR, MONITOR_SESSION_ERROR, MonitorLogger,
    RECEIVING_COMMAND, START_NOT_CONFIRMED, STOP_NOT_CONFIRMED, WAITING_FOR_COMMAND,
};
use monitor_core::monitor::readiness::RetryPolicy;
use monitor_core::monitor::{LifecycleState, Monitor};
use monitor_core::resource::{ControlledResource, MonitorObserver};

use std::net::TcpListener as StdTcpListener;
use std::time::Duration;

use serial_test::serial;
use socket2::SockRef;
use tokio::io::AsyncWriteExt;
use tokio::spawn as TokioSpawn;
use uuid::Uuid;

/// **VALUE**: Verifies the basic control loop: start, accept `stop`, stop, notify.
///
/// **WHY THIS MATTERS**: This is what a build does around every integration test
/// run. If `stop` is not honoured the build hangs with the server still running.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The monitor does not start the server before accepting commands
/// - `stop` is not dispatched or does not end the loop
/// - The observer is notified more than once, or not at all
#[tokio::test]
#[serial]
async fn given_daemon_monitor_when_stop_sent_then_server_stopped_and_observer_notified() {
    // GIVEN: A daemon monitor on port 10000 with key "test"
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let monitor = Monitor::new(TEST_KEY, 10000);
    let handle = launch_daemon(&monitor, &server, &logger, Some(&observer)).await;

    // WHEN: A client sends "stop" with the right key
    Monitor::send_command_once(TEST_KEY, 10000, "stop", logger.as_ref()).await;

    // THEN: The run terminates after stopping the server exactly once
    let state = join_within_timeout(handle).await;
    assert_eq!(state, LifecycleState::Terminated);
    assert_eq!(server.calls(), vec!["start", "stop"]);
    assert_eq!(observer.started_count(), 1);
    assert_eq!(observer.stopped_count(), 1);
    assert!(logger.errors().is_empty(), "Unexpected errors: {:?}", logger.errors());
}

#[tokio::test]
async fn given_daemon_monitor_when_launched_then_started_notified_before_first_wait() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);

    let handle = launch_daemon(&monitor, &server, &logger, Some(&observer)).await;
    logger.wait_for(WAITING_FOR_COMMAND, 1).await;

    // The launcher returns only after the server reports started.
    assert!(server.is_started());
    assert!(
        logger.position(OBSERVED_STARTED).unwrap() < logger.position(WAITING_FOR_COMMAND).unwrap(),
        "started must fire before the accept loop: {:?}",
        logger.entries()
    );

    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;
    join_within_timeout(handle).await;
}

/// **VALUE**: Verifies a client with the wrong key cannot control the server.
///
/// **WHY THIS MATTERS**: Anything on the machine can connect to the port. The key
/// is the only thing standing between a stray process and stopping the server.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The key comparison is skipped, inverted, or prefix-based
/// - A rejected session ends the loop instead of waiting for the next client
#[tokio::test]
async fn given_wrong_key_when_stop_sent_then_rejected_and_loop_continues() {
    // GIVEN: A running daemon monitor
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, Some(&observer)).await;

    // WHEN: A client with the wrong key sends "stop", then one with the right key
    Monitor::send_command_once("WRONG", port, "stop", logger.as_ref()).await;
    logger.wait_for(INVALID_MONITOR_KEY, 1).await;
    assert_eq!(server.count("stop"), 0, "Wrong key must not stop the server");
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;

    // THEN: Only the second command was honoured
    let state = join_within_timeout(handle).await;
    assert_eq!(state, LifecycleState::Terminated);
    assert_eq!(server.count("stop"), 1);
    assert_eq!(logger.count(INVALID_MONITOR_KEY), 1);
    assert_eq!(observer.stopped_count(), 1);
}

#[tokio::test]
async fn given_key_prefix_when_stop_sent_then_rejected() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let key = Uuid::new_v4().to_string();
    let monitor = Monitor::new(key.as_str(), port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    Monitor::send_command_once(&key[..key.len() - 1], port, "stop", logger.as_ref()).await;
    logger.wait_for(INVALID_MONITOR_KEY, 1).await;
    Monitor::send_command_once(format!("{key} "), port, "stop", logger.as_ref()).await;
    logger.wait_for(INVALID_MONITOR_KEY, 2).await;

    assert_eq!(server.count("stop"), 0);

    Monitor::send_command_once(key.as_str(), port, "stop", logger.as_ref()).await;
    join_within_timeout(handle).await;
}

/// **VALUE**: Verifies configure commands reach the server with name and value intact.
///
/// **BUG THIS CATCHES**: Would catch if repeated commands are deduplicated, or the
/// value is truncated at whitespace.
#[tokio::test]
async fn given_configure_commands_when_sent_then_each_applied_in_order() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    Monitor::send_command_once(TEST_KEY, port, "configure a=1", logger.as_ref()).await;
    Monitor::send_command_once(TEST_KEY, port, "configure a=1", logger.as_ref()).await;
    Monitor::send_command_once(TEST_KEY, port, "configure greeting=hello world", logger.as_ref())
        .await;
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;

    join_within_timeout(handle).await;
    assert_eq!(
        server.calls(),
        vec![
            "start",
            "configure(a,1)",
            "configure(a,1)",
            "configure(greeting,hello world)",
            "stop",
        ]
    );
}

#[tokio::test]
async fn given_pause_and_resume_when_sent_then_dispatched_without_ending_loop() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    Monitor::send_command_once(TEST_KEY, port, "pause", logger.as_ref()).await;
    Monitor::send_command_once(TEST_KEY, port, "resume", logger.as_ref()).await;
    logger.wait_for(WAITING_FOR_COMMAND, 3).await;
    assert!(!handle.is_finished(), "pause/resume must not end the loop");

    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;
    join_within_timeout(handle).await;
    assert_eq!(server.calls(), vec!["start", "pause", "resume", "stop"]);
}

#[tokio::test]
async fn given_unrecognized_command_when_sent_then_ignored() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    Monitor::send_command_once(TEST_KEY, port, "restart", logger.as_ref()).await;
    Monitor::send_command_once(TEST_KEY, port, "STOP", logger.as_ref()).await;
    Monitor::send_command_once(TEST_KEY, port, "", logger.as_ref()).await;
    logger.wait_for(WAITING_FOR_COMMAND, 4).await;

    assert_eq!(server.calls(), vec!["start"]);
    assert!(logger.errors().is_empty(), "Unexpected errors: {:?}", logger.errors());

    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;
    join_within_timeout(handle).await;
}

/// **VALUE**: Verifies a taken port is reported and the server is never started.
///
/// **WHY THIS MATTERS**: Starting a server nobody can stop leaks a process past the
/// end of the build.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - `start()` is called before the bind succeeds
/// - The bind failure is swallowed or panics instead of being logged
/// - The loopback fallback is attempted more than once
#[tokio::test]
async fn given_port_in_use_when_launched_then_bind_fails_without_starting_server() {
    // GIVEN: Another socket holding the port on every interface
    let port = free_port();
    let _occupant = StdTcpListener::bind(("0.0.0.0", port)).expect("Failed to occupy port");
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let monitor = Monitor::new(TEST_KEY, port);

    // WHEN: Launching the monitor
    let handle = launch_daemon(&monitor, &server, &logger, Some(&observer)).await;

    // THEN: The run ends in BindFailed with exactly one error and no server calls
    let state = join_within_timeout(handle).await;
    assert_eq!(state, LifecycleState::BindFailed);
    assert!(state.is_terminal());
    assert!(server.calls().is_empty(), "Server must not be started");
    assert_eq!(logger.errors(), vec![MONITOR_RUN_ERROR]);
    assert_eq!(logger.count(WAITING_FOR_COMMAND), 0);
    assert_eq!(observer.started_count(), 0);
}

/// **VALUE**: Verifies the loop keeps serving commands when readiness is never confirmed.
///
/// **WHY THIS MATTERS**: A server that is slow to report started must still be
/// stoppable, or the build cannot clean up after it.
#[tokio::test]
async fn given_unresponsive_server_when_run_then_logs_unconfirmed_and_still_accepts_stop() {
    let server = TestServer::unresponsive();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let port = free_port();
    let monitor = Monitor::with_retry_policy(TEST_KEY, port, RetryPolicy::new(2, 10));
    let handle = launch_daemon(&monitor, &server, &logger, Some(&observer)).await;

    logger.wait_for(START_NOT_CONFIRMED, 1).await;
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;

    let state = join_within_timeout(handle).await;
    assert_eq!(state, LifecycleState::Terminated);
    assert_eq!(server.calls(), vec!["start", "stop"]);
    assert_eq!(logger.count(STOP_NOT_CONFIRMED), 1);
    assert_eq!(observer.started_count(), 0);
    assert_eq!(observer.stopped_count(), 0);
    assert_eq!(logger.count(OBSERVED_STOPPED), 0);
}

/// **VALUE**: Verifies a host can close the listener without a client.
///
/// **BUG THIS CATCHES**: Would catch an accept loop that cannot be interrupted, which
/// would hang the host on shutdown, or one that stops the server on the way out.
#[tokio::test]
async fn given_running_daemon_when_handle_shutdown_then_terminates_without_stopping_server() {
    // GIVEN: A running daemon monitor
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, Some(&observer)).await;
    logger.wait_for(WAITING_FOR_COMMAND, 1).await;
    assert!(!handle.state().is_terminal());

    // WHEN: The host requests shutdown
    handle.shutdown();

    // THEN: The run ends without a stop call or stopped notification
    let state = join_within_timeout(handle).await;
    assert_eq!(state, LifecycleState::Terminated);
    assert_eq!(server.calls(), vec!["start"]);
    assert_eq!(observer.stopped_count(), 0);

    // The port is released.
    let _rebound = StdTcpListener::bind(("0.0.0.0", port)).expect("Port should be free again");
}

#[tokio::test]
async fn given_foreground_run_when_stop_sent_then_run_returns_terminated() {
    // GIVEN: A foreground run on its own task
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);

    let run = {
        let server = server.clone();
        let logger = logger.clone();
        let observer = observer.clone();
        TokioSpawn(async move {
            monitor
                .run(
                    server.as_ref() as &dyn ControlledResource,
                    logger.as_ref() as &dyn MonitorLogger,
                    Some(observer.as_ref() as &dyn MonitorObserver),
                )
                .await
        })
    };
    logger.wait_for(WAITING_FOR_COMMAND, 1).await;

    // WHEN: A client sends "stop"
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;

    // THEN: run() returns once the server has stopped
    let state = tokio::time::timeout(TEST_TIMEOUT, run)
        .await
        .expect("Foreground run did not finish in time")
        .expect("Foreground run panicked");
    assert_eq!(state, LifecycleState::Terminated);
    assert_eq!(observer.started_count(), 1);
    assert_eq!(observer.stopped_count(), 1);
    assert!(
        logger.position(OBSERVED_STOPPED).unwrap() > logger.position(OBSERVED_STARTED).unwrap(),
        "Log: {:?}",
        logger.entries()
    );
}

#[tokio::test]
async fn given_detached_handle_when_stop_sent_then_run_still_completes() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);

    launch_daemon(&monitor, &server, &logger, Some(&observer))
        .await
        .detach();
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;

    logger.wait_for(OBSERVED_STOPPED, 1).await;
    assert_eq!(server.calls(), vec!["start", "stop"]);
}

/// **VALUE**: Verifies a key line that is not valid UTF-8 is reported as an invalid key.
///
/// **WHY THIS MATTERS**: Every wrong key must produce exactly one invalid-key entry,
/// whatever bytes the client sent, so the build log shows who was turned away.
///
/// **BUG THIS CATCHES**: Would catch a strict UTF-8 reader that turns the session into
/// a generic I/O error, or that lets the `stop` on the next line through.
#[tokio::test]
async fn given_non_utf8_key_line_when_session_received_then_logged_as_invalid_key() {
    // GIVEN: A running daemon monitor
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    // WHEN: A raw client sends a garbled key line followed by "stop"
    let mut stream = connect_raw(port).await;
    stream.write_all(b"\xff\xfewrong\nstop\n").await.unwrap();
    stream.shutdown().await.ok();
    drop(stream);
    logger.wait_for(INVALID_MONITOR_KEY, 1).await;

    // THEN: Rejected as an invalid key and the loop keeps serving
    assert_eq!(server.count("stop"), 0);
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;
    assert_eq!(join_within_timeout(handle).await, LifecycleState::Terminated);
    assert_eq!(logger.count(INVALID_MONITOR_KEY), 1);
    assert_eq!(logger.count(MONITOR_SESSION_ERROR), 0);
    assert_eq!(server.calls(), vec!["start", "stop"]);
}

/// **VALUE**: Verifies broken sessions are logged and the loop keeps serving.
///
/// **WHY THIS MATTERS**: Port scanners and crashed clients connect and vanish. Any one
/// of them ending the loop would leave the server impossible to stop.
///
/// **BUG THIS CATCHES**: Would catch a per-session read error that escapes the accept
/// loop, or a reset connection that is treated as `stop`.
#[tokio::test]
async fn given_broken_sessions_when_received_then_loop_keeps_serving() {
    // GIVEN: A running daemon monitor
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    // WHEN: One client hangs up silently
    drop(connect_raw(port).await);
    logger.wait_for(WAITING_FOR_COMMAND, 2).await;

    // AND: Another resets its connection while the monitor is reading
    let reset = connect_raw(port).await;
    logger.wait_for(RECEIVING_COMMAND, 2).await;
    SockRef::from(&reset).set_linger(Some(Duration::ZERO)).unwrap();
    drop(reset);
    logger.wait_for(WAITING_FOR_COMMAND, 3).await;

    // THEN: Each was logged once and "stop" still works
    assert_eq!(
        logger.errors(),
        vec![INVALID_MONITOR_KEY, MONITOR_SESSION_ERROR],
        "Log: {:?}",
        logger.entries()
    );
    assert_eq!(server.calls(), vec!["start"]);

    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;
    assert_eq!(join_within_timeout(handle).await, LifecycleState::Terminated);
    assert_eq!(server.count("stop"), 1);
}
