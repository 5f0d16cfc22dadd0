use crate::helpers::{
    LogEntry, RecordingLogger, TEST_KEY, TestServer, free_port, join_within_timeout,
    launch_daemon,
};

use monitor_core::logger::{SEND_COMMAND_ERROR, WAITING_FOR_COMMAND, sending_command_message};
use monitor_core::monitor::Monitor;

/// **VALUE**: Verifies sending to a port with no monitor is logged, not raised.
///
/// **WHY THIS MATTERS**: The stop goal runs during build teardown. A monitor that is
/// already gone must not fail the build.
///
/// **BUG THIS CATCHES**: Would catch a client that panics or hangs on connection
/// refused, or that logs the failure more than once after the loopback retry.
#[tokio::test]
async fn given_no_monitor_listening_when_sending_then_logs_single_error() {
    // GIVEN: A port nobody is listening on
    let port = free_port();
    let logger = RecordingLogger::new();

    // WHEN: Sending a command
    Monitor::send_command_once(TEST_KEY, port, "stop", logger.as_ref()).await;

    // THEN: The intent and the failure are both logged
    assert_eq!(
        logger.entries(),
        vec![
            LogEntry::Info(sending_command_message("stop")),
            LogEntry::Error(String::from(SEND_COMMAND_ERROR)),
        ]
    );
}

#[tokio::test]
async fn given_command_spanning_lines_when_sending_then_refused_before_connecting() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;
    logger.wait_for(WAITING_FOR_COMMAND, 1).await;

    // A second line would be smuggled past the one-command-per-session rule.
    monitor.send_command("pause\nstop", logger.as_ref()).await;
    monitor.send_command("pause\r", logger.as_ref()).await;

    assert_eq!(logger.count(SEND_COMMAND_ERROR), 2);
    assert_eq!(logger.count(WAITING_FOR_COMMAND), 1, "No session should have opened");

    monitor.send_command("stop", logger.as_ref()).await;
    join_within_timeout(handle).await;
    assert_eq!(server.calls(), vec!["start", "stop"]);
}

#[tokio::test]
async fn given_running_monitor_when_sending_then_logs_intent_only() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let port = free_port();
    let monitor = Monitor::new(TEST_KEY, port);
    let handle = launch_daemon(&monitor, &server, &logger, None).await;

    monitor.send_command("stop", logger.as_ref()).await;
    join_within_timeout(handle).await;

    assert_eq!(logger.count(&sending_command_message("stop")), 1);
    assert!(logger.errors().is_empty(), "Unexpected errors: {:?}", logger.errors());
}
