use crate::helpers::{
    RecordingLogger, RecordingObserver, TEST_TIMEOUT, TestServer, TestServerFactory, free_port,
    join_within_timeout,
};

use monitor_core::config::MonitorConfig;
use monitor_core::error::LaunchError;
use monitor_core::launcher::{RunOutcome, run_goal, stop_goal};
use monitor_core::logger::{MonitorLogger, WAITING_FOR_COMMAND};
use monitor_core::monitor::LifecycleState;
use monitor_core::registry::ResourceRegistry;
use monitor_core::resource::MonitorObserver;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::spawn as TokioSpawn;

const SERVER_TYPE: &str = "test-server";

fn registry_for(server: &Arc<TestServer>) -> ResourceRegistry {
    ResourceRegistry::new().with_factory(Box::new(TestServerFactory {
        server: server.clone(),
    }))
}

fn server_config() -> BTreeMap<String, String> {
    BTreeMap::from([
        (String::from("port"), String::from("8080")),
        (String::from("contextPath"), String::from("/app")),
    ])
}

/// **VALUE**: Verifies the run goal configures, launches and can be stopped by the stop goal.
///
/// **WHY THIS MATTERS**: This is the path a build plug-in takes: start the server
/// in the background, run tests, then stop it from a separate goal.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Server properties are applied after `start()`
/// - Daemon mode blocks until the server stops
/// - The stop goal uses a different key or port than the run goal
#[tokio::test]
async fn given_daemon_config_when_running_goal_then_stop_goal_stops_server() {
    // GIVEN: A daemon config and a registry with the test server
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let mut config = MonitorConfig::new("build-key", free_port());
    config.daemon = true;
    let registry = registry_for(&server);

    // WHEN: Running the goal
    let outcome = run_goal(
        &config,
        &registry,
        SERVER_TYPE,
        &server_config(),
        logger.clone(),
        None,
    )
    .await
    .unwrap();

    // THEN: It detaches with the server configured then started
    let handle = match outcome {
        RunOutcome::Detached(handle) => handle,
        RunOutcome::Completed(state) => panic!("Expected a detached run, got {state:?}"),
    };
    assert_eq!(
        server.calls(),
        vec!["configure(contextPath,/app)", "configure(port,8080)", "start"]
    );

    // WHEN: Running the stop goal
    stop_goal(&config, logger.as_ref()).await.unwrap();

    // THEN: The server stops and the run terminates
    assert_eq!(join_within_timeout(handle).await, LifecycleState::Terminated);
    assert_eq!(server.count("stop"), 1);
}

#[tokio::test]
async fn given_foreground_config_when_running_goal_then_completes_after_stop() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let observer = RecordingObserver::new();
    let config = MonitorConfig::new("build-key", free_port());

    let run = {
        let config = config.clone();
        let registry = registry_for(&server);
        let logger: Arc<dyn MonitorLogger> = logger.clone();
        let observer: Arc<dyn MonitorObserver> = observer.clone();
        TokioSpawn(async move {
            run_goal(
                &config,
                &registry,
                SERVER_TYPE,
                &BTreeMap::new(),
                logger,
                Some(observer),
            )
            .await
        })
    };
    logger.wait_for(WAITING_FOR_COMMAND, 1).await;

    stop_goal(&config, logger.as_ref()).await.unwrap();

    let outcome = tokio::time::timeout(TEST_TIMEOUT, run)
        .await
        .expect("Run goal did not finish in time")
        .expect("Run goal panicked")
        .unwrap();
    match outcome {
        RunOutcome::Completed(state) => assert_eq!(state, LifecycleState::Terminated),
        RunOutcome::Detached(_) => panic!("Foreground run must not detach"),
    }
    assert_eq!(observer.stopped_count(), 1);
}

#[tokio::test]
async fn given_unregistered_server_type_when_running_goal_then_returns_registry_error() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let config = MonitorConfig::new("build-key", free_port());

    let result = run_goal(
        &config,
        &registry_for(&server),
        "glassfish",
        &server_config(),
        logger.clone(),
        None,
    )
    .await;

    assert!(matches!(result, Err(LaunchError::Registry(_))));
    assert!(server.calls().is_empty());
}

#[tokio::test]
async fn given_missing_key_when_running_goal_then_returns_config_error_without_touching_server() {
    let server = TestServer::new();
    let logger = RecordingLogger::new();
    let config = MonitorConfig::new("", free_port());

    let result = run_goal(
        &config,
        &registry_for(&server),
        SERVER_TYPE,
        &server_config(),
        logger.clone(),
        None,
    )
    .await;

    assert!(matches!(result, Err(LaunchError::Config(_))));
    assert!(server.calls().is_empty());
    assert!(logger.entries().is_empty());
}

#[tokio::test]
async fn given_missing_port_when_running_stop_goal_then_returns_config_error() {
    let logger = RecordingLogger::new();
    let config = MonitorConfig::new("build-key", 0);

    let result = stop_goal(&config, logger.as_ref()).await;

    assert!(matches!(result, Err(LaunchError::Config(_))));
    assert!(logger.entries().is_empty(), "Nothing should be sent");
}
