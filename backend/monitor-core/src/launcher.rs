//! Run and stop goals: the glue a host plug-in calls.

use crate::config::MonitorConfig;
use crate::error::launch::LaunchError;
use crate::logger::MonitorLogger;
use crate::monitor::{LifecycleState, MonitorHandle};
use crate::registry::ResourceRegistry;
use crate::resource::MonitorObserver;

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};

const STOP_COMMAND: &str = "stop";

/// Result of a run goal.
pub enum RunOutcome {
    /// Foreground run finished in this state.
    Completed(LifecycleState),
    /// Daemon run is still going on a background task.
    Detached(MonitorHandle),
}

/// Create a server of type `server_type`, apply `server_config` through
/// `configure`, and run it under a monitor.
///
/// # Errors
///
/// Returns [`LaunchError`] if the config is invalid or the server type is not
/// registered. Failures after that point are logged, not returned.
pub async fn run_goal(
    config: &MonitorConfig,
    registry: &ResourceRegistry,
    server_type: &str,
    server_config: &BTreeMap<String, String>,
    logger: Arc<dyn MonitorLogger>,
    observer: Option<Arc<dyn MonitorObserver>>,
) -> Result<RunOutcome, LaunchError> {
    config.validate()?;
    let resource = registry.create(server_type)?;

    for (name, value) in server_config {
        debug!("Configuring {server_type} property '{name}'");
        resource.configure(name, value);
    }

    let monitor = config.monitor();
    info!("Running {server_type} under monitor on port {}", monitor.port());

    if config.daemon {
        let handle = monitor.run_daemon(resource, logger, observer).await;
        return Ok(RunOutcome::Detached(handle));
    }

    let state = monitor
        .run(resource.as_ref(), logger.as_ref(), observer.as_deref())
        .await;
    Ok(RunOutcome::Completed(state))
}

/// Send `stop` to the monitor described by `config`.
///
/// # Errors
///
/// Returns [`LaunchError`] only if the config is invalid; delivery failures
/// are logged.
pub async fn stop_goal(
    config: &MonitorConfig,
    logger: &dyn MonitorLogger,
) -> Result<(), LaunchError> {
    config.validate()?;
    config.monitor().send_command(STOP_COMMAND, logger).await;
    Ok(())
}
