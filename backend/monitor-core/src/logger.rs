//! Diagnostics sink for the control channel.
//!
//! Every failure the monitor handles surfaces here and nowhere else: the
//! protocol boundary never returns transport errors to its caller.

use std::error::Error as StdError;

use log::{error, info};

pub const WAITING_FOR_COMMAND: &str = "Waiting for command from client";
pub const RECEIVING_COMMAND: &str = "Receiving command from client";
pub const INVALID_MONITOR_KEY: &str = "Invalid monitor key";
pub const MONITOR_SESSION_ERROR: &str = "Error in the monitor";
pub const MONITOR_RUN_ERROR: &str = "Error starting or stopping the monitor";
pub const SEND_COMMAND_ERROR: &str = "Error sending command to monitor";
pub const START_NOT_CONFIRMED: &str = "Server did not report started within the retry budget";
pub const STOP_NOT_CONFIRMED: &str = "Server did not report stopped within the retry budget";

/// Builds the informational message logged before a command is sent.
pub fn sending_command_message(command: &str) -> String {
    format!("Sending command \"{command}\" to monitor")
}

/// Logger collaborator used for all protocol diagnostics.
pub trait MonitorLogger: Send + Sync {
    fn log_info(&self, message: &str);

    fn log_error(&self, message: &str);

    fn log_error_with_cause(&self, message: &str, cause: &(dyn StdError + 'static));
}

/// Forwards monitor diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl MonitorLogger for LogFacade {
    fn log_info(&self, message: &str) {
        info!("{message}");
    }

    fn log_error(&self, message: &str) {
        error!("{message}");
    }

    fn log_error_with_cause(&self, message: &str, cause: &(dyn StdError + 'static)) {
        error!("{message}: {cause}");
    }
}
