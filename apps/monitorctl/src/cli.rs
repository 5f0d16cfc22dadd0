//! Command-line interface for sending one command to a running monitor.

use std::fmt;
use std::path::PathBuf;

use clap::Parser;

/// Sent when no command words are given.
pub const DEFAULT_COMMAND: &str = "stop";

/// Send a control command to a running monitor.
#[derive(Parser)]
#[command(name = "monitorctl", version)]
pub struct Cli {
    /// Directory holding `monitor.json`. Defaults to `MONITOR_CONFIG_DIR`,
    /// then `<user config dir>/monitor`.
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
    /// Directory for `monitorctl.log`. Defaults to the config directory.
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
    /// Overrides the configured monitor key.
    #[arg(long)]
    pub key: Option<String>,
    /// Overrides the configured monitor port.
    #[arg(long)]
    pub port: Option<u16>,
    /// Command words, for example `configure port=8080`.
    #[arg(
        value_name = "COMMAND",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl fmt::Debug for Cli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("config_dir", &self.config_dir)
            .field("log_dir", &self.log_dir)
            .field("key", &self.key.as_ref().map(|_| "[REDACTED]"))
            .field("port", &self.port)
            .field("command", &self.command)
            .finish()
    }
}

impl Cli {
    /// The command line to send: the words joined by single spaces, or
    /// [`DEFAULT_COMMAND`].
    pub fn command_line(&self) -> String {
        if self.command.is_empty() {
            DEFAULT_COMMAND.to_string()
        } else {
            self.command.join(" ")
        }
    }
}
