use crate::protocol::command::Command;

use common::MonitorKey;

use thiserror::Error as ThisError;

/// The first line of a session did not match the monitor key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
#[error("invalid monitor key")]
pub struct AuthFailure;

/// Decode the two lines of a session.
///
/// A missing key line (the client hung up immediately) is an authentication
/// failure. A missing command line after a valid key decodes to
/// [`Command::Continue`].
pub fn decode(
    key_line: Option<&str>,
    command_line: Option<&str>,
    expected_key: &MonitorKey,
) -> Result<Command, AuthFailure> {
    match key_line {
        Some(key) if expected_key.matches(key) => {
            Ok(command_line.map_or(Command::Continue, Command::parse))
        }
        _ => Err(AuthFailure),
    }
}

/// Encode the payload a client writes: key line then command line, each
/// newline-terminated.
///
/// No escaping is performed; `command` must not contain a newline.
pub fn encode(key: &MonitorKey, command: &str) -> String {
    let mut payload = String::with_capacity(key.len() + command.len() + 2);
    payload.push_str(key.as_str());
    payload.push('\n');
    payload.push_str(command);
    payload.push('\n');
    payload
}
