use std::fmt::{Display, Formatter, Result as FormatResult};
use std::sync::OnceLock;

use regex::Regex;

const CONFIGURE_PATTERN: &str = r"^configure(?-u:\s)+(?P<name>[A-Za-z0-9_]+)=(?P<value>.*)$";
const CONFIGURE_CAPTURE_NAME: &str = "name";
const CONFIGURE_CAPTURE_VALUE: &str = "value";

const PAUSE: &str = "pause";
const RESUME: &str = "resume";
const STOP: &str = "stop";

static CONFIGURE_REGEX: OnceLock<Regex> = OnceLock::new();

pub(crate) fn get_configure_regex() -> &'static Regex {
    CONFIGURE_REGEX.get_or_init(|| Regex::new(CONFIGURE_PATTERN).expect("valid regex pattern"))
}

/// A decoded control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set server property `name` to `value`. The value may be empty.
    Configure { name: String, value: String },
    Pause,
    Resume,
    /// Stop the server and end the accept loop.
    Stop,
    /// Unrecognized command line; ignored.
    Continue,
}

impl Command {
    /// Classify one command line.
    ///
    /// Only exact, full-line matches are recognized: `"stop "` or `"STOP"` are
    /// [`Command::Continue`].
    pub fn parse(line: &str) -> Self {
        if let Some(caps) = get_configure_regex().captures(line) {
            let name = caps.name(CONFIGURE_CAPTURE_NAME);
            let value = caps.name(CONFIGURE_CAPTURE_VALUE);
            if let (Some(name), Some(value)) = (name, value) {
                return Command::Configure {
                    name: name.as_str().to_string(),
                    value: value.as_str().to_string(),
                };
            }
        }

        match line {
            PAUSE => Command::Pause,
            RESUME => Command::Resume,
            STOP => Command::Stop,
            _ => Command::Continue,
        }
    }

    /// Whether dispatching this command ends the accept loop.
    pub fn terminates_loop(&self) -> bool {
        matches!(self, Command::Stop)
    }
}

impl Display for Command {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Command::Configure { name, value } => write!(formatter, "configure {name}={value}"),
            Command::Pause => formatter.write_str(PAUSE),
            Command::Resume => formatter.write_str(RESUME),
            Command::Stop => formatter.write_str(STOP),
            Command::Continue => Ok(()),
        }
    }
}
