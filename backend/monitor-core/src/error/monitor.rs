use common::ErrorLocation;

use std::io::Error as IoError;
use std::panic::Location;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum MonitorError {
    #[error("Bind Error: {message} {location}")]
    Bind {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Resolve Error: {message} {location}")]
    Resolve {
        message: String,
        location: ErrorLocation,
    },

    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Read Error: {message} {location}")]
    Read {
        message: String,
        location: ErrorLocation,
    },

    #[error("Write Error: {message} {location}")]
    Write {
        message: String,
        location: ErrorLocation,
    },

    #[error("Join Error: {message} {location}")]
    Join {
        message: String,
        location: ErrorLocation,
    },

    #[error("IO Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
    },
}

impl MonitorError {
    /// True when the failure is specific to the chosen address, so a retry
    /// against the loopback host may succeed.
    pub fn is_address_specific(&self) -> bool {
        use std::io::ErrorKind::{AddrInUse, AddrNotAvailable, ConnectionRefused};

        match self {
            MonitorError::Resolve { .. } => true,
            MonitorError::Bind { source, .. } => {
                matches!(source.kind(), AddrInUse | AddrNotAvailable)
            }
            MonitorError::Connect { source, .. } => {
                matches!(source.kind(), ConnectionRefused | AddrNotAvailable)
            }
            _ => false,
        }
    }
}

impl From<IoError> for MonitorError {
    #[track_caller]
    fn from(error: IoError) -> Self {
        MonitorError::Io {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
