use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RegistryError {
    #[error("Unknown Server Error: {message} {location}")]
    UnknownServer {
        message: String,
        location: ErrorLocation,
    },
}
