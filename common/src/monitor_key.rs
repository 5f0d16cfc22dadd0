//! The shared secret that guards the monitor's control channel.

use crate::{ErrorLocation, RedactError};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

/// A monitor key that never exposes its value in logs or debug output.
///
/// The key is immutable once constructed. Comparison against the first line a
/// client sends is exact (no trimming, no case folding).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct MonitorKey {
    inner: String,
}

impl MonitorKey {
    /// Create a monitor key from a pre-agreed secret.
    pub fn new(key: impl Into<String>) -> Self {
        Self { inner: key.into() }
    }

    /// Get the actual key value for transmission.
    ///
    /// # Security Note
    /// Only call this when writing the key line to the monitor socket.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Check whether a received key line matches this key exactly.
    #[inline]
    pub fn matches(&self, candidate: &str) -> bool {
        self.inner == candidate
    }

    /// Get the key length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<&str> for MonitorKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for MonitorKey {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

impl fmt::Debug for MonitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MonitorKey([REDACTED])")
    }
}

impl fmt::Display for MonitorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED MONITOR KEY]")
    }
}

impl Drop for MonitorKey {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// Prevent accidental serialization
impl serde::Serialize for MonitorKey {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::Serialization {
            message: String::from("MonitorKey cannot be serialized - use as_str() explicitly"),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
