// Unit tests for logger module initialization logic
// Tests focus on idempotence and error handling

use crate::error::MonitorctlError;
use crate::logger::{LOG_FILE_NAME, build_dispatch, initialize};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: A host embedding the binary's library may initialize logging
/// from more than one path. A second call must not crash it.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed,
/// causing fern to fail when trying to set a global logger twice.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let result1 = initialize(temp_dir.path());
    let result2 = initialize(temp_dir.path());

    // THEN: Both should return Ok (second one logs warning but doesn't error)
    assert!(result1.is_ok(), "First initialization should succeed");
    assert!(
        result2.is_ok(),
        "Second initialization should succeed (idempotent)"
    );
}

#[test]
fn given_writable_dir_when_building_dispatch_then_creates_log_file() {
    let temp_dir = TempDir::new().unwrap();

    let result = build_dispatch(temp_dir.path());

    assert!(result.is_ok());
    assert!(temp_dir.path().join(LOG_FILE_NAME).exists());
}

/// **VALUE**: Verifies that an unusable log directory is an error, not a panic.
///
/// **BUG THIS CATCHES**: Would catch if `fern::log_file()` is unwrapped instead of
/// mapped into [`MonitorctlError::Logger`].
#[test]
fn given_invalid_log_dir_when_building_dispatch_then_returns_logger_error() {
    // GIVEN: A path under a file, which can never be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN: Building the dispatch
    let result = build_dispatch(&invalid_dir);

    // THEN: A Logger error naming the file
    match result {
        Err(MonitorctlError::Logger { message, .. }) => {
            assert!(message.contains(LOG_FILE_NAME), "Message: {message}");
        }
        Err(other) => panic!("Expected Logger error, got {other:?}"),
        Ok(_) => panic!("Expected Logger error, got a dispatch"),
    }
}
