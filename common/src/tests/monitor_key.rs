// Unit tests for the monitor key wrapper
// The key guards the control channel, so leaks through Debug/serde are bugs

use crate::MonitorKey;

/// **VALUE**: Verifies the key never appears in `Debug` or `Display` output.
///
/// **WHY THIS MATTERS**: Monitors log their configuration and errors freely. A key
/// that leaks into a build log lets anyone on the host stop the controlled server.
#[test]
fn given_monitor_key_when_formatted_then_value_is_redacted() {
    // GIVEN: A key with a recognizable value
    let key = MonitorKey::new("super-secret");

    // WHEN: Formatting it both ways
    let debug = format!("{key:?}");
    let display = format!("{key}");

    // THEN: Neither output contains the secret
    assert!(!debug.contains("super-secret"), "Debug leaked key: {debug}");
    assert!(!display.contains("super-secret"), "Display leaked key: {display}");
}

/// **VALUE**: Verifies key comparison is exact.
///
/// **BUG THIS CATCHES**: Would catch a "helpful" trim or case-insensitive compare that
/// accepts `"TEST"` or `"test "` for a monitor configured with `"test"`.
#[test]
fn given_monitor_key_when_matching_candidates_then_only_exact_value_matches() {
    let key = MonitorKey::from("test");

    assert!(key.matches("test"));
    assert!(!key.matches("TEST"));
    assert!(!key.matches("test "));
    assert!(!key.matches(""));
}

#[test]
fn given_monitor_key_when_serialized_then_returns_error() {
    let key = MonitorKey::new("super-secret");

    let result = serde_json::to_string(&key);

    assert!(result.is_err(), "MonitorKey must refuse serialization");
}

#[test]
fn given_default_key_then_empty() {
    let key = MonitorKey::default();

    assert!(key.is_empty());
    assert_eq!(key.len(), 0);
}
