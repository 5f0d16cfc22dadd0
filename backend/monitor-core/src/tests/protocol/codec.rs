// Unit tests for the two-line session codec

use crate::protocol::{AuthFailure, Command, decode, encode};

use common::MonitorKey;

/// **VALUE**: Verifies encode-then-decode preserves the command classification.
///
/// **WHY THIS MATTERS**: The client and listener live in different processes (often
/// different plug-in invocations). If the wire text produced for a command does not
/// decode back to the same command, `stop` could become a silent no-op.
#[test]
fn given_typed_commands_when_encoded_and_decoded_then_classification_is_preserved() {
    // GIVEN: Keys and commands covering every variant
    let keys = vec!["test", "with spaces", "ключ", "a=b"];
    let commands = vec![
        Command::Configure {
            name: String::from("debug"),
            value: String::from("off"),
        },
        Command::Configure {
            name: String::from("empty"),
            value: String::new(),
        },
        Command::Pause,
        Command::Resume,
        Command::Stop,
        Command::Continue,
    ];

    for raw_key in keys {
        let key = MonitorKey::new(raw_key);
        for command in &commands {
            // WHEN: Encoding and splitting on newlines as the listener reads it
            let payload = encode(&key, &command.to_string());
            let mut lines = payload.lines();
            let decoded = decode(lines.next(), lines.next(), &key);

            // THEN: The decoded command matches the original
            assert_eq!(decoded, Ok(command.clone()), "Round trip failed for {command:?}");
        }
    }
}

#[test]
fn given_payload_when_encoded_then_is_key_line_then_command_line() {
    let key = MonitorKey::new("test");

    assert_eq!(encode(&key, "stop"), "test\nstop\n");
}

/// **BUG THIS CATCHES**: Would catch a decoder that ignores the key line when the
/// command looks valid, letting any local process stop the server.
#[test]
fn given_wrong_key_when_decoded_then_returns_auth_failure() {
    let key = MonitorKey::new("test");

    assert_eq!(decode(Some("WRONG"), Some("stop"), &key), Err(AuthFailure));
    assert_eq!(decode(Some("TEST"), Some("stop"), &key), Err(AuthFailure));
    assert_eq!(decode(Some(""), Some("stop"), &key), Err(AuthFailure));
}

#[test]
fn given_missing_lines_when_decoded_then_handles_gracefully() {
    let key = MonitorKey::new("test");

    // Client hung up before sending anything
    assert_eq!(decode(None, None, &key), Err(AuthFailure));
    // Valid key, no command line
    assert_eq!(decode(Some("test"), None, &key), Ok(Command::Continue));
}
