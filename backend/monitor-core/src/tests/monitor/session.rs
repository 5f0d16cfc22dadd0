// Unit tests for line decoding on the listener side

use crate::monitor::listener::decode_line;
use crate::protocol::{AuthFailure, decode};

use common::MonitorKey;

#[test]
fn given_terminated_lines_when_decoding_then_strips_lf_and_crlf() {
    assert_eq!(decode_line(b"test\n"), "test");
    assert_eq!(decode_line(b"test\r\n"), "test");
    assert_eq!(decode_line(b"test"), "test", "Last line may be unterminated");
    assert_eq!(decode_line(b"\n"), "");
}

/// **VALUE**: Verifies a key line that is not UTF-8 is an auth failure, not an I/O error.
///
/// **WHY THIS MATTERS**: Every wrong key must be reported as an invalid key, whatever
/// bytes the client sent.
///
/// **BUG THIS CATCHES**: Would catch a strict UTF-8 read that turns garbage into a
/// session error and skips the invalid-key entry.
#[test]
fn given_non_utf8_key_line_when_decoded_then_auth_failure() {
    // GIVEN: A key line with invalid UTF-8 bytes
    let key = MonitorKey::new("wrong");
    let key_line = decode_line(b"\xff\xfewrong\n");

    // WHEN: Decoding the session
    let result = decode(Some(&key_line), Some("stop"), &key);

    // THEN: Rejected as an invalid key
    assert_eq!(result, Err(AuthFailure));
    assert!(key_line.ends_with("wrong"));
}
