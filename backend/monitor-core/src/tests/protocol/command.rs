// Unit tests for command-line classification

use crate::protocol::Command;
use crate::protocol::command::get_configure_regex;

/// **VALUE**: Verifies the configure grammar splits name and value correctly.
///
/// **WHY THIS MATTERS**: `configure` is how a build pushes settings into a running
/// server. A wrong split silently sets the wrong property.
///
/// **BUG THIS CATCHES**: Would catch a non-greedy or mis-anchored regex that cuts the
/// value at the first `=` or space.
#[test]
fn given_configure_lines_when_parsed_then_extracts_name_and_value() {
    // GIVEN: Configure lines with various value shapes
    let cases = vec![
        ("configure debug=off", "debug", "off"),
        ("configure  port=8080", "port", "8080"),
        ("configure\tname=", "name", ""),
        ("configure url=http://host/a=b", "url", "http://host/a=b"),
        ("configure greeting=hello world ", "greeting", "hello world "),
        ("configure snake_case_1=x", "snake_case_1", "x"),
    ];

    // WHEN/THEN: Each parses to the expected Configure command
    for (line, name, value) in cases {
        assert_eq!(
            Command::parse(line),
            Command::Configure {
                name: name.to_string(),
                value: value.to_string(),
            },
            "Unexpected parse for: {line}"
        );
    }
}

#[test]
fn given_exact_keywords_when_parsed_then_maps_to_lifecycle_commands() {
    assert_eq!(Command::parse("pause"), Command::Pause);
    assert_eq!(Command::parse("resume"), Command::Resume);
    assert_eq!(Command::parse("stop"), Command::Stop);
}

/// **VALUE**: Verifies near-miss lines fall through to `Continue`.
///
/// **BUG THIS CATCHES**: Would catch prefix or case-insensitive matching that lets
/// `"stopping"` or `"STOP"` terminate the monitor.
#[test]
fn given_unrecognized_lines_when_parsed_then_returns_continue() {
    let cases = vec![
        "",
        "STOP",
        "stop ",
        " stop",
        "stopping",
        "Pause",
        "configure",
        "configure =value",
        "configure a-b=1",
        "configurex a=1",
        "configure name",
        // Only ASCII whitespace separates the keyword from the assignment
        "configure\u{a0}a=1",
        "configure\u{2003}a=1",
        "hello",
    ];

    for line in cases {
        assert_eq!(
            Command::parse(line),
            Command::Continue,
            "Should be Continue: {line:?}"
        );
    }
}

#[test]
fn given_commands_when_checking_termination_then_only_stop_terminates() {
    let commands = vec![
        Command::Configure {
            name: String::from("a"),
            value: String::from("1"),
        },
        Command::Pause,
        Command::Resume,
        Command::Continue,
    ];

    for command in commands {
        assert!(!command.terminates_loop(), "{command:?} must not terminate");
    }
    assert!(Command::Stop.terminates_loop());
}

#[test]
fn given_configure_regex_when_applied_then_requires_full_line_match() {
    let re = get_configure_regex();

    assert!(re.is_match("configure a=1"));
    assert!(!re.is_match("please configure a=1"));
}
