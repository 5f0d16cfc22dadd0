// Unit tests for the dispatch table

use crate::monitor::listener::{Flow, dispatch};
use crate::protocol::Command;
use crate::tests::support::RecordingResource;

/// **VALUE**: Verifies each command reaches exactly the matching resource method.
///
/// **BUG THIS CATCHES**: Would catch swapped match arms (pause calling resume) or a
/// fallback arm that forwards unrecognized commands to the resource.
#[test]
fn given_each_command_when_dispatched_then_calls_matching_method_once() {
    let cases = vec![
        (
            Command::Configure {
                name: String::from("debug"),
                value: String::from("off"),
            },
            vec!["configure(debug,off)"],
            Flow::Continue,
        ),
        (Command::Pause, vec!["pause"], Flow::Continue),
        (Command::Resume, vec!["resume"], Flow::Continue),
        (Command::Stop, vec!["stop"], Flow::Stop),
        (Command::Continue, vec![], Flow::Continue),
    ];

    for (command, expected_calls, expected_flow) in cases {
        // GIVEN: A fresh resource
        let resource = RecordingResource::started();

        // WHEN: Dispatching the command
        let flow = dispatch(&resource, command.clone());

        // THEN: Exactly the expected call was made and the loop flow is right
        assert_eq!(resource.calls(), expected_calls, "Calls for {command:?}");
        assert_eq!(flow, expected_flow, "Flow for {command:?}");
    }
}

#[test]
fn given_repeated_configure_when_dispatched_then_not_deduplicated() {
    let resource = RecordingResource::started();
    let command = Command::Configure {
        name: String::from("a"),
        value: String::from("1"),
    };

    dispatch(&resource, command.clone());
    dispatch(&resource, command);

    assert_eq!(resource.calls(), vec!["configure(a,1)", "configure(a,1)"]);
}
