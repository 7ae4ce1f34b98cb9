//! `fm exec` (synchronous host-side command execution) and `fm message`
//! (typed-as-if send_keys into a running session), §4.1/§4.3.

use crate::prelude::*;

#[test]
fn exec_runs_a_command_and_reports_its_exit_code() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "worker", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["exec", "worker", "--", "echo", "hello-from-exec"]).passes().stdout_has("hello-from-exec");
}

#[test]
fn exec_propagates_a_nonzero_exit_code() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "worker", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["exec", "worker", "--", "sh", "-c", "exit 7"]).fails().code_eq(1);
}

#[test]
fn exec_on_an_unknown_agent_is_not_found() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["exec", "nonexistent-agent", "--", "true"]).fails().code_eq(3);
}

#[test]
fn message_sends_text_to_the_running_session() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "worker", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["message", "worker", "echo hi"]).passes().stdout_has("sent to");
}

#[test]
fn message_to_an_unknown_agent_is_not_found() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["message", "nonexistent-agent", "hi"]).fails().code_eq(3);
}
