//! `fm create` + `fm list`: default local host resolution, P1 (session-name
//! identity) and P4 (unique names) at the CLI surface.

use crate::prelude::*;

#[test]
fn create_with_no_host_flags_resolves_to_local_host() {
    let fleet = Fleet::empty();
    fleet
        .fm()
        .args(&["create", "worker-one", "generic", "--cmd", "sleep", "--cmd", "1"])
        .passes()
        .stdout_has("created agent");
}

#[test]
fn created_agent_appears_in_fleet_list() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "worker-two", "generic", "--cmd", "sleep", "--cmd", "1"]).passes();

    let found = wait_for(SPEC_WAIT_MAX_MS, || {
        fleet
            .fm()
            .args(&["list", "-o", "json"])
            .command()
            .output()
            .ok()
            .and_then(|o| serde_json::from_slice::<serde_json::Value>(&o.stdout).ok())
            .map(|v| v.as_array().map(|a| a.iter().any(|e| e["agent_name"] == "worker-two")).unwrap_or(false))
            .unwrap_or(false)
    });
    assert!(found, "daemon log:\n{}", fleet.daemon_log());
}

#[test]
fn duplicate_agent_name_is_rejected() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "dup", "generic", "--cmd", "sleep", "--cmd", "1"]).passes();
    fleet.fm().args(&["create", "dup", "generic", "--cmd", "sleep", "--cmd", "1"]).fails();
}

#[test]
fn explicit_host_and_new_host_flags_are_mutually_exclusive() {
    let fleet = Fleet::empty();
    fleet
        .fm()
        .args(&["create", "x", "generic", "--host", "h1", "--new-host", "local", "--cmd", "sleep", "--cmd", "1"])
        .fails();
}

#[test]
fn list_hosts_shows_the_local_host_after_first_create() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "worker-three", "generic", "--cmd", "sleep", "--cmd", "1"]).passes();
    fleet.fm().args(&["list", "--hosts"]).passes().stdout_has("local");
}
