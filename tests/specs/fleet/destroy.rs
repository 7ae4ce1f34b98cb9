//! `fm destroy`: the `--force` guard on a running agent/host, cascading
//! host destruction when the last agent goes, and tombstone visibility
//! (§4.6 destroy sequence, §8 P7).

use crate::prelude::*;

#[test]
fn destroying_running_agent_without_force_fails() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "guarded", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["destroy", "guarded"]).fails().stderr_has("force");
}

#[test]
fn destroying_running_agent_with_force_succeeds() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "forceful", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["destroy", "forceful", "--force"]).passes().stdout_has("destroyed agent");
}

#[test]
fn destroying_the_last_agent_on_a_host_destroys_the_host() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "solo", "generic", "--cmd", "sleep", "--cmd", "1"]).passes();

    let host_id = {
        let out = fleet.fm().args(&["list", "-o", "json"]).passes();
        let entries: serde_json::Value = serde_json::from_str(&out.stdout()).expect("json");
        entries[0]["host_id"].as_str().expect("host_id").to_string()
    };

    fleet.fm().args(&["destroy", "solo", "--force"]).passes();

    let gone = wait_for(SPEC_WAIT_MAX_MS, || {
        fleet
            .fm()
            .args(&["list", "--hosts", "-o", "json"])
            .command()
            .output()
            .ok()
            .and_then(|o| serde_json::from_slice::<serde_json::Value>(&o.stdout).ok())
            .map(|v| v.as_array().map(|a| !a.iter().any(|e| e["id"] == host_id)).unwrap_or(true))
            .unwrap_or(false)
    });
    assert!(gone, "host should be destroyed alongside its last agent\ndaemon log:\n{}", fleet.daemon_log());
}

#[test]
fn destroyed_agent_stays_visible_as_a_tombstone() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "tomb", "generic", "--cmd", "sleep", "--cmd", "1"]).passes();
    fleet.fm().args(&["destroy", "tomb", "--force"]).passes();

    // P7: a destroyed agent stays visible for a retention window.
    fleet.fm().args(&["list", "-o", "json"]).passes().stdout_has("tomb");
}

#[test]
fn destroying_unknown_agent_is_not_found() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["destroy", "nonexistent-agent"]).fails().code_eq(3);
}
