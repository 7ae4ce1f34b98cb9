//! `fm daemon` lifecycle: start, status, stop, restart.

use crate::prelude::*;

#[test]
fn status_reports_not_running_before_start() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["daemon", "status"]).passes().stdout_has("not running");
}

#[test]
fn start_then_status_reports_running() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["daemon", "start"]).passes();

    let running = wait_for(SPEC_WAIT_MAX_MS, || {
        fleet.fm().args(&["daemon", "status"]).command().output().map(|o| {
            String::from_utf8_lossy(&o.stdout).contains("running")
                && !String::from_utf8_lossy(&o.stdout).contains("not running")
        }).unwrap_or(false)
    });
    assert!(running, "daemon log:\n{}", fleet.daemon_log());
}

#[test]
fn stop_then_status_reports_not_running() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["daemon", "start"]).passes();
    wait_for(SPEC_WAIT_MAX_MS, || fleet.fm().args(&["daemon", "status"]).command().status().map(|s| s.success()).unwrap_or(false));

    fleet.fm().args(&["daemon", "stop"]).passes().stdout_has("stopped");
    fleet.fm().args(&["daemon", "status"]).passes().stdout_has("not running");
}

#[test]
fn stopping_an_already_stopped_daemon_is_not_an_error() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["daemon", "stop"]).passes().stdout_has("not running");
}
