//! `fm gc`: reclaims exited/orphaned fleet entries via
//! `EffectiveState::is_gc_candidate`, leaving live agents untouched
//! (§C8, §C11).

use crate::prelude::*;

#[test]
fn dry_run_with_no_agents_reports_nothing_to_reclaim() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["gc", "--dry-run"]).passes().stdout_has("Nothing to reclaim");
}

#[test]
fn gc_does_not_reclaim_a_running_agent() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "worker", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["gc", "--dry-run"]).passes().stdout_has("Nothing to reclaim");
    fleet.fm().args(&["gc"]).passes().stdout_has("Nothing to reclaim");

    fleet.fm().args(&["list", "-o", "json"]).passes().stdout_has("worker");
}
