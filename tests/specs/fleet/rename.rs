//! `fm rename`: agent identity survives a round trip, the session name
//! stays in lockstep, and name collisions/unknown targets are rejected
//! (§C1 invariant 3).

use crate::prelude::*;

#[test]
fn renaming_an_agent_updates_its_name() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "alpha", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["rename", "alpha", "beta"]).passes().stdout_has("renamed alpha to beta");

    fleet.fm().args(&["list", "-o", "json"]).passes().stdout_has("beta").stdout_lacks("alpha");
}

#[test]
fn rename_round_trip_restores_the_original_name() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "alpha", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["rename", "alpha", "beta"]).passes();
    fleet.fm().args(&["rename", "beta", "alpha"]).passes().stdout_has("renamed beta to alpha");

    fleet.fm().args(&["list", "-o", "json"]).passes().stdout_has("alpha").stdout_lacks("beta");
}

#[test]
fn renaming_to_an_existing_name_is_rejected() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["create", "alpha", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();
    fleet.fm().args(&["create", "beta", "generic", "--cmd", "sleep", "--cmd", "30"]).passes();

    fleet.fm().args(&["rename", "alpha", "beta"]).fails().code_eq(2);
}

#[test]
fn renaming_an_unknown_agent_is_not_found() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["rename", "nonexistent-agent", "whatever"]).fails().code_eq(3);
}
