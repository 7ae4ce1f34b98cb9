//! `-o` output format selection (§6: text, json, jsonl).

use crate::prelude::*;

#[test]
fn list_hosts_json_is_parseable_array() {
    let fleet = Fleet::empty();
    let run = fleet.fm().args(&["list", "--hosts", "-o", "json"]).passes();
    let parsed: serde_json::Value = serde_json::from_str(&run.stdout()).expect("valid json");
    assert!(parsed.is_array());
}

#[test]
fn list_hosts_jsonl_on_empty_fleet_is_empty_stdout() {
    let fleet = Fleet::empty();
    let run = fleet.fm().args(&["list", "--hosts", "-o", "jsonl"]).passes();
    assert!(run.stdout().trim().is_empty());
}

#[test]
fn list_hosts_text_on_empty_fleet_shows_empty_message() {
    let fleet = Fleet::empty();
    fleet.fm().args(&["list", "--hosts"]).passes().stdout_has("No hosts found.");
}
