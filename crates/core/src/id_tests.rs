// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn new_ids_carry_the_prefix_and_are_unique() {
    let a = TestId::new();
    let b = TestId::new();
    assert!(a.as_str().starts_with("tst-"));
    assert_ne!(a, b);
}

#[test]
fn from_string_round_trips() {
    let id = TestId::from_string("tst-abcdefghijklmnopqrs");
    assert_eq!(id.as_str(), "tst-abcdefghijklmnopqrs");
}

#[test]
fn suffix_strips_the_prefix() {
    let id = TestId::from_string("tst-abcdefg");
    assert_eq!(id.suffix(), "abcdefg");
}

#[test]
fn define_id_hash_map_lookup() {
    let id = TestId::from_string("tst-lookupme");
    let mut map = HashMap::new();
    map.insert(id.clone(), 42);
    assert_eq!(map.get("tst-lookupme"), Some(&42));
}

#[test]
fn short_truncates_the_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn short_fn_on_str() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

#[test]
fn serde_round_trips_as_plain_string() {
    let id = TestId::from_string("tst-serdeme");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"tst-serdeme\"");
    let back: TestId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
