// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn short_form_deserializes_to_image() {
    let config: ContainerConfig = serde_json::from_str(r#""coop:claude""#).unwrap();
    assert_eq!(config.image, "coop:claude");
}

#[test]
fn block_form_deserializes_to_image() {
    let config: ContainerConfig = serde_json::from_str(r#"{"image":"coop:claude"}"#).unwrap();
    assert_eq!(config.image, "coop:claude");
}

#[test]
fn new_constructs_directly() {
    assert_eq!(ContainerConfig::new("coop:codex").image, "coop:codex");
}
