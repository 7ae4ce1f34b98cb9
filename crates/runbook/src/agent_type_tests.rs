// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn built_ins_cover_claude_codex_generic() {
    let registry = built_in_agent_types();
    assert_eq!(registry.keys().copied().collect::<Vec<_>>(), vec!["claude", "codex", "generic"]);
}

#[test]
fn resolve_finds_claude() {
    let agent_type = resolve("claude").unwrap();
    assert_eq!(agent_type.key, "claude");
}

#[test]
fn resolve_rejects_unknown() {
    let err = resolve("nonexistent").unwrap_err();
    assert!(matches!(err, AgentTypeError::Unknown(k) if k == "nonexistent"));
}

#[test]
fn render_argv_substitutes_work_dir() {
    let agent_type = resolve("claude").unwrap();
    let mut vars = HashMap::new();
    vars.insert("work_dir".to_string(), "/tmp/proj".to_string());
    assert_eq!(agent_type.render_argv(&vars), vec!["claude", "--cwd", "/tmp/proj"]);
}

#[test]
fn render_argv_shell_escapes_injected_quotes() {
    let agent_type = resolve("claude").unwrap();
    let mut vars = HashMap::new();
    vars.insert("work_dir".to_string(), "/tmp/it's/proj".to_string());
    assert_eq!(agent_type.render_argv(&vars), vec!["claude", "--cwd", "/tmp/it'\\''s/proj"]);
}

#[test]
fn generic_has_no_default_steps() {
    let agent_type = resolve("generic").unwrap();
    assert!(agent_type.default_steps.is_empty());
}
