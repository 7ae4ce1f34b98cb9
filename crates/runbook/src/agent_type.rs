// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Compile-time [`AgentType`] capability registry.
//!
//! Generalized from the teacher's dynamic HCL job/worker/queue discovery
//! (`find.rs`'s "look up a named definition in a runbook file" shape) into
//! a fixed, in-binary registry: the wire-level collaborators note calls for
//! "explicit capability registries... plus a config-driven enablement set,
//! no runtime monkey-patching", so there is no file discovery step here —
//! just a lookup table of built-ins, one entry per supported coding agent.

use std::collections::HashMap;

use fm_core::StepKind;
use indexmap::IndexMap;
use thiserror::Error;

use crate::template::interpolate_shell;

#[derive(Debug, Error)]
pub enum AgentTypeError {
    #[error("unknown agent type {0:?}")]
    Unknown(String),
    #[error("agent type {key:?} has an unparseable default step command: {detail}")]
    InvalidStepCommand { key: &'static str, detail: String },
}

impl AgentTypeError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        match self {
            AgentTypeError::Unknown(_) => fm_core::ErrorKind::InvalidRequest,
            AgentTypeError::InvalidStepCommand { .. } => fm_core::ErrorKind::InvalidSpec,
        }
    }
}

/// A coding-agent capability descriptor: the provisioning steps a fresh
/// host needs before the agent can run, and the argv template used to
/// start its session (§4.5's "agent-type default steps" plus §4.2's
/// `command` field when the caller doesn't supply one explicitly).
#[derive(Debug, Clone)]
pub struct AgentType {
    /// Registry key, e.g. `"claude"`. Matches `AgentDescriptor::agent_type`.
    pub key: &'static str,
    /// One-line description for `fm plugin list`.
    pub description: &'static str,
    /// Steps run before the agent's session is started, in order. Ranks
    /// first in §4.5's step ordering ("agent-type default steps → user
    /// supplied steps → environment writes → session start").
    pub default_steps: Vec<StepKind>,
    /// Session argv template, one word per element. Interpolated with
    /// `${work_dir}`, `${project}`, and any caller-supplied vars via
    /// [`AgentType::render_argv`].
    pub argv_template: Vec<&'static str>,
}

impl AgentType {
    /// Renders [`Self::argv_template`] against `vars`, shell-escaping each
    /// substituted value (an argv template with an un-escaped `${prompt}`
    /// would let a crafted prompt string inject extra shell words).
    pub fn render_argv(&self, vars: &HashMap<String, String>) -> Vec<String> {
        self.argv_template
            .iter()
            .map(|word| interpolate_shell(word, vars))
            .collect()
    }
}

fn claude() -> AgentType {
    AgentType {
        key: "claude",
        description: "Claude Code CLI",
        default_steps: vec![StepKind::RunUser { command: "command -v claude".into() }],
        argv_template: vec!["claude", "--cwd", "${work_dir}"],
    }
}

fn codex() -> AgentType {
    AgentType {
        key: "codex",
        description: "OpenAI Codex CLI",
        default_steps: vec![StepKind::RunUser { command: "command -v codex".into() }],
        argv_template: vec!["codex", "--cd", "${work_dir}"],
    }
}

fn generic() -> AgentType {
    AgentType {
        key: "generic",
        description: "arbitrary command, no provisioning defaults",
        default_steps: Vec::new(),
        argv_template: vec!["${command}"],
    }
}

/// Built-in registry, in declaration order (`claude`, `codex`, `generic`).
/// `IndexMap` keeps that order for `fm plugin list`'s output, matching the
/// ordered-listing shape the teacher uses for command help.
pub fn built_in_agent_types() -> IndexMap<&'static str, AgentType> {
    let mut map = IndexMap::new();
    for agent_type in [claude(), codex(), generic()] {
        map.insert(agent_type.key, agent_type);
    }
    map
}

/// Looks up an agent type by its registry key, validating that its
/// `run_user`/`run_sudo` default steps are well-formed shell commands
/// before handing it to the caller — `fm-engine::provision` shells them
/// out verbatim, so a syntax error here should surface at lookup time,
/// not mid-provisioning-run.
pub fn resolve(key: &str) -> Result<AgentType, AgentTypeError> {
    let agent_type = built_in_agent_types()
        .shift_remove(key)
        .ok_or_else(|| AgentTypeError::Unknown(key.to_string()))?;
    for step in &agent_type.default_steps {
        let command = match step {
            StepKind::RunUser { command } | StepKind::RunSudo { command } => command,
            _ => continue,
        };
        if let Err(errors) = fm_shell::parse_and_validate(command) {
            return Err(AgentTypeError::InvalidStepCommand {
                key: agent_type.key,
                detail: errors.join("; "),
            });
        }
    }
    Ok(agent_type)
}

#[cfg(test)]
#[path = "agent_type_tests.rs"]
mod tests;
