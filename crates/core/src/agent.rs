// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent identifier and descriptor types (§3).
//!
//! Grounded on the shape of the teacher's `core/src/agent.rs` (a newtype ID
//! plus a small state enum) and the builder discipline of `core/src/crew.rs`,
//! generalized from "one AI invocation per pipeline step" to "one long-running
//! managed process per host".

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::host::HostId;

crate::define_id! {
    /// Opaque, collision-resistant identifier for an agent. Unique for all
    /// time, including destroyed agents (§3 invariant 2).
    pub struct AgentId("agt-");
}

/// Lifecycle state of an agent (§3, §4.6). Terminal: `Destroyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Creating,
    Running,
    Stopped,
    Destroying,
    Destroyed,
}

crate::simple_display! {
    AgentStatus {
        Creating => "creating",
        Running => "running",
        Stopped => "stopped",
        Destroying => "destroying",
        Destroyed => "destroyed",
    }
}

impl AgentStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AgentStatus::Destroyed)
    }
}

/// Which activity sources count toward idleness for this agent (§4.9).
///
/// Only `create` and `boot` are tamper-resistant; modes that also count
/// agent-reported signals must not be used when running untrusted agents
/// (§7 / glossary "Idle mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleMode {
    Io,
    User,
    Agent,
    Ssh,
    Create,
    Boot,
    /// Like `Boot`: only host-boot activity counts. Distinct from `Boot`
    /// because `boot` resets on every host boot while `start` only resets
    /// when this agent itself (re)starts on that boot.
    Start,
    Run,
    Disabled,
}

impl IdleMode {
    /// Returns `true` if this mode is safe to use with an agent that is not
    /// fully trusted, i.e. it only trusts signals the agent cannot forge.
    /// Only `create` and `boot` carry this guarantee (§4.9); `start`
    /// shares `boot`'s enabled-source column but is not listed alongside
    /// it here, so it is treated like the remaining forgeable modes.
    pub fn tamper_resistant(self) -> bool {
        matches!(self, IdleMode::Create | IdleMode::Boot | IdleMode::Disabled)
    }
}

/// Agent descriptor (§3) — one per agent, persisted at
/// `<host-state-dir>/agents/<agent-id>/data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub host_id: HostId,
    pub name: String,
    /// Agent type key (e.g. "claude", "codex", "generic") — resolves against
    /// the `fm-profile::AgentType` registry.
    #[serde(rename = "type")]
    pub agent_type: String,
    /// Concrete argv for the managed process.
    pub command: Vec<String>,
    pub work_dir: PathBuf,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    pub idle_mode: IdleMode,
    pub idle_timeout_seconds: u64,
    #[serde(default)]
    pub start_on_boot: bool,
    /// Resolved environment (secrets redacted by callers before listing).
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    pub status: AgentStatus,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_activity_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_activity_at_epoch_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_activity_at_epoch_ms: Option<u64>,
    /// Set just before the session-rename half of §4.6's rename protocol
    /// runs, cleared once the descriptor write that follows it commits.
    /// A crash in between leaves this set with the session already
    /// renamed — `fleet::reconcile` detects that on the next pass and
    /// finishes the write (see DESIGN.md).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_rename_to: Option<String>,
    /// Sticky flag + timestamp for the tombstone window (§3 invariant 4;
    /// SPEC_FULL §9 resolves retention as persistent across restarts).
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroyed_at_epoch_ms: Option<u64>,
}

impl AgentDescriptor {
    pub fn is_running(&self) -> bool {
        self.status == AgentStatus::Running
    }

    /// Monotonic merge of an activity timestamp (§3 invariant 6, §8 P3):
    /// updates that go backward are discarded.
    pub fn bump_activity(existing: Option<u64>, candidate: u64) -> Option<u64> {
        match existing {
            Some(e) if candidate <= e => Some(e),
            _ => Some(candidate),
        }
    }

    /// Redact secret-shaped environment values for list output (§3: "secrets
    /// redacted in list output"). A key is treated as secret if its name
    /// case-insensitively contains "key", "token", "secret", or "password".
    pub fn redacted_env(&self) -> BTreeMap<String, String> {
        self.env
            .iter()
            .map(|(k, v)| {
                let lower = k.to_ascii_lowercase();
                let secret = ["key", "token", "secret", "password"]
                    .iter()
                    .any(|needle| lower.contains(needle));
                (k.clone(), if secret { "***".to_string() } else { v.clone() })
            })
            .collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct AgentDescriptorBuilder => AgentDescriptor {
        into {
            name: String = "agent",
            agent_type: String = "generic",
            project: String = "",
        }
        set {
            id: AgentId = AgentId::new(),
            host_id: HostId = HostId::new(),
            command: Vec<String> = Vec::new(),
            work_dir: PathBuf = PathBuf::from("/tmp"),
            labels: std::collections::BTreeMap<String, String> = Default::default(),
            permissions: std::collections::BTreeSet<String> = Default::default(),
            idle_mode: IdleMode = IdleMode::Io,
            idle_timeout_seconds: u64 = 0,
            start_on_boot: bool = false,
            env: std::collections::BTreeMap<String, String> = Default::default(),
            status: AgentStatus = AgentStatus::Creating,
            created_at_epoch_ms: u64 = 0,
            started_at_epoch_ms: Option<u64> = None,
            user_activity_at_epoch_ms: Option<u64> = None,
            agent_activity_at_epoch_ms: Option<u64> = None,
            ssh_activity_at_epoch_ms: Option<u64> = None,
            pending_rename_to: Option<String> = None,
            destroyed: bool = false,
            destroyed_at_epoch_ms: Option<u64> = None,
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
