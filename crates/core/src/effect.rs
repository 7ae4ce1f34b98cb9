// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects: side effects the lifecycle orchestrator schedules but does not
//! itself perform.
//!
//! Grounded on the teacher's `core/src/effect.rs`: the orchestrator's state
//! machine (§4.6) only *decides* what should happen next; a separate runtime
//! executes the decision against `fm-adapters`/`fm-engine`. Keeping that
//! split means the state machine stays synchronous and host-lock-serialized
//! (§5) while the actual provider/session/transfer calls — the blocking
//! points (§5) — run on the worker pool.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::host::HostId;
use crate::provision::StepKind;
use crate::timer::TimerId;

/// Effects the lifecycle orchestrator can schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// C3 `create_host`.
    CreateHost { host_id: HostId, image: Option<String> },
    /// C3 `start_host`, optionally restoring from a named/latest snapshot.
    StartHost { host_id: HostId, snapshot: Option<String> },
    /// C3 `stop_host`.
    StopHost { host_id: HostId, snapshot_first: bool },
    /// C3 `destroy_host`.
    DestroyHost { host_id: HostId, purge_snapshots: bool },
    /// C3 `snapshot`.
    SnapshotHost { host_id: HostId },
    /// C3 `exec`, used by provisioning and ad-hoc `fm exec`.
    Exec {
        host_id: HostId,
        argv: Vec<String>,
        cwd: Option<PathBuf>,
        #[serde(with = "duration_ms")]
        hard_timeout: Duration,
        #[serde(with = "opt_duration_ms")]
        warn_timeout: Option<Duration>,
    },
    /// C5 materialization/sync call.
    Transfer { host_id: HostId, mode: String, source: PathBuf, target: PathBuf },
    /// C6 single provisioning step.
    RunProvisionStep { host_id: HostId, agent_id: AgentId, step: StepKind },
    /// C4 `start`.
    StartSession { host_id: HostId, session: String, argv: Vec<String>, env: BTreeMap<String, String>, cwd: PathBuf },
    /// C4 `send_keys` — also backs C10 messaging.
    SendKeys { host_id: HostId, session: String, bytes: Vec<u8> },
    /// C4 `kill`.
    KillSession { host_id: HostId, session: String },
    /// C4 `rename`.
    RenameSession { host_id: HostId, old: String, new: String },
    /// C9: touch an activity file's mtime.
    TouchActivity { host_id: HostId, agent_id: AgentId, source: &'static str },
    SetTimer { id: TimerId, #[serde(with = "duration_ms")] duration: Duration },
    CancelTimer { id: TimerId },
    Notify { title: String, message: String },
}

impl Effect {
    /// Effect name for log spans.
    pub fn name(&self) -> &'static str {
        match self {
            Effect::CreateHost { .. } => "create_host",
            Effect::StartHost { .. } => "start_host",
            Effect::StopHost { .. } => "stop_host",
            Effect::DestroyHost { .. } => "destroy_host",
            Effect::SnapshotHost { .. } => "snapshot_host",
            Effect::Exec { .. } => "exec",
            Effect::Transfer { .. } => "transfer",
            Effect::RunProvisionStep { .. } => "run_provision_step",
            Effect::StartSession { .. } => "start_session",
            Effect::SendKeys { .. } => "send_keys",
            Effect::KillSession { .. } => "kill_session",
            Effect::RenameSession { .. } => "rename_session",
            Effect::TouchActivity { .. } => "touch_activity",
            Effect::SetTimer { .. } => "set_timer",
            Effect::CancelTimer { .. } => "cancel_timer",
            Effect::Notify { .. } => "notify",
        }
    }

    /// Key-value pairs for structured logging.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            Effect::CreateHost { host_id, .. } => vec![("host_id", host_id.to_string())],
            Effect::StartHost { host_id, snapshot } => {
                vec![("host_id", host_id.to_string()), ("snapshot", snapshot.clone().unwrap_or_default())]
            }
            Effect::StopHost { host_id, snapshot_first } => {
                vec![("host_id", host_id.to_string()), ("snapshot_first", snapshot_first.to_string())]
            }
            Effect::DestroyHost { host_id, purge_snapshots } => {
                vec![("host_id", host_id.to_string()), ("purge_snapshots", purge_snapshots.to_string())]
            }
            Effect::SnapshotHost { host_id } => vec![("host_id", host_id.to_string())],
            Effect::Exec { host_id, argv, .. } => {
                vec![("host_id", host_id.to_string()), ("argv", argv.join(" "))]
            }
            Effect::Transfer { host_id, mode, source, target } => vec![
                ("host_id", host_id.to_string()),
                ("mode", mode.clone()),
                ("source", source.display().to_string()),
                ("target", target.display().to_string()),
            ],
            Effect::RunProvisionStep { host_id, agent_id, step } => vec![
                ("host_id", host_id.to_string()),
                ("agent_id", agent_id.to_string()),
                ("step", step.label().to_string()),
            ],
            Effect::StartSession { host_id, session, .. } => {
                vec![("host_id", host_id.to_string()), ("session", session.clone())]
            }
            Effect::SendKeys { host_id, session, .. } => {
                vec![("host_id", host_id.to_string()), ("session", session.clone())]
            }
            Effect::KillSession { host_id, session } => {
                vec![("host_id", host_id.to_string()), ("session", session.clone())]
            }
            Effect::RenameSession { host_id, old, new } => {
                vec![("host_id", host_id.to_string()), ("old", old.clone()), ("new", new.clone())]
            }
            Effect::TouchActivity { host_id, agent_id, source } => vec![
                ("host_id", host_id.to_string()),
                ("agent_id", agent_id.to_string()),
                ("source", (*source).to_string()),
            ],
            Effect::SetTimer { id, duration } => {
                vec![("timer_id", id.to_string()), ("duration_ms", duration.as_millis().to_string())]
            }
            Effect::CancelTimer { id } => vec![("timer_id", id.to_string())],
            Effect::Notify { title, .. } => vec![("title", title.clone())],
        }
    }

    /// Whether this effect is noisy enough that only a single log line
    /// ("executed") should be emitted, rather than separate started/
    /// completed lines.
    pub fn verbose(&self) -> bool {
        !matches!(self, Effect::TouchActivity { .. } | Effect::SetTimer { .. } | Effect::CancelTimer { .. })
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_millis().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

mod opt_duration_ms {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        d.map(|d| d.as_millis()).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
