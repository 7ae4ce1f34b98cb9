// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events: state transitions represented as data.
//!
//! Grounded on the teacher's `core/src/effect.rs` sibling pattern and the
//! event-application discipline of `daemon/src/storage/state/mod.rs`
//! (`MaterializedState::apply_event`): every mutation to an agent or host
//! descriptor is first expressed as an `Event`, then applied by
//! `fm-storage` to produce the next descriptor. Unknown `type` tags
//! deserialize to `Custom` for forward compatibility across daemon versions.

use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::error::ErrorKind;
use crate::host::{HostId, SnapshotRef};
use crate::provision::{ProvisionRunId, StepKind, StepOutcome};

/// Events that trigger state transitions in the system.
///
/// Serializes with `{"type": "event:name", ...fields}` format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    // -- host --
    #[serde(rename = "host:created")]
    HostCreated { id: HostId },
    #[serde(rename = "host:starting")]
    HostStarting { id: HostId },
    #[serde(rename = "host:running")]
    HostRunning { id: HostId },
    #[serde(rename = "host:stopping")]
    HostStopping { id: HostId },
    #[serde(rename = "host:stopped")]
    HostStopped { id: HostId },
    #[serde(rename = "host:snapshotted")]
    HostSnapshotted { id: HostId, snapshot: SnapshotRef },
    #[serde(rename = "host:destroyed")]
    HostDestroyed { id: HostId },
    #[serde(rename = "host:failed")]
    HostFailed { id: HostId, reason: String },
    #[serde(rename = "host:lock_acquired")]
    HostLockAcquired { id: HostId, operation: String, holder: String },
    #[serde(rename = "host:lock_released")]
    HostLockReleased { id: HostId },

    // -- agent --
    #[serde(rename = "agent:created")]
    AgentCreated { id: AgentId, host_id: HostId, name: String },
    #[serde(rename = "agent:provisioning_step")]
    AgentProvisioningStep { id: AgentId, run: ProvisionRunId, index: usize, outcome: StepOutcome },
    #[serde(rename = "agent:provisioning_failed")]
    AgentProvisioningFailed { id: AgentId, step: StepKind, reason: String },
    #[serde(rename = "agent:running")]
    AgentRunning { id: AgentId },
    #[serde(rename = "agent:stopped")]
    AgentStopped { id: AgentId },
    #[serde(rename = "agent:destroying")]
    AgentDestroying { id: AgentId },
    #[serde(rename = "agent:destroyed")]
    AgentDestroyed { id: AgentId },
    #[serde(rename = "agent:renamed")]
    AgentRenamed { id: AgentId, old_name: String, new_name: String },
    #[serde(rename = "agent:activity")]
    AgentActivity { id: AgentId, source: ActivitySource, at_epoch_ms: u64 },

    // -- session --
    #[serde(rename = "session:started")]
    SessionStarted { host_id: HostId, session: String },
    #[serde(rename = "session:killed")]
    SessionKilled { host_id: HostId, session: String },
    #[serde(rename = "session:renamed")]
    SessionRenamed { host_id: HostId, old: String, new: String },

    // -- transfer --
    #[serde(rename = "transfer:started")]
    TransferStarted { host_id: HostId, mode: String },
    #[serde(rename = "transfer:completed")]
    TransferCompleted { host_id: HostId, mode: String },
    #[serde(rename = "transfer:failed")]
    TransferFailed { host_id: HostId, mode: String, reason: String },

    // -- idle supervisor --
    #[serde(rename = "idle:fired")]
    IdleFired { host_id: HostId },

    // -- garbage collector --
    #[serde(rename = "gc:reclaimed")]
    GcReclaimed { category: String, reference: String },

    // -- system --
    #[serde(rename = "system:error")]
    SystemError { kind: ErrorKind, operation: String },
    #[serde(rename = "system:shutdown")]
    Shutdown,

    /// Catch-all for unknown event types (extensibility).
    #[serde(other, skip_serializing)]
    Custom,
}

/// Which activity source an [`Event::AgentActivity`] reports against,
/// mirroring §4.9's activity-file set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySource {
    User,
    Agent,
    Ssh,
    Create,
    Boot,
}

impl Event {
    /// Short name for log spans, mirroring the `type` tag without the
    /// serde rename plumbing.
    pub fn name(&self) -> &'static str {
        match self {
            Event::HostCreated { .. } => "host:created",
            Event::HostStarting { .. } => "host:starting",
            Event::HostRunning { .. } => "host:running",
            Event::HostStopping { .. } => "host:stopping",
            Event::HostStopped { .. } => "host:stopped",
            Event::HostSnapshotted { .. } => "host:snapshotted",
            Event::HostDestroyed { .. } => "host:destroyed",
            Event::HostFailed { .. } => "host:failed",
            Event::HostLockAcquired { .. } => "host:lock_acquired",
            Event::HostLockReleased { .. } => "host:lock_released",
            Event::AgentCreated { .. } => "agent:created",
            Event::AgentProvisioningStep { .. } => "agent:provisioning_step",
            Event::AgentProvisioningFailed { .. } => "agent:provisioning_failed",
            Event::AgentRunning { .. } => "agent:running",
            Event::AgentStopped { .. } => "agent:stopped",
            Event::AgentDestroying { .. } => "agent:destroying",
            Event::AgentDestroyed { .. } => "agent:destroyed",
            Event::AgentRenamed { .. } => "agent:renamed",
            Event::AgentActivity { .. } => "agent:activity",
            Event::SessionStarted { .. } => "session:started",
            Event::SessionKilled { .. } => "session:killed",
            Event::SessionRenamed { .. } => "session:renamed",
            Event::TransferStarted { .. } => "transfer:started",
            Event::TransferCompleted { .. } => "transfer:completed",
            Event::TransferFailed { .. } => "transfer:failed",
            Event::IdleFired { .. } => "idle:fired",
            Event::GcReclaimed { .. } => "gc:reclaimed",
            Event::SystemError { .. } => "system:error",
            Event::Shutdown => "system:shutdown",
            Event::Custom => "custom",
        }
    }

    /// One-line summary for embedding inside an `Effect::Emit`-adjacent log
    /// field (grounded on the teacher's `log_summary` convention).
    pub fn log_summary(&self) -> String {
        match self {
            Event::AgentCreated { id, name, .. } => format!("agent:created id={id} name={name}"),
            Event::HostCreated { id } => format!("host:created id={id}"),
            other => other.name().to_string(),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
