// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTO structs for the IPC protocol — flattened, string-keyed views of
//! `fm-core` descriptors, decoupled from the persisted representation so
//! the wire format can evolve independently of `fm-storage`'s on-disk
//! layout.

use std::collections::BTreeMap;
use std::path::PathBuf;

use fm_core::{
    AgentDescriptor, AgentStatus, HostDescriptor, HostStatus, IdleMode, ProviderKind, SnapshotRef,
};
use serde::{Deserialize, Serialize};

/// Summary of a host for `fm list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostSummary {
    pub id: String,
    pub name: String,
    pub provider: ProviderKind,
    pub status: HostStatus,
    pub agent_count: usize,
    pub created_at_epoch_ms: u64,
}

/// Detailed host information for `fm list --long` / a single-host query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostDetail {
    pub id: String,
    pub name: String,
    pub provider: ProviderKind,
    pub status: HostStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub tags: BTreeMap<String, String>,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_at_epoch_ms: Option<u64>,
    pub snapshots: Vec<SnapshotRef>,
    pub locked: bool,
    pub agents: Vec<AgentSummary>,
}

impl From<&HostDescriptor> for HostDetail {
    fn from(h: &HostDescriptor) -> Self {
        HostDetail {
            id: h.id.to_string(),
            name: h.name.clone(),
            provider: h.provider,
            status: h.status,
            image: h.image.clone(),
            tags: h.tags.clone(),
            created_at_epoch_ms: h.created_at_epoch_ms,
            boot_at_epoch_ms: h.boot_at_epoch_ms,
            snapshots: h.snapshots.clone(),
            locked: h.lock.is_some(),
            agents: Vec::new(),
        }
    }
}

/// Summary of an agent for `fm list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSummary {
    pub id: String,
    pub host_id: String,
    pub name: String,
    pub agent_type: String,
    pub status: AgentStatus,
    pub idle_mode: IdleMode,
    pub created_at_epoch_ms: u64,
}

/// Detailed agent information for `fm show`/`GetAgent`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentDetail {
    pub id: String,
    pub host_id: String,
    pub name: String,
    pub agent_type: String,
    pub command: Vec<String>,
    pub work_dir: PathBuf,
    #[serde(default)]
    pub project: String,
    pub labels: BTreeMap<String, String>,
    pub status: AgentStatus,
    pub idle_mode: IdleMode,
    pub idle_timeout_seconds: u64,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at_epoch_ms: Option<u64>,
    /// Environment with secret-shaped keys redacted (`AgentDescriptor::redacted_env`).
    pub env: BTreeMap<String, String>,
}

impl From<&AgentDescriptor> for AgentSummary {
    fn from(a: &AgentDescriptor) -> Self {
        AgentSummary {
            id: a.id.to_string(),
            host_id: a.host_id.to_string(),
            name: a.name.clone(),
            agent_type: a.agent_type.clone(),
            status: a.status,
            idle_mode: a.idle_mode,
            created_at_epoch_ms: a.created_at_epoch_ms,
        }
    }
}

impl From<&AgentDescriptor> for AgentDetail {
    fn from(a: &AgentDescriptor) -> Self {
        AgentDetail {
            id: a.id.to_string(),
            host_id: a.host_id.to_string(),
            name: a.name.clone(),
            agent_type: a.agent_type.clone(),
            command: a.command.clone(),
            work_dir: a.work_dir.clone(),
            project: a.project.clone(),
            labels: a.labels.clone(),
            status: a.status,
            idle_mode: a.idle_mode,
            idle_timeout_seconds: a.idle_timeout_seconds,
            created_at_epoch_ms: a.created_at_epoch_ms,
            started_at_epoch_ms: a.started_at_epoch_ms,
            env: a.redacted_env(),
        }
    }
}

/// A single step outcome, flattened for transport (mirrors
/// `fm_core::StepRecord` but drops the `StepKind` payload down to its label).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvisionStepSummary {
    pub index: usize,
    pub label: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Summary of a provisioning run for `fm provision` / `GetProvisionRun`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvisionRunSummary {
    pub id: String,
    pub steps: Vec<ProvisionStepSummary>,
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<usize>,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
