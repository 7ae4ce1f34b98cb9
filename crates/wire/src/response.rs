// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{AgentDetail, AgentSummary, FleetStatusEntry, HostDetail, HostSummary, ProvisionRunSummary};

/// Response from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    /// Generic success.
    Ok,

    /// Health check response.
    Pong,

    /// Version handshake response.
    Hello { version: String },

    /// Daemon is shutting down.
    ShuttingDown,

    /// Daemon process status.
    Status { uptime_secs: u64, hosts_active: usize, agents_active: usize },

    /// Error response.
    Error { message: String },

    /// List of hosts.
    Hosts { hosts: Vec<HostSummary> },

    /// Single host details.
    Host { host: Option<Box<HostDetail>> },

    /// List of agents.
    Agents { agents: Vec<AgentSummary> },

    /// Single agent details.
    Agent { agent: Option<Box<AgentDetail>> },

    /// Reconciled fleet status (§4.8).
    FleetStatus { entries: Vec<FleetStatusEntry> },

    /// Host log contents.
    HostLogs {
        log_path: PathBuf,
        content: String,
        #[serde(default)]
        offset: u64,
    },

    /// Agent log contents.
    AgentLogs {
        log_path: PathBuf,
        content: String,
        #[serde(default)]
        offset: u64,
    },

    /// Provisioning run for an agent.
    ProvisionRun { run: Option<Box<ProvisionRunSummary>> },

    /// `fm create` (host form) accepted.
    HostCreated { id: String },
    /// `fm create` (agent form) accepted.
    AgentCreated { id: String },
    HostStarted { id: String },
    HostStopped { id: String },
    HostDestroyed { id: String },
    AgentDestroyed { id: String },
    Renamed { id: String, name: String },
    Snapshotted { host_id: String, snapshot: String },

    /// `fm exec` completed (result of a single `Effect::Exec`).
    ExecOutput { exit_code: i32, stdout: String, stderr: String },

    /// `fm message` accepted (one or more targets, §4.10 fan-out).
    MessageSentMany { results: Vec<MessageTargetResult> },

    /// `fm push` / `fm pull` / `fm pair` transfer outcome.
    TransferStarted { id: String },
    TransferCompleted { id: String },

    /// `fm provision` re-run accepted.
    Provisioned { run: Box<ProvisionRunSummary> },

    /// `fm gc` result: identifiers of reclaimed resources, grouped by
    /// category (`host`, `agent`, `snapshot`).
    GcResult { reclaimed: Vec<(String, String)> },

    /// `fm limit` accepted.
    LimitSet { host_id: String },

    /// Connection is ready for raw byte streaming to the agent's terminal.
    AgentAttachReady { id: String },
}

/// Per-target outcome of a `fm message` fan-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MessageTargetResult {
    pub agent_id: String,
    /// `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
