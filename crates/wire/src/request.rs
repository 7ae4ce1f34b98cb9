// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use fm_core::{IdleMode, ProviderKind, Resource, Ssh};
use serde::{Deserialize, Serialize};

use super::Query;

/// Request from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping.
    Ping,

    /// Version handshake.
    Hello {
        version: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },

    /// Read-only state query.
    Query { query: Query },

    /// Request daemon shutdown.
    Shutdown {
        /// Destroy every host before stopping.
        #[serde(default)]
        kill: bool,
    },

    /// Daemon process status (uptime, host/agent counts).
    Status,

    /// `fm create` host allocation.
    CreateHost {
        name: String,
        provider: ProviderKind,
        #[serde(default)]
        image: Option<String>,
        #[serde(default)]
        resource: Resource,
        #[serde(default)]
        ssh: Option<Ssh>,
    },

    /// `fm create` agent spawn on an already-running host.
    CreateAgent {
        host_id: String,
        name: String,
        agent_type: String,
        command: Vec<String>,
        work_dir: PathBuf,
        #[serde(default)]
        project: String,
        #[serde(default)]
        labels: BTreeMap<String, String>,
        idle_mode: IdleMode,
        idle_timeout_seconds: u64,
        #[serde(default)]
        start_on_boot: bool,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },

    /// `fm start`
    StartHost {
        id: String,
        #[serde(default)]
        snapshot: Option<String>,
    },

    /// `fm stop`
    StopHost {
        id: String,
        #[serde(default)]
        snapshot_first: bool,
    },

    /// `fm destroy` (host form).
    DestroyHost {
        id: String,
        #[serde(default)]
        purge_snapshots: bool,
        #[serde(default)]
        force: bool,
    },

    /// `fm destroy` (agent form).
    DestroyAgent {
        id: String,
        #[serde(default)]
        force: bool,
    },

    /// `fm exec`
    Exec {
        agent_id: String,
        argv: Vec<String>,
        #[serde(default)]
        cwd: Option<PathBuf>,
        #[serde(with = "duration_ms")]
        hard_timeout: Duration,
        #[serde(default, with = "opt_duration_ms")]
        warn_timeout: Option<Duration>,
    },

    /// `fm message` — send input bytes to one or more agents' sessions.
    Message {
        agent_ids: Vec<String>,
        bytes: Vec<u8>,
        #[serde(default)]
        on_error: OnError,
    },

    /// `fm push` / `fm pull` / `fm pair`
    Transfer {
        agent_id: String,
        /// Transfer mode name (e.g. `copy`, `rsync`, `vcs-push`).
        mode: String,
        source: PathBuf,
        target: PathBuf,
    },

    /// Stop a backgrounded `fm pair` watch loop (§4.4) for an agent.
    StopTransfer { agent_id: String },

    /// `fm rename`
    Rename { agent_id: String, new_name: String },

    /// `fm snapshot`
    Snapshot { host_id: String },

    /// `fm gc`
    Gc {
        #[serde(default)]
        dry_run: bool,
        /// Categories to sweep; empty means every category (§4.10).
        #[serde(default)]
        categories: Vec<GcCategory>,
        /// Only reclaim resources whose host/agent name contains one of
        /// these substrings. Empty means no include filter.
        #[serde(default)]
        include: Vec<String>,
        /// Skip resources whose host/agent name contains one of these
        /// substrings, even if they otherwise match.
        #[serde(default)]
        exclude: Vec<String>,
        /// Scope the sweep to a single provider's hosts.
        #[serde(default)]
        provider: Option<ProviderKind>,
        #[serde(default)]
        on_error: OnError,
    },

    /// `fm provision` — re-run an agent's provisioning pipeline.
    Provision { agent_id: String },

    /// `fm limit` — adjust a running host's resource allocation.
    SetLimit { host_id: String, resource: Resource },

    /// Connect to an agent's terminal via the daemon's session proxy.
    AgentAttach {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
    },
}

/// Whether a multi-target operation (`fm message`, `fm gc`) keeps going
/// after one target fails, or stops at the first failure (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnError {
    Abort,
    #[default]
    Continue,
}

/// `fm gc` reclaim categories (§4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GcCategory {
    WorkDirs,
    Logs,
    BuildCache,
    Machines,
    Snapshots,
    Volumes,
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
#[path = "request_tests.rs"]
mod tests;
