// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Query types for reading daemon state.

use serde::{Deserialize, Serialize};

/// Read-only queries answered from the daemon's in-memory fleet state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// List all known hosts.
    ListHosts,
    /// Get a single host by ID (prefix match supported).
    GetHost { id: String },
    /// List agents, optionally filtered to a single host.
    ListAgents {
        #[serde(default)]
        host_id: Option<String>,
    },
    /// Get a single agent by ID (prefix match supported).
    GetAgent { id: String },
    /// Reconciled fleet status across every host/agent pair (§4.8).
    FleetStatus,
    /// Host-level operation logs.
    GetHostLogs {
        id: String,
        /// Number of most recent lines to return (0 = all).
        lines: usize,
        /// Byte offset for incremental reads (0 = start of file).
        #[serde(default)]
        offset: u64,
    },
    /// Agent logs.
    GetAgentLogs {
        id: String,
        lines: usize,
        #[serde(default)]
        offset: u64,
    },
    /// Provisioning run for an agent, if one has been recorded.
    GetProvisionRun { agent_id: String },
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
