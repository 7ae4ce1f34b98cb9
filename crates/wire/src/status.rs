// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet-wide status rollup, the wire counterpart of `fm_core::FleetEntry`
//! (§4.8).

use fm_core::{AgentStatus, EffectiveState, HostStatus, ProviderKind};
use serde::{Deserialize, Serialize};

/// One reconciled (host, agent) row for `fm list --all` / `Query::FleetStatus`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetStatusEntry {
    pub host_id: String,
    pub host_name: String,
    pub host_status: HostStatus,
    pub host_provider: ProviderKind,
    pub agent_id: String,
    pub agent_name: String,
    pub agent_status: AgentStatus,
    pub effective_state: EffectiveState,
    pub is_gc_candidate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let entry = FleetStatusEntry {
            host_id: "hst-a".into(),
            host_name: "box".into(),
            host_status: HostStatus::Running,
            host_provider: ProviderKind::Local,
            agent_id: "agt-a".into(),
            agent_name: "worker".into(),
            agent_status: AgentStatus::Running,
            effective_state: EffectiveState::Running,
            is_gc_candidate: false,
        };
        let json = serde_json::to_string(&entry).unwrap();
        let back: FleetStatusEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }
}
