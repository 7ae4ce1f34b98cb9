// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet enumerator DTOs (C8, §4.8).
//!
//! Grounded on the teacher's `AgentRecord` (`core/src/agent_record.rs`): a
//! unified view derived from multiple sources of truth. `fmd::fleet` (the
//! actual C8 reconciler) produces these; `fm-wire` serializes them over IPC;
//! the `fm` CLI renders them.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentDescriptor, AgentStatus};
use crate::host::HostDescriptor;

/// The reconciled state of a single agent after unioning the three sources
/// of truth in §4.8's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveState {
    Running,
    /// Descriptor says running, session is gone: offer to gc.
    Exited,
    Stopped,
    /// Provider-side resource is gone though local metadata still knows of
    /// it: gc candidate.
    Orphaned,
    /// Tombstone.
    Destroyed,
}

crate::simple_display! {
    EffectiveState {
        Running => "running",
        Exited => "exited",
        Stopped => "stopped",
        Orphaned => "orphaned",
        Destroyed => "destroyed",
    }
}

impl EffectiveState {
    /// Implements the §4.8 reconciliation table.
    pub fn reconcile(descriptor_status: AgentStatus, provider_resource_exists: bool, session_present: bool) -> Self {
        if descriptor_status == AgentStatus::Destroyed {
            return EffectiveState::Destroyed;
        }
        if !provider_resource_exists {
            return EffectiveState::Orphaned;
        }
        match (descriptor_status, session_present) {
            (AgentStatus::Running, true) => EffectiveState::Running,
            (AgentStatus::Running, false) => EffectiveState::Exited,
            (AgentStatus::Stopped, _) => EffectiveState::Stopped,
            (AgentStatus::Creating, _) | (AgentStatus::Destroying, _) => EffectiveState::Stopped,
            (AgentStatus::Destroyed, _) => EffectiveState::Destroyed,
        }
    }

    /// Whether this agent is a candidate the garbage collector should offer
    /// to reclaim.
    pub fn is_gc_candidate(self) -> bool {
        matches!(self, EffectiveState::Exited | EffectiveState::Orphaned)
    }
}

/// One row of the fleet view: an agent merged with its host context and
/// derived effective state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetEntry {
    pub agent: AgentDescriptor,
    pub host: HostDescriptor,
    pub effective_state: EffectiveState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_descriptor_with_live_session_is_running() {
        assert_eq!(
            EffectiveState::reconcile(AgentStatus::Running, true, true),
            EffectiveState::Running
        );
    }

    #[test]
    fn running_descriptor_without_session_is_exited() {
        assert_eq!(
            EffectiveState::reconcile(AgentStatus::Running, true, false),
            EffectiveState::Exited
        );
    }

    #[test]
    fn missing_provider_resource_is_orphaned_regardless_of_descriptor() {
        assert_eq!(
            EffectiveState::reconcile(AgentStatus::Stopped, false, false),
            EffectiveState::Orphaned
        );
    }

    #[test]
    fn destroyed_descriptor_is_always_destroyed() {
        assert_eq!(
            EffectiveState::reconcile(AgentStatus::Destroyed, true, true),
            EffectiveState::Destroyed
        );
    }

    #[test]
    fn gc_candidates_are_exited_or_orphaned() {
        assert!(EffectiveState::Exited.is_gc_candidate());
        assert!(EffectiveState::Orphaned.is_gc_candidate());
        assert!(!EffectiveState::Running.is_gc_candidate());
        assert!(!EffectiveState::Destroyed.is_gc_candidate());
    }
}
