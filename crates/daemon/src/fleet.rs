// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fleet Enumerator (C8, §4.8): merges local descriptors, provider-side
//! resource presence, and live session presence into one reconciled view.
//!
//! Grounded on the teacher's `daemon/src/engine/runtime/reconcile.rs`: a
//! single pass over local records cross-checked against the backend's own
//! listing, rather than trusting local state alone — the same shape, fed
//! through [`fm_core::EffectiveState::reconcile`] instead of the teacher's
//! job-queue reconciliation rules.

use std::collections::HashSet;

use fm_adapters::{ListHostsFilter, NotifyAdapter, Provider, SessionError};
use fm_core::{Clock, EffectiveState, FleetEntry};
use fm_storage::StoreError;
use fm_wire::FleetStatusEntry;
use thiserror::Error;

use crate::context::DaemonContext;

#[derive(Debug, Error)]
pub enum FleetError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl FleetError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        match self {
            FleetError::Store(e) => e.to_error_kind(),
            FleetError::Session(e) => e.to_error_kind(),
        }
    }
}

/// Produces one [`FleetEntry`] per agent, reconciled per the §4.8 table.
/// Provider unreachability degrades to "nothing reported live" rather than
/// failing the whole enumeration — a fleet-wide view shouldn't go dark
/// because one backend timed out.
pub async fn reconcile<C: Clock, N: NotifyAdapter>(ctx: &DaemonContext<C, N>) -> Result<Vec<FleetEntry>, FleetError> {
    let hosts = ctx.store.list_hosts()?;
    let filter = ListHostsFilter { fleet_tag: Some(ctx.root_name.clone()) };
    let provider_hosts = ctx.providers.list_hosts(&filter).await.unwrap_or_default();
    let live_host_ids: HashSet<&str> =
        provider_hosts.iter().filter_map(|info| info.tags.get("host_id").map(String::as_str)).collect();

    let mut entries = Vec::new();
    for host in hosts {
        let host_live = live_host_ids.contains(host.id.as_str());
        for mut agent in ctx.store.list_agents_on_host(&host.id)? {
            if let Some(pending) = agent.pending_rename_to.clone() {
                complete_stuck_rename(ctx, &host, &mut agent, &pending).await?;
            }
            let session = ctx.session_name(&agent.name);
            let session_present = ctx.session.has(&host, &session).await.unwrap_or(false);
            let effective_state = EffectiveState::reconcile(agent.status, host_live, session_present);
            entries.push(FleetEntry { agent, host: host.clone(), effective_state });
        }
    }
    Ok(entries)
}

/// Finishes a §4.6 rename left mid-flight by a crash anywhere in the
/// window between persisting `pending_rename_to` and clearing it. Two
/// crash points land here, and both must be resumable — the next
/// orchestrator invocation, not just a retried call with the same
/// arguments, is what §8 scenario 6 requires to complete it:
/// - crash after `ctx.session.rename` but before the trailing descriptor
///   write: the new session already exists, so only the write was lost.
/// - crash after persisting `pending_rename_to` but before the session
///   rename ran at all: the old session is still live under its old name
///   and the new one doesn't exist yet, so the rename itself never
///   happened and must be re-invoked before the descriptor is updated.
async fn complete_stuck_rename<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &fm_core::HostDescriptor,
    agent: &mut fm_core::AgentDescriptor,
    pending_name: &str,
) -> Result<(), FleetError> {
    let pending_session = ctx.session_name(pending_name);
    let old_session = ctx.session_name(&agent.name);
    let new_exists = ctx.session.has(host, &pending_session).await.unwrap_or(false);
    if !new_exists {
        let old_exists = ctx.session.has(host, &old_session).await.unwrap_or(false);
        if old_exists {
            ctx.session.rename(host, &old_session, &pending_session).await?;
        }
    }
    agent.name = pending_name.to_string();
    agent.pending_rename_to = None;
    ctx.store.write_agent(agent)?;
    Ok(())
}

/// Projects a [`FleetEntry`] to the flat DTO the wire protocol carries.
pub fn to_status_entry(entry: &FleetEntry) -> FleetStatusEntry {
    FleetStatusEntry {
        host_id: entry.host.id.to_string(),
        host_name: entry.host.name.clone(),
        host_status: entry.host.status,
        host_provider: entry.host.provider,
        agent_id: entry.agent.id.to_string(),
        agent_name: entry.agent.name.clone(),
        agent_status: entry.agent.status,
        effective_state: entry.effective_state,
        is_gc_candidate: entry.effective_state.is_gc_candidate(),
    }
}
