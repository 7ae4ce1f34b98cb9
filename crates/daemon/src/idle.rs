// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle Supervisor (C9, §4.9): periodically checks every running agent's
//! enabled activity signals and stops it once all of them have gone quiet
//! for longer than its `idle_timeout_seconds`.
//!
//! Grounded on the teacher's `daemon/src/engine/scheduler.rs` poll-loop
//! shape (a single `tokio::time::interval` tick driving a scan over live
//! work, rather than one task per item) — here the "work" is running
//! agents instead of queued jobs, and the idle check reads
//! [`fm_storage::ActivityStore`] mtimes instead of a job heartbeat.

use std::time::Duration;

use fm_adapters::NotifyAdapter;
use fm_core::{AgentId, AgentStatus, Clock, IdleMode};
use fm_storage::StoreError;
use thiserror::Error;
use tracing::{info, warn};

use crate::context::DaemonContext;
use crate::lifecycle::{self, LifecycleError};

#[derive(Debug, Error)]
pub enum IdleError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Activity sources each [`IdleMode`] treats as resetting the idle clock.
/// `run` additionally requires the session itself to still be alive —
/// handled separately in [`is_idle`] since it isn't a file mtime.
fn enabled_sources(mode: IdleMode) -> &'static [&'static str] {
    match mode {
        IdleMode::Io => &["user", "agent", "ssh", "create", "boot"],
        IdleMode::User => &["user", "ssh", "create", "boot"],
        IdleMode::Agent => &["agent", "ssh", "create", "boot"],
        IdleMode::Ssh => &["ssh", "create", "boot"],
        IdleMode::Create => &["create"],
        IdleMode::Boot => &["boot"],
        IdleMode::Start => &["boot"],
        IdleMode::Run => &["create", "boot"],
        IdleMode::Disabled => &[],
    }
}

/// Evaluates whether a single agent is idle right now.
async fn is_idle<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host_id: &fm_core::HostId,
    agent: &fm_core::AgentDescriptor,
) -> bool {
    if agent.idle_mode == IdleMode::Disabled {
        return false;
    }
    if agent.idle_mode == IdleMode::Run {
        let session = ctx.session_name(&agent.name);
        let host = match ctx.store.read_host(host_id) {
            Ok(h) => h,
            Err(_) => return false,
        };
        if ctx.session.has(&host, &session).await.unwrap_or(true) {
            return false;
        }
    }
    let now = ctx.clock.epoch_ms();
    let sources = enabled_sources(agent.idle_mode);
    if sources.is_empty() {
        return false;
    }
    let timeout_ms = agent.idle_timeout_seconds.saturating_mul(1000);
    match ctx.activity.latest(host_id, sources) {
        Some(last) => now.saturating_sub(last) >= timeout_ms,
        // No activity recorded at all since the agent started: idle only
        // once it has lived at least the timeout.
        None => now.saturating_sub(agent.started_at_epoch_ms.unwrap_or(agent.created_at_epoch_ms)) >= timeout_ms,
    }
}

/// One scan over every running agent, stopping whichever are idle.
/// Returns the agents it stopped.
pub async fn poll_once<C: Clock, N: NotifyAdapter>(ctx: &DaemonContext<C, N>) -> Result<Vec<AgentId>, IdleError> {
    let mut stopped = Vec::new();
    for host in ctx.store.list_hosts()? {
        if host.destroyed {
            continue;
        }
        for agent in ctx.store.list_agents_on_host(&host.id)? {
            if agent.status != AgentStatus::Running {
                continue;
            }
            if is_idle(ctx, &host.id, &agent).await {
                info!(agent = %agent.id, host = %host.id, "idle timeout reached, stopping");
                match lifecycle::stop_agent(ctx, agent.id.as_str()).await {
                    Ok(_) => stopped.push(agent.id),
                    Err(LifecycleError::HostLocked) => {
                        // Another operation is already touching this host;
                        // the next tick will retry.
                    }
                    Err(e) => warn!(agent = %agent.id, error = %e, "idle stop failed"),
                }
            }
        }
    }
    Ok(stopped)
}

/// Runs [`poll_once`] on a fixed interval until the daemon shuts down.
pub async fn run<C: Clock, N: NotifyAdapter>(ctx: DaemonContext<C, N>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if let Err(e) = poll_once(&ctx).await {
            warn!(error = %e, "idle supervisor poll failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_mode_has_no_enabled_sources() {
        assert!(enabled_sources(IdleMode::Disabled).is_empty());
    }

    #[test]
    fn only_create_and_boot_are_tamper_resistant_sources() {
        for src in enabled_sources(IdleMode::Create) {
            assert!(["create"].contains(src));
        }
        for src in enabled_sources(IdleMode::Boot) {
            assert!(["boot"].contains(src));
        }
    }

    #[test]
    fn start_mode_mirrors_boot() {
        assert_eq!(enabled_sources(IdleMode::Start), enabled_sources(IdleMode::Boot));
    }

    #[test]
    fn io_mode_enables_every_forgeable_and_tamper_resistant_source() {
        let sources = enabled_sources(IdleMode::Io);
        for expected in ["user", "agent", "ssh", "create", "boot"] {
            assert!(sources.contains(&expected));
        }
    }
}
