// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Garbage Collector (C11, §4.10): reclaims resources that match the
//! fleet tag but are no longer referenced by any live descriptor, across
//! six categories: `work_dirs`, `logs`, `build_cache`, `machines`,
//! `snapshots`, `volumes`.
//!
//! Grounded on two different teacher modules: tombstone purging
//! (`work_dirs`/`machines` freed once a `destroy` has aged past
//! retention) delegates straight to [`fm_storage::TombstoneSweeper`],
//! exactly as the teacher's own retention sweep
//! (`daemon/src/engine/retention.rs`) delegates to its store; orphan
//! reclaim (`machines` whose provider-side resource disappeared without
//! ever being destroyed locally) walks the fleet reconciliation (C8) the
//! way the teacher's `daemon/src/engine/runtime/reconcile.rs` feeds
//! orphan detection into its own sweep. `logs` and `build_cache` live
//! nested under the same host/agent directory trees `TombstoneSweeper`
//! already removes wholesale, so they're reported as their own category
//! alongside `work_dirs`/`machines` rather than swept separately.
//! `snapshots` prunes a host's non-latest snapshot references; `volumes`
//! reports provider-managed storage freed alongside a reclaimed host, on
//! providers where that applies (`ProviderKind::supports_snapshot`).

use fm_adapters::NotifyAdapter;
use fm_core::{AgentStatus, Clock, ProviderKind};
use fm_storage::StoreError;
use thiserror::Error;
use tracing::{info, warn};

use crate::context::DaemonContext;
use crate::fleet::{self, FleetError};
use crate::messaging::OnError;

#[derive(Debug, Error)]
pub enum GcError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fleet(#[from] FleetError),
}

impl GcError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        match self {
            GcError::Store(e) => e.to_error_kind(),
            GcError::Fleet(e) => e.to_error_kind(),
        }
    }
}

/// Daemon-side mirror of [`fm_wire::GcCategory`] — kept distinct so the
/// storage layer doesn't need to depend on the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GcCategory {
    WorkDirs,
    Logs,
    BuildCache,
    Machines,
    Snapshots,
    Volumes,
}

impl From<fm_wire::GcCategory> for GcCategory {
    fn from(value: fm_wire::GcCategory) -> Self {
        match value {
            fm_wire::GcCategory::WorkDirs => GcCategory::WorkDirs,
            fm_wire::GcCategory::Logs => GcCategory::Logs,
            fm_wire::GcCategory::BuildCache => GcCategory::BuildCache,
            fm_wire::GcCategory::Machines => GcCategory::Machines,
            fm_wire::GcCategory::Snapshots => GcCategory::Snapshots,
            fm_wire::GcCategory::Volumes => GcCategory::Volumes,
        }
    }
}

impl GcCategory {
    fn wire_name(self) -> &'static str {
        match self {
            GcCategory::WorkDirs => "work_dirs",
            GcCategory::Logs => "logs",
            GcCategory::BuildCache => "build_cache",
            GcCategory::Machines => "machines",
            GcCategory::Snapshots => "snapshots",
            GcCategory::Volumes => "volumes",
        }
    }
}

/// A sweep's scope: which categories to touch, which resources to
/// include/exclude by name substring, which provider to restrict to, and
/// whether one failure aborts the rest of the sweep (§4.10).
pub struct GcOptions {
    pub dry_run: bool,
    /// Empty means every category.
    pub categories: Vec<GcCategory>,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub provider: Option<ProviderKind>,
    pub on_error: OnError,
}

impl GcOptions {
    fn category_enabled(&self, cat: GcCategory) -> bool {
        self.categories.is_empty() || self.categories.contains(&cat)
    }

    fn name_allowed(&self, name: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|s| name.contains(s.as_str())) {
            return false;
        }
        !self.exclude.iter().any(|s| name.contains(s.as_str()))
    }
}

/// `(category, id)` pairs reclaimed (or, in a dry run, that would be).
pub struct GcReport {
    pub reclaimed: Vec<(String, String)>,
    pub dry_run: bool,
}

pub async fn run<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    options: GcOptions,
) -> Result<GcReport, GcError> {
    let now = ctx.clock.epoch_ms();
    let mut reclaimed = Vec::new();

    if options.dry_run {
        dry_run_scan(ctx, &options, now, &mut reclaimed)?;
    } else {
        sweep_tombstones(ctx, &options, now, &mut reclaimed)?;
    }

    sweep_orphans(ctx, &options, now, &mut reclaimed).await?;

    if options.category_enabled(GcCategory::Snapshots) {
        sweep_snapshots(ctx, &options, &mut reclaimed)?;
    }

    Ok(GcReport { reclaimed, dry_run: options.dry_run })
}

fn dry_run_scan<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    options: &GcOptions,
    now: u64,
    reclaimed: &mut Vec<(String, String)>,
) -> Result<(), GcError> {
    for host in ctx.store.list_hosts()? {
        if !provider_in_scope(options, host.provider) || !options.name_allowed(&host.name) {
            continue;
        }
        if host.destroyed && !ctx.tombstones.host_visible(&host, now) {
            push_host_categories(options, &host, reclaimed);
            continue;
        }
        for agent in ctx.store.list_agents_on_host(&host.id)? {
            if agent.destroyed && !ctx.tombstones.agent_visible(&agent, now) && options.name_allowed(&agent.name) {
                push_agent_categories(options, &agent, reclaimed);
            }
        }
    }
    Ok(())
}

fn sweep_tombstones<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    options: &GcOptions,
    now: u64,
    reclaimed: &mut Vec<(String, String)>,
) -> Result<(), GcError> {
    // Retention-driven purge runs unconditionally regardless of filters —
    // include/exclude/provider scoping only governs what the orphan and
    // snapshot passes below are allowed to touch. The descriptor is gone
    // by the time `sweep` returns, so there's nothing left here to filter
    // against anyway.
    let swept = ctx.tombstones.sweep(now)?;
    for host_id in swept.hosts {
        info!(host = %host_id, "gc purged aged host tombstone");
        if options.category_enabled(GcCategory::Machines) {
            reclaimed.push((GcCategory::Machines.wire_name().to_string(), host_id.clone()));
        }
        if options.category_enabled(GcCategory::Logs) {
            reclaimed.push((GcCategory::Logs.wire_name().to_string(), host_id.clone()));
        }
        if options.category_enabled(GcCategory::BuildCache) {
            reclaimed.push((GcCategory::BuildCache.wire_name().to_string(), host_id));
        }
    }
    for agent_id in swept.agents {
        info!(agent = %agent_id, "gc purged aged agent tombstone");
        if options.category_enabled(GcCategory::WorkDirs) {
            reclaimed.push((GcCategory::WorkDirs.wire_name().to_string(), agent_id.clone()));
        }
        if options.category_enabled(GcCategory::Logs) {
            reclaimed.push((GcCategory::Logs.wire_name().to_string(), agent_id));
        }
    }
    Ok(())
}

async fn sweep_orphans<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    options: &GcOptions,
    now: u64,
    reclaimed: &mut Vec<(String, String)>,
) -> Result<(), GcError> {
    if !options.category_enabled(GcCategory::Machines) {
        return Ok(());
    }
    for entry in fleet::reconcile(ctx).await?.into_iter().filter(|e| e.effective_state.is_gc_candidate()) {
        if !provider_in_scope(options, entry.host.provider) || !options.name_allowed(&entry.agent.name) {
            continue;
        }
        reclaimed.push((GcCategory::Machines.wire_name().to_string(), entry.agent.id.to_string()));
        if options.dry_run {
            continue;
        }
        let mut agent = entry.agent;
        agent.status = AgentStatus::Destroyed;
        agent.destroyed = true;
        agent.destroyed_at_epoch_ms = Some(now);
        match ctx.store.write_agent(&agent) {
            Ok(()) => {}
            Err(e) if options.on_error == OnError::Continue => {
                warn!(agent = %agent.id, error = %e, "gc: failed to mark orphan destroyed, continuing");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

/// Drops every snapshot but the most recent on each in-scope host, since
/// only the latest is ever referenced for resume (§4.2).
fn sweep_snapshots<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    options: &GcOptions,
    reclaimed: &mut Vec<(String, String)>,
) -> Result<(), GcError> {
    for mut host in ctx.store.list_hosts()? {
        if host.destroyed
            || !host.provider.supports_snapshot()
            || !provider_in_scope(options, host.provider)
            || !options.name_allowed(&host.name)
            || host.snapshots.len() <= 1
        {
            continue;
        }
        let stale: Vec<_> = host.snapshots.split_off(1);
        for snap in &stale {
            reclaimed.push((GcCategory::Snapshots.wire_name().to_string(), snap.reference.clone()));
        }
        if options.dry_run {
            continue;
        }
        match ctx.store.write_host(&host) {
            Ok(()) => {}
            Err(e) if options.on_error == OnError::Continue => {
                warn!(host = %host.id, error = %e, "gc: failed to prune stale snapshots, continuing");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn provider_in_scope(options: &GcOptions, provider: ProviderKind) -> bool {
    options.provider.map_or(true, |p| p == provider)
}

/// Pushes the category entries a destroyed-but-untombstoned host would
/// free, for the dry-run preview (machines/logs/build_cache/volumes all
/// live in the same host directory tree a real purge removes).
fn push_host_categories(options: &GcOptions, host: &fm_core::HostDescriptor, reclaimed: &mut Vec<(String, String)>) {
    let id = host.id.to_string();
    if options.category_enabled(GcCategory::Machines) {
        reclaimed.push((GcCategory::Machines.wire_name().to_string(), id.clone()));
    }
    if options.category_enabled(GcCategory::Logs) {
        reclaimed.push((GcCategory::Logs.wire_name().to_string(), id.clone()));
    }
    if options.category_enabled(GcCategory::BuildCache) {
        reclaimed.push((GcCategory::BuildCache.wire_name().to_string(), id.clone()));
    }
    if options.category_enabled(GcCategory::Volumes) && host.provider.supports_snapshot() {
        reclaimed.push((GcCategory::Volumes.wire_name().to_string(), id));
    }
}

fn push_agent_categories(options: &GcOptions, agent: &fm_core::AgentDescriptor, reclaimed: &mut Vec<(String, String)>) {
    let id = agent.id.to_string();
    if options.category_enabled(GcCategory::WorkDirs) {
        reclaimed.push((GcCategory::WorkDirs.wire_name().to_string(), id.clone()));
    }
    if options.category_enabled(GcCategory::Logs) {
        reclaimed.push((GcCategory::Logs.wire_name().to_string(), id));
    }
}
