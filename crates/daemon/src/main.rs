// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fmd`: the fleet daemon binary. Resolves its data directory and socket
//! path from the environment (§6), wires up storage, providers, and the
//! session adapter, then serves the Unix socket listener until told to
//! shut down.

use std::collections::BTreeMap;
use std::sync::Arc;

use fm_adapters::provider::{ContainerProvider, LocalProvider, ProviderRouter, SecureShellProvider};
use fm_adapters::{DesktopNotifyAdapter, TmuxSessionAdapter};
use fm_core::SystemClock;
use fm_daemon::context::DaemonContext;
use fm_storage::{ActivityStore, Layout, LockTable, StateStore, TombstoneSweeper};
use fm_storage::lock::DEFAULT_STALE_AGE;
use tracing_subscriber::EnvFilter;

mod tracing_init {
    pub fn init(root: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
        let file_appender = tracing_appender::rolling::daily(root, "fmd.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_writer(non_blocking)
            .with_ansi(false)
            .init();
        guard
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let root_name = fm_daemon::env::root_name();
    let session_prefix = fm_daemon::env::session_prefix(&root_name);
    let root_dir = fm_daemon::env::host_dir(&root_name);
    std::fs::create_dir_all(&root_dir)?;
    let _log_guard = tracing_init::init(&root_dir);

    tracing::info!(root = %root_dir.display(), "fmd starting");

    let layout = Layout::new(&root_dir);
    let store = StateStore::new(layout);
    let activity = ActivityStore::new(store.layout().clone());
    let locks = LockTable::new();
    let tombstones = TombstoneSweeper::new(store.clone());

    let mut router = ProviderRouter::new()
        .register(fm_core::ProviderKind::Local, Arc::new(LocalProvider::new()))
        .register(fm_core::ProviderKind::Container, Arc::new(ContainerProvider::new()));
    router = router.register(fm_core::ProviderKind::SecureShell, Arc::new(SecureShellProvider::new(BTreeMap::new())));

    let ctx = DaemonContext::new(
        store,
        activity,
        locks,
        tombstones,
        Arc::new(router),
        Arc::new(TmuxSessionAdapter::new()),
        DesktopNotifyAdapter::default(),
        SystemClock::default(),
        root_name,
        session_prefix,
    );

    if let Err(e) = fm_daemon::lifecycle::resolve_host(&ctx, None, None, ctx.shutdown.clone()).await {
        tracing::warn!(error = %e, "startup host reconcile failed");
    }

    let idle_ctx = ctx.clone();
    tokio::spawn(fm_daemon::idle::run(idle_ctx, fm_daemon::env::idle_poll_interval()));

    let socket_path = fm_daemon::env::socket_path(&root_dir);
    fm_daemon::listener::serve(ctx, &socket_path, fm_daemon::env::ipc_timeout()).await?;
    Ok(())
}
