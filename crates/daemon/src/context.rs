// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared daemon state (`DaemonContext`), passed by reference into every
//! module in this crate. Grounded on the teacher's `ListenCtx`
//! (`daemon/src/listener/mod.rs`): one `Arc`-friendly struct bundling every
//! collaborator an operation needs, rather than a global.
//!
//! Generic over [`Clock`] and [`NotifyAdapter`] the same way
//! `fm_engine::ProvisionExecutor` is generic over `Clock` — both traits
//! require `Clone`, which rules out a trait object, so tests substitute
//! `FakeClock`/`FakeNotifyAdapter` by type parameter instead.

use std::collections::HashMap;
use std::sync::Arc;

use fm_adapters::{DesktopNotifyAdapter, NotifyAdapter, ProviderRouter, SessionAdapter};
use fm_core::{Clock, SystemClock};
use fm_storage::{ActivityStore, LockTable, StateStore, TombstoneSweeper};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Everything an `fmd` operation needs: the three storage collaborators
/// (C2), the provider router (C3), the session adapter (C4), a notifier,
/// a clock, and the two naming knobs from §6 (`FM_ROOT_NAME`/`FM_PREFIX`).
#[derive(Clone)]
pub struct DaemonContext<C: Clock = SystemClock, N: NotifyAdapter = DesktopNotifyAdapter> {
    pub store: StateStore,
    pub activity: ActivityStore,
    pub locks: LockTable,
    pub tombstones: TombstoneSweeper,
    pub providers: Arc<ProviderRouter>,
    pub session: Arc<dyn SessionAdapter>,
    pub notify: N,
    pub clock: C,
    /// `FM_ROOT_NAME`, stamped onto every provider-side resource tag (§4.1).
    pub root_name: String,
    /// `FM_PREFIX`, prepended to every session name (§6).
    pub session_prefix: String,
    /// Cancellation handles for backgrounded `fm pair` watch loops,
    /// keyed by agent id, so a later `StopTransfer` request can reach
    /// the task a prior `Transfer { mode: "pair" }` spawned.
    pub pair_tasks: Arc<Mutex<HashMap<String, CancellationToken>>>,
    /// Daemon-wide cancellation source (§5: "every operation must accept
    /// a cancellation signal"). Cancelled when a `Shutdown` request is
    /// received, so any `fmd::lifecycle` entry point already in flight on
    /// another connection unwinds instead of completing a step against a
    /// provider the daemon is about to stop supervising. Cloned into each
    /// lifecycle call rather than held as the one true token, the same
    /// way `pair_tasks` hands out a clone per watch loop.
    pub shutdown: CancellationToken,
}

/// Concrete daemon context used by `fmd`'s `main.rs`; library consumers
/// that need a different clock or notifier (tests, mainly) instantiate
/// `DaemonContext<FakeClock, FakeNotifyAdapter>` directly.
pub type Daemon = DaemonContext<SystemClock, DesktopNotifyAdapter>;

impl<C: Clock, N: NotifyAdapter> DaemonContext<C, N> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: StateStore,
        activity: ActivityStore,
        locks: LockTable,
        tombstones: TombstoneSweeper,
        providers: Arc<ProviderRouter>,
        session: Arc<dyn SessionAdapter>,
        notify: N,
        clock: C,
        root_name: impl Into<String>,
        session_prefix: impl Into<String>,
    ) -> Self {
        Self {
            store,
            activity,
            locks,
            tombstones,
            providers,
            session,
            notify,
            clock,
            root_name: root_name.into(),
            session_prefix: session_prefix.into(),
            pair_tasks: Arc::new(Mutex::new(HashMap::new())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Builds the multiplexer session name for an agent (C1, `fm_core::naming`).
    pub fn session_name(&self, agent_name: &str) -> fm_core::SessionId {
        fm_core::SessionId::new(fm_core::naming::session_name(&self.session_prefix, agent_name))
    }
}
