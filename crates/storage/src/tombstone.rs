// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tombstone retention and pruning (§3 invariant 4, §8 P7).
//!
//! SPEC_FULL §9 resolves the open question on retention scope: tombstones
//! are **persistent** across daemon restarts — `destroyed_at_epoch_ms` lives
//! inside the descriptor itself, so a restart doesn't lose track of how long
//! an entity has been visible as a tombstone. The garbage collector (C11)
//! calls [`TombstoneSweeper::sweep`] on its own schedule; this module only
//! decides which entities have aged out, not when to run.

use fm_core::{AgentDescriptor, HostDescriptor};

use crate::store::{StateStore, StoreError};

/// Default tombstone visibility window (§8 P7 "at least N seconds").
pub const DEFAULT_RETENTION: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// Ids purged by one [`TombstoneSweeper::sweep`] pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweptTombstones {
    pub hosts: Vec<String>,
    pub agents: Vec<String>,
}

impl SweptTombstones {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.agents.is_empty()
    }
}

#[derive(Clone)]
pub struct TombstoneSweeper {
    store: StateStore,
    retention: std::time::Duration,
}

impl TombstoneSweeper {
    pub fn new(store: StateStore) -> Self {
        Self { store, retention: DEFAULT_RETENTION }
    }

    pub fn with_retention(mut self, retention: std::time::Duration) -> Self {
        self.retention = retention;
        self
    }

    fn aged_out(destroyed_at_epoch_ms: Option<u64>, now_epoch_ms: u64, retention_ms: u64) -> bool {
        match destroyed_at_epoch_ms {
            Some(at) => now_epoch_ms.saturating_sub(at) >= retention_ms,
            None => false,
        }
    }

    /// Purges every host (and, transitively, agent) tombstone older than the
    /// retention window. Returns the ids of everything purged, so a caller
    /// reporting reclaimed resources (`fmd::gc`) doesn't have to re-derive
    /// the agent half from a separate pass.
    pub fn sweep(&self, now_epoch_ms: u64) -> Result<SweptTombstones, StoreError> {
        let retention_ms = self.retention.as_millis() as u64;
        let mut hosts = Vec::new();
        let mut agents = Vec::new();
        for host in self.store.list_hosts()? {
            if host.destroyed && Self::aged_out(host.destroyed_at_epoch_ms, now_epoch_ms, retention_ms) {
                self.store.purge_host(&host.id)?;
                hosts.push(host.id.to_string());
                continue;
            }
            for agent in self.store.list_agents_on_host(&host.id)? {
                if agent.destroyed && Self::aged_out(agent.destroyed_at_epoch_ms, now_epoch_ms, retention_ms) {
                    self.store.purge_agent(&host.id, &agent.id)?;
                    agents.push(agent.id.to_string());
                }
            }
        }
        Ok(SweptTombstones { hosts, agents })
    }

    /// Whether `host` should still be reported by `list` (either alive, or a
    /// tombstone still inside its retention window).
    pub fn host_visible(&self, host: &HostDescriptor, now_epoch_ms: u64) -> bool {
        !host.destroyed || !Self::aged_out(host.destroyed_at_epoch_ms, now_epoch_ms, self.retention.as_millis() as u64)
    }

    pub fn agent_visible(&self, agent: &AgentDescriptor, now_epoch_ms: u64) -> bool {
        !agent.destroyed
            || !Self::aged_out(agent.destroyed_at_epoch_ms, now_epoch_ms, self.retention.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;
    use fm_core::{AgentDescriptorBuilder, HostDescriptorBuilder};
    use tempfile::tempdir;

    fn sweeper() -> (tempfile::TempDir, TombstoneSweeper) {
        let dir = tempdir().unwrap();
        let store = StateStore::new(Layout::new(dir.path()));
        let sweeper = TombstoneSweeper::new(store).with_retention(std::time::Duration::from_secs(10));
        (dir, sweeper)
    }

    #[test]
    fn fresh_tombstone_is_visible() {
        let (_dir, sweeper) = sweeper();
        let mut host = HostDescriptorBuilder::default().name("box").build();
        host.destroyed = true;
        host.destroyed_at_epoch_ms = Some(1_000);
        assert!(sweeper.host_visible(&host, 1_500));
    }

    #[test]
    fn aged_tombstone_is_not_visible() {
        let (_dir, sweeper) = sweeper();
        let mut host = HostDescriptorBuilder::default().name("box").build();
        host.destroyed = true;
        host.destroyed_at_epoch_ms = Some(1_000);
        assert!(!sweeper.host_visible(&host, 1_000 + 10_001));
    }

    #[test]
    fn sweep_purges_aged_host_tombstones() {
        let (_dir, sweeper) = sweeper();
        let mut host = HostDescriptorBuilder::default().name("box").build();
        host.destroyed = true;
        host.destroyed_at_epoch_ms = Some(1_000);
        // Access the private store via the sweeper's own write path.
        let store = StateStore::new(sweeper.store.layout().clone());
        store.write_host(&host).unwrap();
        let purged = sweeper.sweep(1_000 + 10_001).unwrap();
        assert_eq!(purged.hosts, vec![host.id.to_string()]);
        assert!(purged.agents.is_empty());
    }

    #[test]
    fn sweep_purges_aged_agent_tombstones_under_a_live_host() {
        let (_dir, sweeper) = sweeper();
        let host = HostDescriptorBuilder::default().name("box").build();
        let store = StateStore::new(sweeper.store.layout().clone());
        store.write_host(&host).unwrap();

        let mut agent = AgentDescriptorBuilder::default().name("old-agent").host_id(host.id.clone()).build();
        agent.destroyed = true;
        agent.destroyed_at_epoch_ms = Some(1_000);
        store.write_agent(&agent).unwrap();

        let swept = sweeper.sweep(1_000 + 10_001).unwrap();
        assert!(swept.hosts.is_empty());
        assert_eq!(swept.agents, vec![agent.id.to_string()]);
    }

    #[test]
    fn non_destroyed_host_is_never_swept() {
        let (_dir, sweeper) = sweeper();
        let host = HostDescriptorBuilder::default().name("box").build();
        let store = StateStore::new(sweeper.store.layout().clone());
        store.write_host(&host).unwrap();
        let purged = sweeper.sweep(u64::MAX).unwrap();
        assert!(purged.is_empty());
    }
}
