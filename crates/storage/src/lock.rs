// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host mutation lock (§3 invariant 7, §4.2 "mutual exclusion").
//!
//! A lock is a `fm_core::HostLock` value written next to the host
//! descriptor. Acquisition is a read-check-write over the descriptor's
//! `lock` field, guarded in-process by a [`LockTable`] so two operations in
//! the same daemon process never race on the same host, and across
//! processes by PID-liveness plus age-based staleness detection (§4.2
//! "crash recovery"), grounded on the teacher's lock-holder round-trip
//! idiom (`core/src/owner.rs`).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use fm_core::{Clock, HostId, HostLock};
use parking_lot::Mutex;

/// Default staleness window: a lock older than this, whose holder process
/// is no longer alive, is eligible for reclamation by the next operation.
pub const DEFAULT_STALE_AGE: Duration = Duration::from_secs(5 * 60);

/// Returns `true` if a process with the given PID currently exists.
#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;
    // Signal 0 performs no-op existence/permission checking (§4.2 "owner PID gone").
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    true
}

/// Whether a recorded [`HostLock`] may be reclaimed by a new operation: its
/// holder PID is gone, or (for non-PID holders, e.g. a remote daemon) it has
/// simply aged out.
pub fn is_reclaimable(lock: &HostLock, now_epoch_ms: u64, stale_age: Duration) -> bool {
    match lock.holder_pid() {
        Some(pid) => !pid_alive(pid),
        None => lock.is_stale_by_age(now_epoch_ms, stale_age),
    }
}

/// In-process guard against two concurrent operations racing on the host
/// lock before either has persisted it to disk — spec §5 "all
/// state-mutating operations [within a host] are totally ordered by the
/// host lock".
#[derive(Clone, Default)]
pub struct LockTable {
    inner: Arc<Mutex<HashMap<HostId, ()>>>,
}

impl LockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempts to reserve `host_id` in this process. Returns `None` if
    /// another in-process caller is already mid-acquisition for this host.
    pub fn try_reserve(&self, host_id: &HostId) -> Option<HostLockGuard> {
        let mut guard = self.inner.lock();
        if guard.contains_key(host_id) {
            return None;
        }
        guard.insert(host_id.clone(), ());
        Some(HostLockGuard { table: self.clone(), host_id: host_id.clone() })
    }
}

/// RAII in-process reservation released on drop.
pub struct HostLockGuard {
    table: LockTable,
    host_id: HostId,
}

impl Drop for HostLockGuard {
    fn drop(&mut self) {
        self.table.inner.lock().remove(&self.host_id);
    }
}

/// Builds the holder tag for this daemon process (`"pid:<n>"`), matching
/// [`HostLock::holder_pid`]'s expected format.
pub fn local_holder_tag() -> String {
    format!("pid:{}", std::process::id())
}

/// Constructs a fresh lock for `operation`, held by this process, stamped
/// with `clock`'s current time.
pub fn new_lock(operation: impl Into<String>, clock: &impl Clock) -> HostLock {
    HostLock::new(operation, local_holder_tag(), clock.epoch_ms())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::FakeClock;

    #[test]
    fn own_pid_is_never_reclaimable_by_age_alone() {
        let clock = FakeClock::new();
        let lock = new_lock("create", &clock);
        assert!(!is_reclaimable(&lock, clock.epoch_ms(), DEFAULT_STALE_AGE));
    }

    #[test]
    fn bogus_pid_lock_is_reclaimable() {
        let lock = HostLock::new("create", "pid:999999999", 0);
        assert!(is_reclaimable(&lock, 0, DEFAULT_STALE_AGE));
    }

    #[test]
    fn non_pid_holder_falls_back_to_age() {
        let lock = HostLock::new("create", "remote:worker-1", 0);
        assert!(!is_reclaimable(&lock, 1_000, DEFAULT_STALE_AGE));
        assert!(is_reclaimable(&lock, DEFAULT_STALE_AGE.as_millis() as u64 + 1, DEFAULT_STALE_AGE));
    }

    #[test]
    fn lock_table_prevents_concurrent_in_process_reservation() {
        let table = LockTable::new();
        let host = HostId::new();
        let guard = table.try_reserve(&host).expect("first reservation succeeds");
        assert!(table.try_reserve(&host).is_none());
        drop(guard);
        assert!(table.try_reserve(&host).is_some());
    }
}
