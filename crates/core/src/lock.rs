// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host mutation lock (§3 invariant 7, §4.2).
//!
//! Grounded on the teacher's `OwnerId` Display/parse round-trip idiom
//! (`core/src/owner.rs`): a small value type that a higher layer
//! (`fm-storage`) persists next to the host descriptor and uses to decide
//! whether a stale lock can be reclaimed. This module only knows about
//! elapsed time; PID-liveness checking needs `/proc` and lives in
//! `fm-storage`, which is allowed to touch the filesystem.

use serde::{Deserialize, Serialize};

/// Exclusive lock recorded on a host descriptor while one orchestrator
/// operation is in flight against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostLock {
    /// Name of the operation holding the lock (e.g. "create", "stop").
    pub operation: String,
    /// Opaque holder tag, e.g. `"pid:1234"` for the local daemon process.
    pub holder: String,
    pub acquired_at_epoch_ms: u64,
}

impl HostLock {
    pub fn new(operation: impl Into<String>, holder: impl Into<String>, now_epoch_ms: u64) -> Self {
        Self { operation: operation.into(), holder: holder.into(), acquired_at_epoch_ms: now_epoch_ms }
    }

    /// A lock is stale once it has been held longer than `max_age`,
    /// regardless of holder liveness — the caller should still prefer a
    /// PID-liveness check first where the holder format supports one.
    pub fn is_stale_by_age(&self, now_epoch_ms: u64, max_age: std::time::Duration) -> bool {
        let elapsed_ms = now_epoch_ms.saturating_sub(self.acquired_at_epoch_ms);
        elapsed_ms >= max_age.as_millis() as u64
    }

    /// Parses a `"pid:<n>"` holder tag into the numeric PID, if the holder
    /// was recorded in that format (as the local daemon always does).
    pub fn holder_pid(&self) -> Option<u32> {
        self.holder.strip_prefix("pid:").and_then(|s| s.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn stale_after_max_age_elapses() {
        let lock = HostLock::new("stop", "pid:1", 1_000);
        assert!(!lock.is_stale_by_age(1_500, Duration::from_secs(1)));
        assert!(lock.is_stale_by_age(2_000, Duration::from_secs(1)));
    }

    #[test]
    fn parses_pid_holder() {
        let lock = HostLock::new("create", "pid:4242", 0);
        assert_eq!(lock.holder_pid(), Some(4242));
        let remote = HostLock::new("create", "remote:worker-1", 0);
        assert_eq!(remote.holder_pid(), None);
    }
}
