// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity files (§4.9, §6): one file per signal source under
//! `<host>/activity/`. A file's mtime is the authoritative liveness signal;
//! its content is advisory (a debug-readable timestamp), never parsed by
//! the idle supervisor. Single-writer (the reporter) / single-reader (the
//! supervisor) — no locking needed (§5 "shared resources").

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use fm_core::HostId;

use crate::layout::Layout;

/// The five activity sources named in §6's persisted layout.
pub const SOURCES: [&str; 5] = ["user", "agent", "ssh", "create", "boot"];

#[derive(Clone)]
pub struct ActivityStore {
    layout: Layout,
}

impl ActivityStore {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Touches `source`'s activity file for `host_id`, setting its mtime to
    /// now. Content is advisory: the epoch-ms timestamp, for human
    /// debugging only.
    pub fn touch(&self, host_id: &HostId, source: &str, now_epoch_ms: u64) -> std::io::Result<()> {
        let path = self.layout.activity_file(host_id, source);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, now_epoch_ms.to_string())?;
        Ok(())
    }

    /// Reads `source`'s mtime as epoch milliseconds, or `None` if the file
    /// has never been touched.
    pub fn mtime_epoch_ms(&self, host_id: &HostId, source: &str) -> std::io::Result<Option<u64>> {
        let path = self.layout.activity_file(host_id, source);
        match fs::metadata(&path) {
            Ok(meta) => {
                let modified = meta.modified()?;
                let ms = modified
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                Ok(Some(ms))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Most recent mtime across `sources`, or `None` if none have ever been
    /// touched. Used by the idle supervisor to compute "last activity of
    /// any enabled signal" (§4.9).
    pub fn latest(&self, host_id: &HostId, sources: &[&str]) -> std::io::Result<Option<u64>> {
        let mut latest = None;
        for source in sources {
            if let Some(ms) = self.mtime_epoch_ms(host_id, source)? {
                latest = Some(latest.map_or(ms, |l: u64| l.max(ms)));
            }
        }
        Ok(latest)
    }
}

/// Sets a file's mtime directly (used in tests that need deterministic
/// "idle for N seconds" setups without sleeping).
pub fn set_mtime(path: &Path, epoch_ms: u64) -> std::io::Result<()> {
    let time = SystemTime::UNIX_EPOCH + std::time::Duration::from_millis(epoch_ms);
    let ft = filetime_from_system_time(time);
    filetime_set(path, ft)
}

// Minimal inline mtime-setting via std only (avoids an extra `filetime`
// dependency the teacher's own stack doesn't carry): open for write,
// truncate-free touch, then use `std::fs::File::set_modified` (stable since
// 1.75, matches this workspace's edition/toolchain baseline).
fn filetime_from_system_time(t: SystemTime) -> SystemTime {
    t
}

fn filetime_set(path: &Path, t: SystemTime) -> std::io::Result<()> {
    let f = fs::OpenOptions::new().write(true).open(path)?;
    f.set_modified(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn touch_then_read_back() {
        let dir = tempdir().unwrap();
        let store = ActivityStore::new(Layout::new(dir.path()));
        let host = HostId::new();
        store.touch(&host, "user", 123_000).unwrap();
        let ms = store.mtime_epoch_ms(&host, "user").unwrap().unwrap();
        assert!(ms > 0);
    }

    #[test]
    fn untouched_source_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = ActivityStore::new(Layout::new(dir.path()));
        let host = HostId::new();
        assert_eq!(store.mtime_epoch_ms(&host, "boot").unwrap(), None);
    }

    #[test]
    fn latest_picks_the_max_across_sources() {
        let dir = tempdir().unwrap();
        let store = ActivityStore::new(Layout::new(dir.path()));
        let host = HostId::new();
        store.touch(&host, "user", 1).unwrap();
        set_mtime(&dir.path().join("hosts").join(host.as_str()).join("activity").join("user"), 1_000).unwrap();
        store.touch(&host, "agent", 2).unwrap();
        set_mtime(&dir.path().join("hosts").join(host.as_str()).join("activity").join("agent"), 5_000).unwrap();
        let latest = store.latest(&host, &["user", "agent", "ssh"]).unwrap().unwrap();
        assert_eq!(latest, 5_000);
    }
}
