// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment resolution (§6 "Environment variables").
//!
//! Grounded on the teacher's own `env.rs`: a handful of free functions, each
//! reading one variable with a documented default, rather than a config
//! struct parsed once at startup — the daemon and the CLI both need these
//! independently (the CLI to find the daemon's socket before it has a
//! connection to ask the daemon anything).

use std::path::PathBuf;
use std::time::Duration;

/// `FM_ROOT_NAME` — namespacing prefix that changes every other default
/// (config path, session prefix, root dir). Spec §6: "changing after host
/// creation is unsupported" — this function has no memory of that, the
/// caller is responsible for not changing it out from under a live fleet.
pub fn root_name() -> String {
    std::env::var("FM_ROOT_NAME").unwrap_or_else(|_| "fm".to_string())
}

/// `FM_PREFIX` — session-name prefix, defaults to `<root>-`.
pub fn session_prefix(root_name: &str) -> String {
    std::env::var("FM_PREFIX").unwrap_or_else(|_| format!("{root_name}-"))
}

/// `FM_HOST_DIR` — root data directory. Defaults to the platform data dir
/// joined with the root name, matching the teacher's own per-profile data
/// dir resolution (`dirs::data_dir()`).
pub fn host_dir(root_name: &str) -> PathBuf {
    match std::env::var_os("FM_HOST_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join(root_name),
    }
}

/// Unix domain socket path the daemon listens on and the CLI connects to.
pub fn socket_path(root_dir: &std::path::Path) -> PathBuf {
    root_dir.join("fmd.sock")
}

/// `FM_IPC_TIMEOUT_MS` — round-trip timeout for a single CLI<->daemon
/// request/response, overriding `fm_wire::DEFAULT_TIMEOUT`.
pub fn ipc_timeout() -> Duration {
    std::env::var("FM_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(fm_wire::DEFAULT_TIMEOUT)
}

/// Default idle-supervisor poll interval, overridable for tests.
pub fn idle_poll_interval() -> Duration {
    std::env::var("FM_IDLE_POLL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn root_name_defaults_to_fm() {
        std::env::remove_var("FM_ROOT_NAME");
        assert_eq!(root_name(), "fm");
    }

    #[test]
    #[serial]
    fn prefix_defaults_to_root_dash() {
        std::env::remove_var("FM_PREFIX");
        assert_eq!(session_prefix("fm"), "fm-");
    }

    #[test]
    #[serial]
    fn explicit_prefix_overrides_default() {
        std::env::set_var("FM_PREFIX", "custom-");
        assert_eq!(session_prefix("fm"), "custom-");
        std::env::remove_var("FM_PREFIX");
    }
}
