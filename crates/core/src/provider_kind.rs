// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backend kind for a host (§4.1).
//!
//! Grounded on the teacher's `Route` enum (`daemon/src/adapters/agent/
//! router.rs`) which dispatches agent operations by runtime kind; here the
//! same shape dispatches `fm-adapters::provider::Provider` calls by the kind
//! recorded on a host descriptor.

use serde::{Deserialize, Serialize};

/// Which backend hosts a given host: local machine, container runtime,
/// cloud sandbox, or a secure-shell-reachable remote machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Local,
    Container,
    CloudSandbox,
    SecureShell,
}

impl ProviderKind {
    /// Whether this backend supports `snapshot()` (§4.1: local MUST raise
    /// `unsupported`).
    pub fn supports_snapshot(self) -> bool {
        !matches!(self, ProviderKind::Local)
    }

    /// Whether this backend supports `create_host` (§4.1: secure-shell hosts
    /// are defined statically in configuration, never created).
    pub fn supports_create(self) -> bool {
        !matches!(self, ProviderKind::SecureShell)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Local => "local",
            ProviderKind::Container => "container",
            ProviderKind::CloudSandbox => "cloud_sandbox",
            ProviderKind::SecureShell => "secure_shell",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ProviderKind::Local),
            "container" => Ok(ProviderKind::Container),
            "cloud_sandbox" | "cloud-sandbox" => Ok(ProviderKind::CloudSandbox),
            "secure_shell" | "secure-shell" | "ssh" => Ok(ProviderKind::SecureShell),
            other => Err(format!("unknown provider kind {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_has_no_snapshot_support() {
        assert!(!ProviderKind::Local.supports_snapshot());
        assert!(ProviderKind::Container.supports_snapshot());
        assert!(ProviderKind::CloudSandbox.supports_snapshot());
        assert!(ProviderKind::SecureShell.supports_snapshot());
    }

    #[test]
    fn secure_shell_has_no_create_support() {
        assert!(!ProviderKind::SecureShell.supports_create());
        assert!(ProviderKind::Local.supports_create());
    }

    #[test]
    fn round_trips_through_str() {
        for kind in [
            ProviderKind::Local,
            ProviderKind::Container,
            ProviderKind::CloudSandbox,
            ProviderKind::SecureShell,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }
}
