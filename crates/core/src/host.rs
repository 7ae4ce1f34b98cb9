// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host identifier and descriptor types (§3).
//!
//! Grounded on the teacher's `core/src/container.rs` (resource/config seed
//! shape) and the builder discipline of `core/src/crew.rs`.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lock::HostLock;
use crate::provider_kind::ProviderKind;

crate::define_id! {
    /// Opaque, collision-resistant identifier for a host. Unique for all
    /// time, including destroyed hosts (§3 invariant 2).
    pub struct HostId("hst-");
}

/// Lifecycle state of a host (§3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostStatus {
    Building,
    Starting,
    Running,
    Stopping,
    Stopped,
    Destroyed,
    Failed,
}

crate::simple_display! {
    HostStatus {
        Building => "building",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Stopped => "stopped",
        Destroyed => "destroyed",
        Failed => "failed",
    }
}

impl HostStatus {
    /// A host holds an exclusive lock while in one of these three states
    /// (§3 invariant 7).
    pub fn holds_lock(self) -> bool {
        matches!(self, HostStatus::Stopping | HostStatus::Starting | HostStatus::Building)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, HostStatus::Destroyed | HostStatus::Failed)
    }
}

/// Typed compute resource request/report (cpu/memory/disk/gpu), §3
/// [SUPPLEMENT].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<f64>,
    /// Memory, in mebibytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_mb: Option<u64>,
    /// Disk, in mebibytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_mb: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpu: Option<String>,
}

/// Secure-shell connection detail, present for every non-local host (§3
/// invariant 5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ssh {
    pub address: String,
    pub port: u16,
    pub user: String,
    pub key_path: PathBuf,
    #[serde(with = "duration_secs")]
    pub connect_timeout: Duration,
}

impl Ssh {
    pub fn new(address: impl Into<String>, port: u16, user: impl Into<String>, key_path: PathBuf) -> Self {
        Self {
            address: address.into(),
            port,
            user: user.into(),
            key_path,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        d.as_secs().serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// Opaque snapshot reference plus the locally stored capture time (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRef {
    /// Opaque string meaningful only to the owning provider.
    pub reference: String,
    pub taken_at_epoch_ms: u64,
}

/// Host descriptor (§3) — one per host, persisted at
/// `<root>/hosts/<host-id>/data.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDescriptor {
    pub id: HostId,
    pub name: String,
    pub provider: ProviderKind,
    /// Configured provider endpoint name (e.g. which Docker context, which
    /// cloud-sandbox account) — opaque to core.
    pub provider_instance: String,
    pub status: HostStatus,
    /// Image or snapshot reference the host was (re)built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub resource: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh: Option<Ssh>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub created_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_at_epoch_ms: Option<u64>,
    /// Newest-first snapshot history.
    #[serde(default)]
    pub snapshots: Vec<SnapshotRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock: Option<HostLock>,
    /// Sticky flag: once a host is destroyed it never transitions again
    /// (§3 invariant 4's host-level counterpart).
    #[serde(default)]
    pub destroyed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destroyed_at_epoch_ms: Option<u64>,
}

impl HostDescriptor {
    /// The `fleet=<root-name>,host_id=<id>` tag pair every provider-side
    /// resource must carry (§4.1) so `list_hosts` can reconstruct state
    /// after local metadata loss.
    pub fn fleet_tags(&self, root_name: &str) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.insert("fleet".to_string(), root_name.to_string());
        tags.insert("host_id".to_string(), self.id.to_string());
        tags
    }

    pub fn is_running(&self) -> bool {
        self.status == HostStatus::Running
    }

    pub fn latest_snapshot(&self) -> Option<&SnapshotRef> {
        self.snapshots.first()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct HostDescriptorBuilder => HostDescriptor {
        into {
            name: String = "host",
            provider_instance: String = "default",
        }
        set {
            id: HostId = HostId::new(),
            provider: ProviderKind = ProviderKind::Local,
            status: HostStatus = HostStatus::Running,
            image: Option<String> = None,
            resource: Resource = Resource::default(),
            ssh: Option<Ssh> = None,
            tags: std::collections::BTreeMap<String, String> = Default::default(),
            created_at_epoch_ms: u64 = 0,
            boot_at_epoch_ms: Option<u64> = None,
            snapshots: Vec<SnapshotRef> = Vec::new(),
            lock: Option<HostLock> = None,
            destroyed: bool = false,
            destroyed_at_epoch_ms: Option<u64> = None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_holding_states() {
        assert!(HostStatus::Building.holds_lock());
        assert!(HostStatus::Starting.holds_lock());
        assert!(HostStatus::Stopping.holds_lock());
        assert!(!HostStatus::Running.holds_lock());
        assert!(!HostStatus::Stopped.holds_lock());
    }

    #[test]
    fn fleet_tags_include_host_id_and_root_name() {
        let host = HostDescriptor::builder().name("box").id(HostId::from_string("hst-abc")).build();
        let tags = host.fleet_tags("myfleet");
        assert_eq!(tags.get("fleet").map(String::as_str), Some("myfleet"));
        assert_eq!(tags.get("host_id").map(String::as_str), Some("hst-abc"));
    }

    #[test]
    fn latest_snapshot_is_first_in_list() {
        let host = HostDescriptor::builder()
            .snapshots(vec![
                SnapshotRef { reference: "newest".into(), taken_at_epoch_ms: 2 },
                SnapshotRef { reference: "oldest".into(), taken_at_epoch_ms: 1 },
            ])
            .build();
        assert_eq!(host.latest_snapshot().unwrap().reference, "newest");
    }

    #[test]
    fn terminal_statuses() {
        assert!(HostStatus::Destroyed.is_terminal());
        assert!(HostStatus::Failed.is_terminal());
        assert!(!HostStatus::Running.is_terminal());
    }
}
