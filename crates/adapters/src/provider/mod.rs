// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provider Port (C3, §4.1): a uniform interface over the four host
//! backends. Grounded on the teacher's `AgentAdapter` trait and
//! `RuntimeRouter` (`daemon/src/adapters/agent/{mod.rs,router.rs}`).

mod cloud_sandbox;
mod container;
#[cfg(any(test, feature = "test-support"))]
mod fake;
mod local;
mod router;
mod secure_shell;

pub use cloud_sandbox::CloudSandboxProvider;
pub use container::ContainerProvider;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProvider;
pub use local::LocalProvider;
pub use router::ProviderRouter;
pub use secure_shell::SecureShellProvider;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, Resource, SnapshotRef, Ssh};
use thiserror::Error;

/// Errors a `Provider` call may raise, mirroring the taxonomy entries of
/// §7 that apply to provider calls. Transient (`Unavailable`) vs terminal
/// (everything else) is the caller's cue for whether to retry (§4.1
/// "semantic requirements": the port never retries internally).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("host not found: {0}")]
    NotFound(String),
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("quota exceeded: {0}")]
    Quota(String),
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
    #[error("build failed: {0}")]
    BuildFailed(String),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0} is unsupported by this provider")]
    Unsupported(&'static str),
    #[error("snapshot missing: {0}")]
    SnapshotMissing(String),
}

impl ProviderError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        use fm_core::ErrorKind;
        match self {
            ProviderError::NotFound(_) | ProviderError::SnapshotMissing(_) => ErrorKind::NotFound,
            ProviderError::Unavailable(_) => ErrorKind::Unavailable,
            ProviderError::Quota(_) => ErrorKind::Quota,
            ProviderError::InvalidSpec(_) | ProviderError::BuildFailed(_) | ProviderError::Unsupported(_) => {
                ErrorKind::InvalidSpec
            }
            ProviderError::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

/// A dockerfile-like build specification (§4.1 `build`).
#[derive(Debug, Clone)]
pub struct BuildSpec {
    pub base_image: String,
    /// Ordered build instructions (e.g. `RUN`/`COPY`-equivalent lines).
    pub steps: Vec<String>,
    pub build_args: BTreeMap<String, String>,
}

impl BuildSpec {
    /// Content hash used for `build`'s idempotence contract ("idempotent by
    /// content hash", §4.1).
    pub fn content_hash(&self) -> String {
        use std::fmt::Write as _;
        let mut buf = String::new();
        let _ = write!(buf, "{}\n", self.base_image);
        for step in &self.steps {
            let _ = write!(buf, "{step}\n");
        }
        for (k, v) in &self.build_args {
            let _ = write!(buf, "{k}={v}\n");
        }
        format!("{:016x}", fnv1a(buf.as_bytes()))
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// §4.1 `create_host` request.
#[derive(Debug, Clone)]
pub struct CreateHostRequest {
    pub name: String,
    pub image: Option<String>,
    pub resource: Resource,
    pub env: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

/// Result of a successful `create_host`: identifiers plus, for remote
/// backends, the secure-shell endpoint to reach it (§3 invariant 5).
#[derive(Debug, Clone)]
pub struct ProviderHostInfo {
    /// Opaque provider-side identifier (distinct from FM's `HostId`).
    pub provider_ref: String,
    pub tags: BTreeMap<String, String>,
    pub ssh: Option<Ssh>,
    pub running: bool,
}

/// §4.1 `exec` request: the two-threshold timeout is mandatory, not
/// optional, per spec's "MUST propagate a two-threshold timeout".
#[derive(Debug, Clone)]
pub struct ExecRequest {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub user: Option<String>,
    pub hard_timeout: Duration,
    pub warn_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Set if `warn_timeout` elapsed before completion (§4.1, §5): a
    /// slow-operation telemetry event, not a failure.
    pub slow: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Push,
    Pull,
}

/// File-level transfer primitive request (§4.1 `transfer`); the richer
/// mode semantics (clone/worktree/vcs-aware sync) live in
/// `fm-engine::transfer`, which calls down into this primitive for the
/// raw byte-moving step.
#[derive(Debug, Clone)]
pub struct TransferRequest<'a> {
    pub direction: TransferDirection,
    pub local: &'a Path,
    pub remote: &'a Path,
    pub include: &'a [String],
    pub exclude: &'a [String],
}

#[derive(Debug, Clone, Default)]
pub struct ListHostsFilter {
    pub fleet_tag: Option<String>,
}

/// The Provider Port: one implementation per [`fm_core::ProviderKind`].
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn build(&self, spec: &BuildSpec) -> Result<String, ProviderError>;

    async fn create_host(&self, req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError>;

    async fn start_host(&self, host: &HostDescriptor, snapshot: Option<&str>) -> Result<(), ProviderError>;

    async fn stop_host(&self, host: &HostDescriptor, do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError>;

    async fn destroy_host(&self, host: &HostDescriptor, purge_snapshots: bool) -> Result<(), ProviderError>;

    /// §4.1: "Not required for local; MUST raise `unsupported` there."
    async fn snapshot(&self, host: &HostDescriptor) -> Result<SnapshotRef, ProviderError>;

    async fn exec(&self, host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError>;

    async fn transfer(&self, host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError>;

    /// §4.1: "Reconciliation source of truth for alive/dead decisions."
    async fn list_hosts(&self, filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_for_equal_specs() {
        let a = BuildSpec { base_image: "ubuntu".into(), steps: vec!["RUN x".into()], build_args: BTreeMap::new() };
        let b = BuildSpec { base_image: "ubuntu".into(), steps: vec!["RUN x".into()], build_args: BTreeMap::new() };
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_differs_for_different_steps() {
        let a = BuildSpec { base_image: "ubuntu".into(), steps: vec!["RUN x".into()], build_args: BTreeMap::new() };
        let b = BuildSpec { base_image: "ubuntu".into(), steps: vec!["RUN y".into()], build_args: BTreeMap::new() };
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn error_kinds_map_to_taxonomy() {
        use fm_core::ErrorKind;
        assert_eq!(ProviderError::NotFound("x".into()).to_error_kind(), ErrorKind::NotFound);
        assert_eq!(ProviderError::Unavailable("x".into()).to_error_kind(), ErrorKind::Unavailable);
        assert_eq!(ProviderError::Timeout(Duration::from_secs(1)).to_error_kind(), ErrorKind::Timeout);
    }
}
