// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatches a `Provider` call to the implementation matching a host's
//! recorded [`ProviderKind`]. Grounded on the teacher's `RuntimeRouter`
//! (`daemon/src/adapters/agent/router.rs`): one `Arc<dyn Trait>` slot per
//! backend kind, looked up by a discriminant carried on the descriptor.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, SnapshotRef};

use super::{
    BuildSpec, CreateHostRequest, ExecRequest, ExecResult, ListHostsFilter, Provider, ProviderError,
    ProviderHostInfo, TransferRequest,
};

/// Holds one backend implementation per [`ProviderKind`] and dispatches by
/// the kind recorded on the descriptor or request at hand. A kind with no
/// registered backend surfaces as [`ProviderError::Unavailable`] rather
/// than panicking — configuration, not a programming error.
#[derive(Clone, Default)]
pub struct ProviderRouter {
    backends: HashMap<ProviderKind, Arc<dyn Provider>>,
}

impl ProviderRouter {
    pub fn new() -> Self {
        Self { backends: HashMap::new() }
    }

    pub fn register(mut self, kind: ProviderKind, provider: Arc<dyn Provider>) -> Self {
        self.backends.insert(kind, provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Result<&Arc<dyn Provider>, ProviderError> {
        self.backends
            .get(&kind)
            .ok_or_else(|| ProviderError::Unavailable(format!("no provider registered for {kind:?}")))
    }
}

#[async_trait]
impl Provider for ProviderRouter {
    fn kind(&self) -> ProviderKind {
        // A router has no single kind of its own; callers should route via
        // `get` for anything kind-sensitive. Exposed so `ProviderRouter`
        // still satisfies the trait object bound used elsewhere.
        ProviderKind::Local
    }

    async fn build(&self, spec: &BuildSpec) -> Result<String, ProviderError> {
        Err(ProviderError::Unsupported("build must be routed via ProviderRouter::get"))
    }

    async fn create_host(&self, req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError> {
        let _ = req;
        Err(ProviderError::Unsupported("create_host must be routed via ProviderRouter::get"))
    }

    async fn start_host(&self, host: &HostDescriptor, snapshot: Option<&str>) -> Result<(), ProviderError> {
        self.get(host.provider)?.start_host(host, snapshot).await
    }

    async fn stop_host(&self, host: &HostDescriptor, do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError> {
        self.get(host.provider)?.stop_host(host, do_snapshot).await
    }

    async fn destroy_host(&self, host: &HostDescriptor, purge_snapshots: bool) -> Result<(), ProviderError> {
        self.get(host.provider)?.destroy_host(host, purge_snapshots).await
    }

    async fn snapshot(&self, host: &HostDescriptor) -> Result<SnapshotRef, ProviderError> {
        self.get(host.provider)?.snapshot(host).await
    }

    async fn exec(&self, host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError> {
        self.get(host.provider)?.exec(host, req).await
    }

    async fn transfer(&self, host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError> {
        self.get(host.provider)?.transfer(host, req).await
    }

    async fn list_hosts(&self, filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError> {
        // Fan out across every registered backend and merge; a router
        // has no single kind to scope this to (mirrors §4.8's fleet
        // enumerator, which must reconcile across all of them).
        let mut merged = Vec::new();
        for provider in self.backends.values() {
            merged.extend(provider.list_hosts(filter).await?);
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::LocalProvider;

    #[tokio::test]
    async fn unregistered_kind_is_unavailable() {
        let router = ProviderRouter::new();
        assert!(matches!(router.get(ProviderKind::Container), Err(ProviderError::Unavailable(_))));
    }

    #[tokio::test]
    async fn registered_kind_resolves() {
        let router = ProviderRouter::new().register(ProviderKind::Local, Arc::new(LocalProvider::new()));
        assert!(router.get(ProviderKind::Local).is_ok());
    }

    #[tokio::test]
    async fn list_hosts_merges_across_backends() {
        let router = ProviderRouter::new().register(ProviderKind::Local, Arc::new(LocalProvider::new()));
        let merged = router.list_hosts(&ListHostsFilter::default()).await.unwrap();
        assert!(merged.is_empty());
    }
}
