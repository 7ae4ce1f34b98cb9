// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `Provider` test double, in the spirit of the teacher's own
//! fake adapters: records calls, lets tests script `exec` responses, and
//! never touches the network or filesystem outside explicit copy calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, SnapshotRef};
use parking_lot::Mutex;

use super::{
    BuildSpec, CreateHostRequest, ExecRequest, ExecResult, ListHostsFilter, Provider, ProviderError,
    ProviderHostInfo, TransferDirection, TransferRequest,
};

#[derive(Default)]
struct FakeState {
    exec_calls: Vec<Vec<String>>,
    exec_responses: std::collections::VecDeque<ExecResult>,
    transfers: Vec<(TransferDirection, std::path::PathBuf, std::path::PathBuf)>,
}

/// Scriptable `Provider` double. Queue responses with [`FakeProvider::push_exec_result`];
/// `exec` pops them in FIFO order and falls back to a zero-exit empty result
/// once the queue is drained.
#[derive(Clone, Default)]
pub struct FakeProvider {
    inner: Arc<Mutex<FakeState>>,
    kind: ProviderKind,
}

impl FakeProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self { inner: Arc::new(Mutex::new(FakeState::default())), kind }
    }

    pub fn push_exec_result(&self, result: ExecResult) {
        self.inner.lock().exec_responses.push_back(result);
    }

    pub fn exec_calls(&self) -> Vec<Vec<String>> {
        self.inner.lock().exec_calls.clone()
    }

    pub fn transfers(&self) -> Vec<(TransferDirection, std::path::PathBuf, std::path::PathBuf)> {
        self.inner.lock().transfers.clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn build(&self, spec: &BuildSpec) -> Result<String, ProviderError> {
        Ok(spec.content_hash())
    }

    async fn create_host(&self, req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError> {
        Ok(ProviderHostInfo { provider_ref: req.name.clone(), tags: req.tags.clone(), ssh: None, running: true })
    }

    async fn start_host(&self, _host: &HostDescriptor, _snapshot: Option<&str>) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn stop_host(&self, _host: &HostDescriptor, _do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError> {
        Ok(None)
    }

    async fn destroy_host(&self, _host: &HostDescriptor, _purge_snapshots: bool) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn snapshot(&self, _host: &HostDescriptor) -> Result<SnapshotRef, ProviderError> {
        Ok(SnapshotRef { reference: "fake-snapshot".into(), taken_at_epoch_ms: 0 })
    }

    async fn exec(&self, _host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError> {
        let mut state = self.inner.lock();
        state.exec_calls.push(req.argv.clone());
        Ok(state.exec_responses.pop_front().unwrap_or_default())
    }

    async fn transfer(&self, _host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError> {
        self.inner.lock().transfers.push((req.direction, req.local.to_path_buf(), req.remote.to_path_buf()));
        Ok(())
    }

    async fn list_hosts(&self, _filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exec_records_call_and_pops_scripted_result() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, stdout: "ok".into(), ..Default::default() });
        let host = fm_core::HostDescriptorBuilder::default().build();
        let req = ExecRequest {
            argv: vec!["true".into()],
            cwd: None,
            user: None,
            hard_timeout: std::time::Duration::from_secs(1),
            warn_timeout: None,
        };
        let result = provider.exec(&host, req).await.unwrap();
        assert_eq!(result.stdout, "ok");
        assert_eq!(provider.exec_calls(), vec![vec!["true".to_string()]]);
    }
}
