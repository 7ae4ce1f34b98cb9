// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers over every non-[`Query`] [`fm_wire::Request`] variant —
//! the lifecycle/fleet/gc/messaging surface a command handler actually
//! calls. Grounded on the same `client_queries.rs` shape (send, match the
//! one expected `Response` variant, `Self::reject` otherwise), applied to
//! the mutating half of the protocol.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use fm_core::{IdleMode, ProviderKind, Resource, Ssh};
use fm_wire::{GcCategory, OnError, ProvisionRunSummary, Request, Response};

use crate::client::{ClientError, DaemonClient};

impl DaemonClient {
    pub async fn create_host(
        &self,
        name: &str,
        provider: ProviderKind,
        image: Option<String>,
        resource: Resource,
        ssh: Option<Ssh>,
    ) -> Result<String, ClientError> {
        let request = Request::CreateHost { name: name.to_string(), provider, image, resource, ssh };
        match self.send(&request).await? {
            Response::HostCreated { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_agent(
        &self,
        host_id: &str,
        name: &str,
        agent_type: &str,
        command: Vec<String>,
        work_dir: PathBuf,
        project: String,
        labels: BTreeMap<String, String>,
        idle_mode: IdleMode,
        idle_timeout_seconds: u64,
        start_on_boot: bool,
        env: BTreeMap<String, String>,
    ) -> Result<String, ClientError> {
        let request = Request::CreateAgent {
            host_id: host_id.to_string(),
            name: name.to_string(),
            agent_type: agent_type.to_string(),
            command,
            work_dir,
            project,
            labels,
            idle_mode,
            idle_timeout_seconds,
            start_on_boot,
            env,
        };
        match self.send(&request).await? {
            Response::AgentCreated { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn start_host(&self, id: &str, snapshot: Option<String>) -> Result<String, ClientError> {
        match self.send(&Request::StartHost { id: id.to_string(), snapshot }).await? {
            Response::HostStarted { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn stop_host(&self, id: &str, snapshot_first: bool) -> Result<String, ClientError> {
        match self.send(&Request::StopHost { id: id.to_string(), snapshot_first }).await? {
            Response::HostStopped { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn destroy_host(&self, id: &str, purge_snapshots: bool, force: bool) -> Result<String, ClientError> {
        match self.send(&Request::DestroyHost { id: id.to_string(), purge_snapshots, force }).await? {
            Response::HostDestroyed { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn destroy_agent(&self, id: &str, force: bool) -> Result<String, ClientError> {
        match self.send(&Request::DestroyAgent { id: id.to_string(), force }).await? {
            Response::AgentDestroyed { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn exec(
        &self,
        agent_id: &str,
        argv: Vec<String>,
        cwd: Option<PathBuf>,
        hard_timeout: Duration,
        warn_timeout: Option<Duration>,
    ) -> Result<(i32, String, String), ClientError> {
        let request =
            Request::Exec { agent_id: agent_id.to_string(), argv, cwd, hard_timeout, warn_timeout };
        match self.send(&request).await? {
            Response::ExecOutput { exit_code, stdout, stderr } => Ok((exit_code, stdout, stderr)),
            other => Self::reject(other),
        }
    }

    /// Sends `bytes` to one or more agents' sessions, isolating per-target
    /// failures per `on_error` (§4.10).
    pub async fn message(
        &self,
        agent_ids: Vec<String>,
        bytes: Vec<u8>,
        on_error: OnError,
    ) -> Result<Vec<fm_wire::MessageTargetResult>, ClientError> {
        match self.send(&Request::Message { agent_ids, bytes, on_error }).await? {
            Response::MessageSentMany { results } => Ok(results),
            other => Self::reject(other),
        }
    }

    /// `fm push` / `fm pull` / `fm pair` all resolve to `Request::Transfer`
    /// with a different `mode` string (§C5's `TransferMode::parse`).
    pub async fn transfer(
        &self,
        agent_id: &str,
        mode: &str,
        source: PathBuf,
        target: PathBuf,
    ) -> Result<String, ClientError> {
        let request = Request::Transfer { agent_id: agent_id.to_string(), mode: mode.to_string(), source, target };
        match self.send(&request).await? {
            Response::TransferStarted { id } | Response::TransferCompleted { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    /// Cancels a backgrounded `fm pair` watch loop started by an earlier
    /// `transfer` call.
    pub async fn stop_transfer(&self, agent_id: &str) -> Result<String, ClientError> {
        let request = Request::StopTransfer { agent_id: agent_id.to_string() };
        match self.send(&request).await? {
            Response::TransferCompleted { id } => Ok(id),
            other => Self::reject(other),
        }
    }

    pub async fn rename(&self, agent_id: &str, new_name: &str) -> Result<(String, String), ClientError> {
        let request = Request::Rename { agent_id: agent_id.to_string(), new_name: new_name.to_string() };
        match self.send(&request).await? {
            Response::Renamed { id, name } => Ok((id, name)),
            other => Self::reject(other),
        }
    }

    pub async fn snapshot(&self, host_id: &str) -> Result<(String, String), ClientError> {
        match self.send(&Request::Snapshot { host_id: host_id.to_string() }).await? {
            Response::Snapshotted { host_id, snapshot } => Ok((host_id, snapshot)),
            other => Self::reject(other),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn gc(
        &self,
        dry_run: bool,
        categories: Vec<GcCategory>,
        include: Vec<String>,
        exclude: Vec<String>,
        provider: Option<ProviderKind>,
        on_error: OnError,
    ) -> Result<Vec<(String, String)>, ClientError> {
        let request = Request::Gc { dry_run, categories, include, exclude, provider, on_error };
        match self.send(&request).await? {
            Response::GcResult { reclaimed } => Ok(reclaimed),
            other => Self::reject(other),
        }
    }

    pub async fn provision(&self, agent_id: &str) -> Result<Box<ProvisionRunSummary>, ClientError> {
        match self.send(&Request::Provision { agent_id: agent_id.to_string() }).await? {
            Response::Provisioned { run } => Ok(run),
            other => Self::reject(other),
        }
    }

    pub async fn set_limit(&self, host_id: &str, resource: Resource) -> Result<String, ClientError> {
        match self.send(&Request::SetLimit { host_id: host_id.to_string(), resource }).await? {
            Response::LimitSet { host_id } => Ok(host_id),
            other => Self::reject(other),
        }
    }

    /// Sends `AgentAttach` to validate the agent id and any pairing token
    /// before the caller execs `tmux attach-session` directly (see
    /// `commands::connect` — the terminal handoff itself never goes over
    /// this socket).
    pub async fn agent_attach_ready(&self, id: &str, token: Option<String>) -> Result<String, ClientError> {
        match self.send(&Request::AgentAttach { id: id.to_string(), token }).await? {
            Response::AgentAttachReady { id } => Ok(id),
            other => Self::reject(other),
        }
    }
}
