// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed wrappers over every [`fm_wire::Query`] variant.
//!
//! Grounded on the teacher's `client_queries.rs` (`list_jobs`, `get_job`,
//! `status()`, `list_agents`, `get_agent` — each just wraps the request in
//! `Request::Query`, sends it, and matches the one `Response` variant it
//! expects, falling back to `Self::reject`).

use fm_wire::{AgentDetail, AgentSummary, FleetStatusEntry, HostDetail, HostSummary, ProvisionRunSummary, Query, Request, Response};

use crate::client::{ClientError, DaemonClient};

impl DaemonClient {
    async fn query(&self, query: Query) -> Result<Response, ClientError> {
        self.send(&Request::Query { query }).await
    }

    pub async fn list_hosts(&self) -> Result<Vec<HostSummary>, ClientError> {
        match self.query(Query::ListHosts).await? {
            Response::Hosts { hosts } => Ok(hosts),
            other => Self::reject(other),
        }
    }

    pub async fn get_host(&self, id: &str) -> Result<Option<Box<HostDetail>>, ClientError> {
        match self.query(Query::GetHost { id: id.to_string() }).await? {
            Response::Host { host } => Ok(host),
            other => Self::reject(other),
        }
    }

    pub async fn list_agents(&self, host_id: Option<&str>) -> Result<Vec<AgentSummary>, ClientError> {
        match self.query(Query::ListAgents { host_id: host_id.map(str::to_string) }).await? {
            Response::Agents { agents } => Ok(agents),
            other => Self::reject(other),
        }
    }

    pub async fn get_agent(&self, id: &str) -> Result<Option<Box<AgentDetail>>, ClientError> {
        match self.query(Query::GetAgent { id: id.to_string() }).await? {
            Response::Agent { agent } => Ok(agent),
            other => Self::reject(other),
        }
    }

    pub async fn fleet_status(&self) -> Result<Vec<FleetStatusEntry>, ClientError> {
        match self.query(Query::FleetStatus).await? {
            Response::FleetStatus { entries } => Ok(entries),
            other => Self::reject(other),
        }
    }

    pub async fn host_logs(&self, id: &str, lines: usize, offset: u64) -> Result<(std::path::PathBuf, String, u64), ClientError> {
        match self.query(Query::GetHostLogs { id: id.to_string(), lines, offset }).await? {
            Response::HostLogs { log_path, content, offset } => Ok((log_path, content, offset)),
            other => Self::reject(other),
        }
    }

    pub async fn agent_logs(&self, id: &str, lines: usize, offset: u64) -> Result<(std::path::PathBuf, String, u64), ClientError> {
        match self.query(Query::GetAgentLogs { id: id.to_string(), lines, offset }).await? {
            Response::AgentLogs { log_path, content, offset } => Ok((log_path, content, offset)),
            other => Self::reject(other),
        }
    }

    pub async fn provision_run(&self, agent_id: &str) -> Result<Option<Box<ProvisionRunSummary>>, ClientError> {
        match self.query(Query::GetProvisionRun { agent_id: agent_id.to_string() }).await? {
            Response::ProvisionRun { run } => Ok(run),
            other => Self::reject(other),
        }
    }
}
