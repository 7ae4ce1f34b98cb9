// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SecureShellProvider`: hosts are pre-existing machines reachable over
//! SSH, enumerated from static configuration rather than created by FM
//! (§4.1: "no `create_host` support; `list_hosts` reads static config").
//!
//! Grounded on the teacher's pattern of wrapping a real CLI/protocol client
//! rather than reimplementing it (`DockerAdapter`'s `docker` shell-out,
//! `KubernetesAdapter`'s `kube-rs` client): here the `openssh` crate wraps
//! the system `ssh` binary's ControlMaster multiplexing, and bulk transfer
//! shells out to `scp` over the same connection parameters.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, SnapshotRef, Ssh};
use openssh::{KnownHosts, SessionBuilder};
use tokio::process::Command;
use tokio::time::timeout;

use super::{
    BuildSpec, CreateHostRequest, ExecRequest, ExecResult, ListHostsFilter, Provider, ProviderError,
    ProviderHostInfo, TransferDirection, TransferRequest,
};

/// A statically-configured SSH endpoint, keyed by the name the host is
/// known under (matches `HostDescriptor::name`).
pub struct SecureShellProvider {
    hosts: BTreeMap<String, Ssh>,
}

impl SecureShellProvider {
    pub fn new(hosts: BTreeMap<String, Ssh>) -> Self {
        Self { hosts }
    }

    fn lookup(&self, host: &HostDescriptor) -> Result<&Ssh, ProviderError> {
        host.ssh
            .as_ref()
            .or_else(|| self.hosts.get(&host.name))
            .ok_or_else(|| ProviderError::NotFound(host.name.clone()))
    }
}

#[async_trait]
impl Provider for SecureShellProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SecureShell
    }

    async fn build(&self, _spec: &BuildSpec) -> Result<String, ProviderError> {
        Err(ProviderError::Unsupported("build (secure-shell hosts are not built by FM)"))
    }

    async fn create_host(&self, _req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError> {
        Err(ProviderError::Unsupported("create_host (secure-shell hosts come from static config)"))
    }

    async fn start_host(&self, _host: &HostDescriptor, _snapshot: Option<&str>) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("start_host (secure-shell hosts are externally managed)"))
    }

    async fn stop_host(&self, _host: &HostDescriptor, _do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError> {
        Err(ProviderError::Unsupported("stop_host (secure-shell hosts are externally managed)"))
    }

    async fn destroy_host(&self, _host: &HostDescriptor, _purge_snapshots: bool) -> Result<(), ProviderError> {
        Err(ProviderError::Unsupported("destroy_host (secure-shell hosts are externally managed)"))
    }

    async fn snapshot(&self, _host: &HostDescriptor) -> Result<SnapshotRef, ProviderError> {
        Err(ProviderError::Unsupported("snapshot"))
    }

    async fn exec(&self, host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError> {
        let ssh = self.lookup(host)?;
        exec_over_ssh(ssh, req).await
    }

    async fn transfer(&self, host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError> {
        let ssh = self.lookup(host)?;
        transfer_over_ssh(ssh, req).await
    }

    async fn list_hosts(&self, filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError> {
        // Static config carries no fleet tagging; a fleet_tag filter matches
        // everything rather than excluding hosts FM has no way to scope.
        let _ = &filter.fleet_tag;
        Ok(self
            .hosts
            .iter()
            .map(|(name, ssh)| ProviderHostInfo {
                provider_ref: name.clone(),
                tags: BTreeMap::new(),
                ssh: Some(ssh.clone()),
                running: true,
            })
            .collect())
    }
}

pub(super) async fn exec_over_ssh(ssh: &Ssh, req: ExecRequest) -> Result<ExecResult, ProviderError> {
    let run = async {
        let session = SessionBuilder::default()
            .user(ssh.user.clone())
            .port(ssh.port)
            .keyfile(ssh.key_path.clone())
            .connect_timeout(ssh.connect_timeout)
            .connect(KnownHosts::Add, &ssh.address)
            .await
            .map_err(|e| ProviderError::Unavailable(format!("ssh connect failed: {e}")))?;

        let output = if let Some(cwd) = &req.cwd {
            let line = format!("cd {} && {}", shell_quote(&cwd.display().to_string()), shell_join(&req.argv));
            session
                .raw_command(line)
                .output()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("remote exec failed: {e}")))?
        } else {
            let mut cmd = session.command(&req.argv[0]);
            cmd.args(&req.argv[1..]);
            cmd.output().await.map_err(|e| ProviderError::Unavailable(format!("remote exec failed: {e}")))?
        };

        Ok::<_, ProviderError>(ExecResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            slow: false,
        })
    };

    timeout(req.hard_timeout, run).await.map_err(|_| ProviderError::Timeout(req.hard_timeout))?
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

fn shell_join(argv: &[String]) -> String {
    argv.iter().map(|a| shell_quote(a)).collect::<Vec<_>>().join(" ")
}

pub(super) async fn transfer_over_ssh(ssh: &Ssh, req: TransferRequest<'_>) -> Result<(), ProviderError> {
    // `scp -r` moves the whole tree with no per-file filtering hook; rather
    // than silently ignoring a caller's globs, refuse the ones we can't honor.
    if !req.include.is_empty() || !req.exclude.is_empty() {
        return Err(ProviderError::Unsupported("include/exclude filters over scp"));
    }
    let remote = format!("{}@{}:{}", ssh.user, ssh.address, req.remote.display());
    let mut args: Vec<String> = vec!["-r".into(), "-P".into(), ssh.port.to_string(), "-i".into(), ssh.key_path.display().to_string()];
    let (src, dst) = match req.direction {
        TransferDirection::Push => (req.local.display().to_string(), remote),
        TransferDirection::Pull => (remote, req.local.display().to_string()),
    };
    args.push(src);
    args.push(dst);

    let output = Command::new("scp")
        .args(&args)
        .output()
        .await
        .map_err(|e| ProviderError::Unavailable(format!("scp unavailable: {e}")))?;
    if !output.status.success() {
        return Err(ProviderError::Unavailable(String::from_utf8_lossy(&output.stderr).into_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ssh(port: u16) -> Ssh {
        Ssh {
            address: "example.test".into(),
            port,
            user: "agent".into(),
            key_path: "/tmp/key".into(),
            connect_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn create_host_is_unsupported() {
        let provider = SecureShellProvider::new(BTreeMap::new());
        let req = CreateHostRequest {
            name: "box".into(),
            image: None,
            resource: Default::default(),
            env: BTreeMap::new(),
            tags: BTreeMap::new(),
        };
        assert!(matches!(provider.create_host(&req).await, Err(ProviderError::Unsupported(_))));
    }

    #[tokio::test]
    async fn list_hosts_reflects_static_config() {
        let mut hosts = BTreeMap::new();
        hosts.insert("box".to_string(), ssh(22));
        let provider = SecureShellProvider::new(hosts);
        let listed = provider.list_hosts(&ListHostsFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].provider_ref, "box");
    }
}
