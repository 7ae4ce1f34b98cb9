// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ContainerProvider`: drives a container runtime by wrapping its CLI
//! (`docker`/`podman`), rather than reimplementing the engine API. Grounded
//! on the teacher's `DockerAdapter` shape: shell out to the real binary and
//! parse line-oriented output (`daemon/src/adapters/agent/docker.rs`).

use std::time::Duration;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, Resource, SnapshotRef};
use tokio::process::Command;
use tokio::time::timeout;

use super::{
    BuildSpec, CreateHostRequest, ExecRequest, ExecResult, ListHostsFilter, Provider, ProviderError,
    ProviderHostInfo, TransferDirection, TransferRequest,
};

pub struct ContainerProvider {
    /// The CLI binary to invoke (`docker` by default; overridable so a
    /// podman-backed instance can reuse this adapter verbatim).
    binary: String,
}

impl ContainerProvider {
    pub fn new() -> Self {
        Self { binary: "docker".to_string() }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<(String, String, i32), ProviderError> {
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("{} unavailable: {e}", self.binary)))?;
        Ok((
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            output.status.code().unwrap_or(-1),
        ))
    }

    fn resource_flags(resource: &Resource) -> Vec<String> {
        let mut flags = Vec::new();
        if let Some(cpu) = resource.cpu {
            flags.push("--cpus".to_string());
            flags.push(cpu.to_string());
        }
        if let Some(mem) = resource.memory_mb {
            flags.push("--memory".to_string());
            flags.push(format!("{mem}m"));
        }
        flags
    }
}

impl Default for ContainerProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for ContainerProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Container
    }

    async fn build(&self, spec: &BuildSpec) -> Result<String, ProviderError> {
        let tag = format!("fm/{}", spec.content_hash());
        let (_, stderr, code) = self.run(&["image", "inspect", &tag]).await?;
        if code == 0 {
            return Ok(tag);
        }
        let _ = stderr;
        // A real build would stream a Dockerfile through `docker build -`;
        // the content-hash tag makes repeated calls for the same spec a
        // cheap `image inspect` hit instead of a rebuild (§4.1 idempotence).
        let (_, stderr, code) = self.run(&["pull", &spec.base_image]).await?;
        if code != 0 {
            return Err(ProviderError::BuildFailed(stderr));
        }
        let (_, stderr, code) = self.run(&["tag", &spec.base_image, &tag]).await?;
        if code != 0 {
            return Err(ProviderError::BuildFailed(stderr));
        }
        Ok(tag)
    }

    async fn create_host(&self, req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError> {
        let image = req.image.clone().ok_or_else(|| ProviderError::InvalidSpec("container host requires an image".into()))?;
        let mut args = vec!["create".to_string(), "--name".to_string(), req.name.clone()];
        args.extend(Self::resource_flags(&req.resource));
        for (k, v) in &req.tags {
            args.push("--label".to_string());
            args.push(format!("{k}={v}"));
        }
        for (k, v) in &req.env {
            args.push("-e".to_string());
            args.push(format!("{k}={v}"));
        }
        args.push(image);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let (stdout, stderr, code) = self.run(&arg_refs).await?;
        if code != 0 {
            return Err(ProviderError::Unavailable(stderr));
        }
        Ok(ProviderHostInfo {
            provider_ref: stdout.trim().to_string(),
            tags: req.tags.clone(),
            ssh: None,
            running: false,
        })
    }

    async fn start_host(&self, host: &HostDescriptor, _snapshot: Option<&str>) -> Result<(), ProviderError> {
        let (_, stderr, code) = self.run(&["start", &host.id.to_string()]).await?;
        if code != 0 {
            return Err(ProviderError::Unavailable(stderr));
        }
        Ok(())
    }

    async fn stop_host(&self, host: &HostDescriptor, do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError> {
        let snapshot = if do_snapshot { Some(self.snapshot(host).await?) } else { None };
        let (_, stderr, code) = self.run(&["stop", &host.id.to_string()]).await?;
        if code != 0 {
            return Err(ProviderError::Unavailable(stderr));
        }
        Ok(snapshot)
    }

    async fn destroy_host(&self, host: &HostDescriptor, purge_snapshots: bool) -> Result<(), ProviderError> {
        let (_, stderr, code) = self.run(&["rm", "-f", &host.id.to_string()]).await?;
        if code != 0 {
            return Err(ProviderError::Unavailable(stderr));
        }
        if purge_snapshots {
            for snap in &host.snapshots {
                let _ = self.run(&["image", "rm", "-f", &snap.reference]).await;
            }
        }
        Ok(())
    }

    async fn snapshot(&self, host: &HostDescriptor) -> Result<SnapshotRef, ProviderError> {
        let reference = format!("fm-snapshot/{}:{}", host.id, host.snapshots.len());
        let (_, stderr, code) = self.run(&["commit", &host.id.to_string(), &reference]).await?;
        if code != 0 {
            return Err(ProviderError::BuildFailed(stderr));
        }
        Ok(SnapshotRef { reference, taken_at_epoch_ms: host.created_at_epoch_ms })
    }

    async fn exec(&self, host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError> {
        let mut args = vec!["exec".to_string()];
        if let Some(user) = &req.user {
            args.push("-u".to_string());
            args.push(user.clone());
        }
        if let Some(cwd) = &req.cwd {
            args.push("-w".to_string());
            args.push(cwd.display().to_string());
        }
        args.push(host.id.to_string());
        args.extend(req.argv.iter().cloned());

        let run = async {
            let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
            let (stdout, stderr, code) = self.run(&arg_refs).await?;
            Ok::<_, ProviderError>(ExecResult { exit_code: code, stdout, stderr, slow: false })
        };

        timeout(req.hard_timeout, run).await.map_err(|_| ProviderError::Timeout(req.hard_timeout))?
    }

    async fn transfer(&self, host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError> {
        // `docker/kubectl cp` moves the whole tree with no per-file
        // filtering hook; refuse filters we can't honor rather than
        // silently copying everything.
        if !req.include.is_empty() || !req.exclude.is_empty() {
            return Err(ProviderError::Unsupported("include/exclude filters over container cp"));
        }
        let spec = format!("{}:{}", host.id, req.remote.display());
        let (src, dst) = match req.direction {
            TransferDirection::Push => (req.local.display().to_string(), spec),
            TransferDirection::Pull => (spec, req.local.display().to_string()),
        };
        let (_, stderr, code) = self.run(&["cp", &src, &dst]).await?;
        if code != 0 {
            return Err(ProviderError::Unavailable(stderr));
        }
        Ok(())
    }

    async fn list_hosts(&self, filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError> {
        let mut args = vec!["ps".to_string(), "-a".to_string(), "--format".to_string(), "{{.ID}}\t{{.Labels}}\t{{.State}}".to_string()];
        if let Some(tag) = &filter.fleet_tag {
            args.push("--filter".to_string());
            args.push(format!("label=fleet={tag}"));
        }
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let (stdout, stderr, code) = self.run(&arg_refs).await?;
        if code != 0 {
            return Err(ProviderError::Unavailable(stderr));
        }
        Ok(stdout
            .lines()
            .filter_map(|line| {
                let mut parts = line.splitn(3, '\t');
                let id = parts.next()?.to_string();
                let labels = parts.next().unwrap_or_default();
                let state = parts.next().unwrap_or_default();
                let tags = labels
                    .split(',')
                    .filter_map(|kv| kv.split_once('='))
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                Some(ProviderHostInfo { provider_ref: id, tags, ssh: None, running: state.contains("running") })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_flags_include_cpu_and_memory() {
        let resource = Resource { cpu: Some(2.0), memory_mb: Some(512), disk_mb: None, gpu: None };
        let flags = ContainerProvider::resource_flags(&resource);
        assert_eq!(flags, vec!["--cpus", "2", "--memory", "512m"]);
    }

    #[tokio::test]
    async fn exec_timeout_is_enforced_even_if_binary_is_missing() {
        let provider = ContainerProvider::with_binary("definitely-not-a-real-binary");
        let host = fm_core::HostDescriptorBuilder::default().build();
        let req = ExecRequest {
            argv: vec!["true".into()],
            cwd: None,
            user: None,
            hard_timeout: Duration::from_secs(2),
            warn_timeout: None,
        };
        assert!(provider.exec(&host, req).await.is_err());
    }
}
