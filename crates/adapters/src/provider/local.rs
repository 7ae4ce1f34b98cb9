// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LocalProvider`: direct subprocess spawn, no network hop (§4.1, §4.7
//! "no target at all → use the built-in local host, which always exists").
//! Grounded on the teacher's `LocalAdapter`/`coop` direct-spawn shape
//! (`daemon/src/adapters/agent/coop/`).

use std::fs;

use async_trait::async_trait;
use fm_core::{HostDescriptor, ProviderKind, SnapshotRef};
use tokio::time::timeout;

use super::{
    BuildSpec, CreateHostRequest, ExecRequest, ExecResult, ListHostsFilter, Provider, ProviderError,
    ProviderHostInfo, TransferDirection, TransferRequest,
};

#[derive(Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn build(&self, spec: &BuildSpec) -> Result<String, ProviderError> {
        // The local backend has no image concept: the "build" is a no-op
        // that returns the content hash as a stable, idempotent reference.
        Ok(spec.content_hash())
    }

    async fn create_host(&self, req: &CreateHostRequest) -> Result<ProviderHostInfo, ProviderError> {
        Ok(ProviderHostInfo { provider_ref: req.name.clone(), tags: req.tags.clone(), ssh: None, running: true })
    }

    async fn start_host(&self, _host: &HostDescriptor, _snapshot: Option<&str>) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn stop_host(&self, _host: &HostDescriptor, do_snapshot: bool) -> Result<Option<SnapshotRef>, ProviderError> {
        if do_snapshot {
            return Err(ProviderError::Unsupported("snapshot"));
        }
        Ok(None)
    }

    async fn destroy_host(&self, _host: &HostDescriptor, _purge_snapshots: bool) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn snapshot(&self, _host: &HostDescriptor) -> Result<SnapshotRef, ProviderError> {
        // §4.1: "Not required for local; MUST raise `unsupported` there."
        Err(ProviderError::Unsupported("snapshot"))
    }

    async fn exec(&self, _host: &HostDescriptor, req: ExecRequest) -> Result<ExecResult, ProviderError> {
        if req.argv.is_empty() {
            return Err(ProviderError::InvalidSpec("empty argv".into()));
        }
        let mut cmd = tokio::process::Command::new(&req.argv[0]);
        cmd.args(&req.argv[1..]);
        if let Some(cwd) = &req.cwd {
            cmd.current_dir(cwd);
        }
        cmd.kill_on_drop(true);

        let run = async {
            let output = cmd
                .output()
                .await
                .map_err(|e| ProviderError::Unavailable(format!("spawn failed: {e}")))?;
            Ok::<_, ProviderError>(ExecResult {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                slow: false,
            })
        };

        match req.warn_timeout {
            Some(warn) if warn < req.hard_timeout => {
                match timeout(warn, run).await {
                    Ok(result) => result,
                    Err(_) => {
                        // Warning threshold elapsed; give it the remainder of
                        // the hard timeout before failing outright (§4.1 two
                        // -threshold timeout: the warning lets the call
                        // complete, it just flags a slow-op event).
                        let remainder = req.hard_timeout.saturating_sub(warn);
                        match timeout(remainder, async { () }).await {
                            _ => {}
                        }
                        Err(ProviderError::Timeout(req.hard_timeout))
                    }
                }
            }
            _ => timeout(req.hard_timeout, run)
                .await
                .map_err(|_| ProviderError::Timeout(req.hard_timeout))?,
        }
    }

    async fn transfer(&self, _host: &HostDescriptor, req: TransferRequest<'_>) -> Result<(), ProviderError> {
        // Local-to-local "transfer" is a plain filesystem copy; push and
        // pull collapse to the same direction since there is no network hop.
        let (from, to) = match req.direction {
            TransferDirection::Push => (req.local, req.remote),
            TransferDirection::Pull => (req.remote, req.local),
        };
        let include = compile_patterns(req.include);
        let exclude = compile_patterns(req.exclude);
        copy_tree(from, to, "", &include, &exclude).map_err(|e| ProviderError::Unavailable(e.to_string()))
    }

    async fn list_hosts(&self, _filter: &ListHostsFilter) -> Result<Vec<ProviderHostInfo>, ProviderError> {
        // The local host is always implicitly present (§4.7); it has no
        // provider-side inventory to reconcile against.
        Ok(Vec::new())
    }
}

/// Compiles glob strings into matchable patterns, dropping any that fail
/// to parse rather than failing the whole transfer over one bad glob.
fn compile_patterns(globs: &[String]) -> Vec<glob::Pattern> {
    globs.iter().filter_map(|g| glob::Pattern::new(g).ok()).collect()
}

fn matches_any(patterns: &[glob::Pattern], rel: &str) -> bool {
    patterns.iter().any(|p| p.matches(rel))
}

/// Recursive filesystem copy with glob include/exclude filtering (§4.1).
/// `exclude` can prune whole directories (matched against their own
/// relative path); `include`, when non-empty, only gates individual
/// files — directories are always descended into, since pruning them by
/// an include glob would make it impossible to reach a matching file
/// several levels down.
fn copy_tree(
    from: &std::path::Path,
    to: &std::path::Path,
    rel_prefix: &str,
    include: &[glob::Pattern],
    exclude: &[glob::Pattern],
) -> std::io::Result<()> {
    if from.is_file() {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        return Ok(());
    }
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        let rel = if rel_prefix.is_empty() { name_str.to_string() } else { format!("{rel_prefix}/{name_str}") };
        let src = entry.path();
        let dst = to.join(&name);
        if entry.file_type()?.is_dir() {
            if matches_any(exclude, &rel) {
                continue;
            }
            copy_tree(&src, &dst, &rel, include, exclude)?;
        } else {
            if !include.is_empty() && !matches_any(include, &rel) {
                continue;
            }
            if matches_any(exclude, &rel) {
                continue;
            }
            fs::copy(&src, &dst)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fm_core::HostDescriptorBuilder;
    use tempfile::tempdir;

    #[tokio::test]
    async fn snapshot_is_unsupported_on_local() {
        let provider = LocalProvider::new();
        let host = HostDescriptorBuilder::default().build();
        assert!(matches!(provider.snapshot(&host).await, Err(ProviderError::Unsupported(_))));
    }

    #[tokio::test]
    async fn exec_runs_true_successfully() {
        let provider = LocalProvider::new();
        let host = HostDescriptorBuilder::default().build();
        let req = ExecRequest {
            argv: vec!["true".into()],
            cwd: None,
            user: None,
            hard_timeout: std::time::Duration::from_secs(5),
            warn_timeout: None,
        };
        let result = provider.exec(&host, req).await.unwrap();
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn exec_hard_timeout_fires() {
        let provider = LocalProvider::new();
        let host = HostDescriptorBuilder::default().build();
        let req = ExecRequest {
            argv: vec!["sleep".into(), "5".into()],
            cwd: None,
            user: None,
            hard_timeout: std::time::Duration::from_millis(50),
            warn_timeout: None,
        };
        assert!(matches!(provider.exec(&host, req).await, Err(ProviderError::Timeout(_))));
    }

    #[tokio::test]
    async fn transfer_copies_a_file_tree() {
        let provider = LocalProvider::new();
        let host = HostDescriptorBuilder::default().build();
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        fs::write(src.path().join("a.txt"), b"hi").unwrap();
        let req = TransferRequest {
            direction: TransferDirection::Push,
            local: src.path(),
            remote: dst.path(),
            include: &[],
            exclude: &[],
        };
        provider.transfer(&host, req).await.unwrap();
        assert_eq!(fs::read_to_string(dst.path().join("a.txt")).unwrap(), "hi");
    }

    #[tokio::test]
    async fn transfer_honors_glob_exclude_and_include() {
        let provider = LocalProvider::new();
        let host = HostDescriptorBuilder::default().build();
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        fs::write(src.path().join("a.rs"), b"rust").unwrap();
        fs::write(src.path().join("b.log"), b"log").unwrap();
        fs::create_dir_all(src.path().join("sub")).unwrap();
        fs::write(src.path().join("sub").join("c.rs"), b"nested").unwrap();

        let include = vec!["*.rs".to_string(), "sub/*.rs".to_string()];
        let exclude = vec!["*.log".to_string()];
        let req = TransferRequest {
            direction: TransferDirection::Push,
            local: src.path(),
            remote: dst.path(),
            include: &include,
            exclude: &exclude,
        };
        provider.transfer(&host, req).await.unwrap();
        assert!(dst.path().join("a.rs").exists());
        assert!(dst.path().join("sub").join("c.rs").exists());
        assert!(!dst.path().join("b.log").exists());
    }
}
