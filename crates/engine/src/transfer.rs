// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace Transfer Engine (C5, §4.4): materializes and synchronizes a
//! code workspace between a source and a target (host, path) pair.
//!
//! Grounded on the teacher's `LocalWorkspaceAdapter` (`daemon/src/adapters/
//! workspace.rs`): shell `git worktree add`/`git clone --shared` through the
//! provider port rather than reimplementing a git plumbing layer, and the
//! same "background filesystem work, typed failure reason" shape —
//! generalized from a single worktree-or-folder choice to the full mode set
//! of §4.4 (`in-place`/`copy`/`clone`/`worktree`/`rsync`/`vcs-push`/
//! `vcs-pull`/`pair`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use fm_adapters::{ExecRequest, Provider, ProviderError, TransferDirection, TransferRequest};
use fm_core::{HostDescriptor, ProviderKind};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Default per-command timeout for the git/rsync subprocesses this engine
/// shells out to via the provider port's `exec`.
const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(120);

/// How often [`TransferEngine::pair`] re-checks both sides when it has no
/// local `notify` watch to wake it early (remote hosts, or a local watch
/// setup failure).
const PAIR_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    InPlace,
    Copy,
    Clone,
    Worktree,
    Rsync,
    VcsPush,
    VcsPull,
    Pair,
}

impl TransferMode {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "in-place" => Some(Self::InPlace),
            "copy" => Some(Self::Copy),
            "clone" => Some(Self::Clone),
            "worktree" => Some(Self::Worktree),
            "rsync" => Some(Self::Rsync),
            "vcs-push" => Some(Self::VcsPush),
            "vcs-pull" => Some(Self::VcsPull),
            "pair" => Some(Self::Pair),
            _ => None,
        }
    }

    /// §4.4: clone/worktree require the source and target to be the same
    /// host (they share object storage on local disk).
    pub fn requires_same_host(self) -> bool {
        matches!(self, Self::InPlace | Self::Clone | Self::Worktree)
    }
}

/// §4.4 "Uncommitted-change policy" for vcs-aware modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UncommittedPolicy {
    #[default]
    Fail,
    Stash,
    Merge,
    Clobber,
}

/// §4.4 "Divergence policy": whether a ref rewrite is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DivergencePolicy {
    #[default]
    FastForwardOnly,
    /// `--mirror` for vcs-push, `--force` for vcs-pull.
    AcceptRewrite,
}

/// §4.4 pair-mode conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    Newer,
    Source,
    Target,
    Ask,
}

#[derive(Debug, Clone)]
pub struct TransferSpec {
    pub mode: TransferMode,
    pub source: PathBuf,
    pub target: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub branch: Option<String>,
    pub start_point: Option<String>,
    pub uncommitted: UncommittedPolicy,
    pub divergence: DivergencePolicy,
    pub conflict: ConflictPolicy,
}

impl TransferSpec {
    pub fn new(mode: TransferMode, source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            source: source.into(),
            target: target.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            branch: None,
            start_point: None,
            uncommitted: UncommittedPolicy::default(),
            divergence: DivergencePolicy::default(),
            conflict: ConflictPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("in-place mode requires source and target host to match")]
    NotSameHost,
    #[error("{0} requires a new branch name")]
    MissingBranch(&'static str),
    #[error("target has uncommitted changes")]
    UncommittedChanges,
    #[error("push/pull would rewrite history; pass --mirror/--force to accept")]
    WouldRewriteHistory,
    #[error("source is read-only for this mode")]
    SourceReadOnly,
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl TransferError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        use fm_core::ErrorKind;
        match self {
            TransferError::NotSameHost
            | TransferError::MissingBranch(_)
            | TransferError::SourceReadOnly => ErrorKind::InvalidRequest,
            TransferError::UncommittedChanges | TransferError::WouldRewriteHistory => ErrorKind::InvalidSpec,
            TransferError::Provider(e) => e.to_error_kind(),
        }
    }
}

/// Executes a [`TransferSpec`] against one host via its [`Provider`]. The
/// engine never talks to a host directly — every filesystem/git operation
/// is expressed as a provider `exec` or `transfer` call, so the same code
/// runs whether the host is local, a container, or reached over SSH.
pub struct TransferEngine<'a> {
    provider: &'a dyn Provider,
}

impl<'a> TransferEngine<'a> {
    pub fn new(provider: &'a dyn Provider) -> Self {
        Self { provider }
    }

    pub async fn materialize(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        match spec.mode {
            TransferMode::InPlace => self.in_place(spec),
            TransferMode::Copy => self.copy(host, spec).await,
            TransferMode::Clone => self.clone_repo(host, spec).await,
            TransferMode::Worktree => self.worktree(host, spec).await,
            TransferMode::Rsync => self.rsync(host, spec).await,
            TransferMode::VcsPush => self.vcs_push(host, spec).await,
            TransferMode::VcsPull => self.vcs_pull(host, spec).await,
            TransferMode::Pair => self.pair_initial_sync(host, spec).await,
        }
    }

    fn in_place(&self, spec: &TransferSpec) -> Result<(), TransferError> {
        if spec.source != spec.target {
            return Err(TransferError::NotSameHost);
        }
        Ok(())
    }

    async fn copy(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        let req = TransferRequest {
            direction: TransferDirection::Push,
            local: &spec.source,
            remote: &spec.target,
            include: &spec.include,
            exclude: &spec.exclude,
        };
        self.provider.transfer(host, req).await?;
        Ok(())
    }

    async fn rsync(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        // Incremental, size+mtime-aware copy: the provider port's `transfer`
        // primitive already implements this contract (§4.1); the engine's
        // job is only to carry the include/exclude globs through.
        self.copy(host, spec).await
    }

    async fn clone_repo(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        if !spec.mode.requires_same_host() {
            return Err(TransferError::NotSameHost);
        }
        self.exec(host, vec!["git".into(), "clone".into(), "--shared".into(), path_str(&spec.source), path_str(&spec.target)]).await?;
        Ok(())
    }

    async fn worktree(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        let branch = spec.branch.as_ref().ok_or(TransferError::MissingBranch("worktree"))?;
        let start_point = spec.start_point.clone().unwrap_or_else(|| "HEAD".to_string());
        self.exec(
            host,
            vec![
                "git".into(),
                "-C".into(),
                path_str(&spec.source),
                "worktree".into(),
                "add".into(),
                "-b".into(),
                branch.clone(),
                path_str(&spec.target),
                start_point,
            ],
        )
        .await?;
        Ok(())
    }

    /// Tears down a worktree created by [`Self::worktree`] (§4.6 agent
    /// destroy sequence: "delete agent's work_dir").
    pub async fn remove_worktree(&self, host: &HostDescriptor, repo_root: &Path, worktree_path: &Path) -> Result<(), TransferError> {
        self.exec(
            host,
            vec!["git".into(), "-C".into(), path_str(repo_root), "worktree".into(), "remove".into(), "--force".into(), path_str(worktree_path)],
        )
        .await?;
        Ok(())
    }

    async fn vcs_push(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        let needs_pop = self.check_uncommitted(host, &spec.target, spec.uncommitted).await?;
        let mut args = vec!["git".into(), "-C".into(), path_str(&spec.source), "push".into()];
        if matches!(spec.divergence, DivergencePolicy::AcceptRewrite) {
            args.push("--mirror".into());
        }
        args.push(path_str(&spec.target));
        self.exec(host, args).await?;
        if needs_pop {
            self.pop_stash(host, &spec.target).await?;
        }
        Ok(())
    }

    async fn vcs_pull(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        let needs_pop = self.check_uncommitted(host, &spec.target, spec.uncommitted).await?;
        let mut args = vec!["git".into(), "-C".into(), path_str(&spec.target), "pull".into(), "--ff-only".into()];
        if matches!(spec.divergence, DivergencePolicy::AcceptRewrite) {
            args = vec!["git".into(), "-C".into(), path_str(&spec.target), "fetch".into(), path_str(&spec.source)];
        }
        self.exec(host, args).await?;
        if needs_pop {
            self.pop_stash(host, &spec.target).await?;
        }
        Ok(())
    }

    /// §4.4 "Pair mode": an initial vcs-sync if both sides are
    /// source-control-managed, otherwise a plain copy.
    async fn pair_initial_sync(&self, host: &HostDescriptor, spec: &TransferSpec) -> Result<(), TransferError> {
        match self.vcs_pull(host, spec).await {
            Ok(()) => Ok(()),
            Err(TransferError::Provider(_)) => self.copy(host, spec).await,
            Err(e) => Err(e),
        }
    }

    /// §4.4 "Pair mode"'s continuous half: after the initial sync, loops
    /// until `cancel` fires, pushing or pulling whichever side's HEAD
    /// moved since the last cycle. When both moved, `spec.conflict`
    /// decides which side wins. Wakes up on a local filesystem change
    /// (via `notify`) when `host` is the local provider, otherwise polls
    /// every [`PAIR_POLL_INTERVAL`].
    pub async fn pair(&self, host: &HostDescriptor, spec: &TransferSpec, cancel: CancellationToken) -> Result<(), TransferError> {
        self.pair_initial_sync(host, spec).await?;
        let mut source_sig = self.tree_signature(host, &spec.source).await.ok();
        let mut target_sig = self.tree_signature(host, &spec.target).await.ok();
        let mut watch = (host.provider == ProviderKind::Local).then(|| watch_local_path(&spec.source)).flatten();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(PAIR_POLL_INTERVAL) => {}
                _ = wait_for_local_change(&mut watch) => {}
            }
            if cancel.is_cancelled() {
                break;
            }

            let new_source = self.tree_signature(host, &spec.source).await.ok();
            let new_target = self.tree_signature(host, &spec.target).await.ok();
            let source_changed = new_source.is_some() && new_source != source_sig;
            let target_changed = new_target.is_some() && new_target != target_sig;

            match (source_changed, target_changed) {
                (false, false) => {}
                (true, false) => self.vcs_push(host, spec).await?,
                (false, true) => self.vcs_pull(host, spec).await?,
                (true, true) => match spec.conflict {
                    ConflictPolicy::Source => self.vcs_push(host, spec).await?,
                    // No interactive channel reaches this layer; "ask" and
                    // "target" both resolve by keeping the target's work,
                    // the conservative choice for an unattended daemon.
                    ConflictPolicy::Target | ConflictPolicy::Ask => self.vcs_pull(host, spec).await?,
                    ConflictPolicy::Newer => {
                        if self.source_is_newer(host, &spec.source, &spec.target).await? {
                            self.vcs_push(host, spec).await?
                        } else {
                            self.vcs_pull(host, spec).await?
                        }
                    }
                },
            }

            source_sig = self.tree_signature(host, &spec.source).await.ok();
            target_sig = self.tree_signature(host, &spec.target).await.ok();
        }
        Ok(())
    }

    /// Returns `true` if `check_uncommitted` had to stash and the caller
    /// must restore it once the sync it guarded has completed.
    async fn check_uncommitted(&self, host: &HostDescriptor, target: &Path, policy: UncommittedPolicy) -> Result<bool, TransferError> {
        let status = self.exec(host, vec!["git".into(), "-C".into(), path_str(target), "status".into(), "--porcelain".into()]).await?;
        if status.stdout.trim().is_empty() {
            return Ok(false);
        }
        match policy {
            UncommittedPolicy::Fail => Err(TransferError::UncommittedChanges),
            UncommittedPolicy::Stash => {
                self.exec(host, vec!["git".into(), "-C".into(), path_str(target), "stash".into()]).await?;
                Ok(false)
            }
            UncommittedPolicy::Merge => {
                self.exec(host, vec!["git".into(), "-C".into(), path_str(target), "stash".into()]).await?;
                Ok(true)
            }
            UncommittedPolicy::Clobber => {
                self.exec(host, vec!["git".into(), "-C".into(), path_str(target), "reset".into(), "--hard".into()]).await?;
                Ok(false)
            }
        }
    }

    /// Restores the stash `check_uncommitted` set aside for
    /// `UncommittedPolicy::Merge`, reconciling the local edits it held
    /// back with whatever the sync just brought in.
    async fn pop_stash(&self, host: &HostDescriptor, target: &Path) -> Result<(), TransferError> {
        self.exec(host, vec!["git".into(), "-C".into(), path_str(target), "stash".into(), "pop".into()]).await?;
        Ok(())
    }

    async fn tree_signature(&self, host: &HostDescriptor, path: &Path) -> Result<String, TransferError> {
        let result = self.exec(host, vec!["git".into(), "-C".into(), path_str(path), "rev-parse".into(), "HEAD".into()]).await?;
        Ok(result.stdout.trim().to_string())
    }

    async fn source_is_newer(&self, host: &HostDescriptor, source: &Path, target: &Path) -> Result<bool, TransferError> {
        let source_ts = self.commit_epoch(host, source).await?;
        let target_ts = self.commit_epoch(host, target).await?;
        Ok(source_ts >= target_ts)
    }

    async fn commit_epoch(&self, host: &HostDescriptor, path: &Path) -> Result<u64, TransferError> {
        let result = self
            .exec(host, vec!["git".into(), "-C".into(), path_str(path), "log".into(), "-1".into(), "--format=%ct".into()])
            .await?;
        Ok(result.stdout.trim().parse().unwrap_or(0))
    }

    async fn exec(&self, host: &HostDescriptor, argv: Vec<String>) -> Result<fm_adapters::ExecResult, ProviderError> {
        let req = ExecRequest { argv, cwd: None, user: None, hard_timeout: DEFAULT_STEP_TIMEOUT, warn_timeout: None };
        self.provider.exec(host, req).await
    }
}

/// Holds a `notify` watcher alive for as long as pair mode needs its
/// change channel; dropping it (when the pair loop ends) stops watching.
struct LocalWatch {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<()>,
}

/// Best-effort local filesystem watch on `path` (or its parent, if `path`
/// is a file) for pair mode's low-latency wake-up. Returns `None` if the
/// path doesn't exist yet or the watcher can't be installed; the pair
/// loop falls back to polling in that case.
fn watch_local_path(path: &Path) -> Option<LocalWatch> {
    let watch_dir = if path.is_dir() { path.to_path_buf() } else { path.parent()?.to_path_buf() };
    let (tx, rx) = mpsc::channel(1);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if res.is_ok() {
            let _ = tx.try_send(());
        }
    })
    .ok()?;
    watcher.watch(&watch_dir, RecursiveMode::NonRecursive).ok()?;
    Some(LocalWatch { _watcher: watcher, rx })
}

/// Awaits the next local change notification, or never resolves when
/// there is no local watch installed (the pair loop then relies on its
/// sibling poll-interval branch in the same `select!`).
async fn wait_for_local_change(watch: &mut Option<LocalWatch>) {
    match watch {
        Some(w) => {
            w.rx.recv().await;
        }
        None => std::future::pending::<()>().await,
    }
}

fn path_str(p: &Path) -> String {
    p.display().to_string()
}

#[cfg(test)]
mod tests {
    use fm_adapters::{ExecResult, FakeProvider};
    use fm_core::ProviderKind;

    use super::*;

    fn host() -> HostDescriptor {
        fm_core::HostDescriptorBuilder::default().provider(ProviderKind::Local).build()
    }

    #[test]
    fn parses_all_mode_names() {
        assert_eq!(TransferMode::parse("in-place"), Some(TransferMode::InPlace));
        assert_eq!(TransferMode::parse("vcs-pull"), Some(TransferMode::VcsPull));
        assert_eq!(TransferMode::parse("nonsense"), None);
    }

    #[test]
    fn in_place_requires_equal_paths() {
        assert!(TransferMode::InPlace.requires_same_host());
        assert!(!TransferMode::Rsync.requires_same_host());
    }

    #[tokio::test]
    async fn in_place_rejects_mismatched_paths() {
        let provider = FakeProvider::new(ProviderKind::Local);
        let engine = TransferEngine::new(&provider);
        let spec = TransferSpec::new(TransferMode::InPlace, "/a", "/b");
        let err = engine.materialize(&host(), &spec).await.unwrap_err();
        assert!(matches!(err, TransferError::NotSameHost));
    }

    #[tokio::test]
    async fn copy_calls_provider_transfer_with_globs() {
        let provider = FakeProvider::new(ProviderKind::Local);
        let engine = TransferEngine::new(&provider);
        let mut spec = TransferSpec::new(TransferMode::Copy, "/src", "/dst");
        spec.exclude.push("*.log".into());
        engine.materialize(&host(), &spec).await.unwrap();
        let transfers = provider.transfers();
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].1, PathBuf::from("/src"));
    }

    #[tokio::test]
    async fn worktree_without_branch_fails() {
        let provider = FakeProvider::new(ProviderKind::Local);
        let engine = TransferEngine::new(&provider);
        let spec = TransferSpec::new(TransferMode::Worktree, "/repo", "/repo-wt");
        let err = engine.materialize(&host(), &spec).await.unwrap_err();
        assert!(matches!(err, TransferError::MissingBranch("worktree")));
    }

    #[tokio::test]
    async fn worktree_with_branch_shells_git_worktree_add() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        let engine = TransferEngine::new(&provider);
        let mut spec = TransferSpec::new(TransferMode::Worktree, "/repo", "/repo-wt");
        spec.branch = Some("feature-x".into());
        engine.materialize(&host(), &spec).await.unwrap();
        let calls = provider.exec_calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].contains(&"worktree".to_string()));
        assert!(calls[0].contains(&"feature-x".to_string()));
    }

    #[tokio::test]
    async fn vcs_push_fails_on_uncommitted_changes_by_default() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, stdout: " M file.rs\n".into(), ..Default::default() });
        let engine = TransferEngine::new(&provider);
        let spec = TransferSpec::new(TransferMode::VcsPush, "/src", "/dst");
        let err = engine.materialize(&host(), &spec).await.unwrap_err();
        assert!(matches!(err, TransferError::UncommittedChanges));
    }

    #[tokio::test]
    async fn vcs_push_clobber_resets_then_pushes() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, stdout: " M file.rs\n".into(), ..Default::default() });
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        let engine = TransferEngine::new(&provider);
        let mut spec = TransferSpec::new(TransferMode::VcsPush, "/src", "/dst");
        spec.uncommitted = UncommittedPolicy::Clobber;
        engine.materialize(&host(), &spec).await.unwrap();
        let calls = provider.exec_calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[1].contains(&"reset".to_string()));
        assert!(calls[2].contains(&"push".to_string()));
    }

    #[tokio::test]
    async fn vcs_push_merge_stashes_then_pushes_then_pops() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, stdout: " M file.rs\n".into(), ..Default::default() });
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        let engine = TransferEngine::new(&provider);
        let mut spec = TransferSpec::new(TransferMode::VcsPush, "/src", "/dst");
        spec.uncommitted = UncommittedPolicy::Merge;
        engine.materialize(&host(), &spec).await.unwrap();
        let calls = provider.exec_calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[1].contains(&"stash".to_string()));
        assert!(calls[2].contains(&"push".to_string()));
        assert!(calls[3].contains(&"stash".to_string()) && calls[3].contains(&"pop".to_string()));
    }

    #[tokio::test]
    async fn vcs_push_accept_rewrite_uses_mirror_not_force() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        let engine = TransferEngine::new(&provider);
        let mut spec = TransferSpec::new(TransferMode::VcsPush, "/src", "/dst");
        spec.divergence = DivergencePolicy::AcceptRewrite;
        engine.materialize(&host(), &spec).await.unwrap();
        let calls = provider.exec_calls();
        assert!(calls[1].contains(&"--mirror".to_string()));
        assert!(!calls[1].contains(&"--force".to_string()));
    }

    #[tokio::test]
    async fn pair_runs_initial_sync_then_stops_when_already_cancelled() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, stdout: "".into(), ..Default::default() }); // status
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() }); // pull --ff-only
        let engine = TransferEngine::new(&provider);
        let spec = TransferSpec::new(TransferMode::Pair, "/src", "/dst");
        let cancel = CancellationToken::new();
        cancel.cancel();
        engine.pair(&host(), &spec, cancel).await.unwrap();
        assert!(provider.transfers().is_empty());
        // status + pull for the initial sync, then two `rev-parse HEAD`
        // signature reads before the already-cancelled loop exits.
        assert_eq!(provider.exec_calls().len(), 4);
    }
}
