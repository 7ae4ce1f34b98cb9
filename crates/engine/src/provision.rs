// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning Pipeline (C6, §4.5): walks an ordered list of [`StepKind`]
//! entries against a host through its [`Provider`], recording a
//! [`ProvisionRun`] as it goes.
//!
//! Grounded on `core/src/job.rs`'s step-history/outcome machinery, now
//! generalized from "one agent-type step executing a CLI subcommand" to the
//! five concrete provisioning operations of §4.5. Content-hash idempotence
//! skip checks for `append_to_file`/`prepend_to_file` use `sha2`, matching
//! the teacher's own content-addressing for job logs/artifacts.

use std::time::Duration;

use fm_adapters::{ExecRequest, Provider, ProviderError};
use fm_core::{HostDescriptor, ProvisionRun, StepKind, StepOutcome, StepRecord, StepStatus};
use sha2::{Digest, Sha256};
use thiserror::Error;

const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("step {index} ({kind}) failed: {detail}")]
    StepFailed { index: usize, kind: &'static str, detail: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ProvisionError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        match self {
            ProvisionError::StepFailed { .. } => fm_core::ErrorKind::InvalidSpec,
            ProvisionError::Provider(e) => e.to_error_kind(),
        }
    }
}

/// Walks a [`ProvisionRun`]'s steps in order against a host, via its
/// [`Provider`]. §4.5 ordering ("agent-type default steps → user-supplied
/// steps → environment writes") is the caller's responsibility when it
/// assembles `run.steps`; the executor only enforces "failure aborts the
/// sequence" and the idempotence skip-check.
pub struct ProvisionExecutor<'a, C: fm_core::Clock> {
    provider: &'a dyn Provider,
    clock: &'a C,
}

impl<'a, C: fm_core::Clock> ProvisionExecutor<'a, C> {
    pub fn new(provider: &'a dyn Provider, clock: &'a C) -> Self {
        Self { provider, clock }
    }

    /// Runs every pending step in `run`, mutating its step history in
    /// place. Returns `Ok(())` if every step succeeded or was skipped;
    /// returns the first failure otherwise, leaving subsequent steps
    /// untouched per §4.5 "failure in any step aborts the sequence".
    pub async fn run(&self, host: &HostDescriptor, run: &mut ProvisionRun) -> Result<(), ProvisionError> {
        for index in 0..run.steps.len() {
            if run.steps[index].status != StepStatus::Pending {
                continue;
            }
            self.run_step(host, run, index).await?;
            if run.steps[index].status == StepStatus::Failed {
                let outcome = &run.steps[index].outcome;
                return Err(ProvisionError::StepFailed {
                    index,
                    kind: run.steps[index].kind.label(),
                    detail: outcome.stderr_tail.clone().unwrap_or_default(),
                });
            }
        }
        Ok(())
    }

    async fn run_step(&self, host: &HostDescriptor, run: &mut ProvisionRun, index: usize) -> Result<(), ProvisionError> {
        run.steps[index].status = StepStatus::Running;
        run.steps[index].started_at_epoch_ms = self.clock.epoch_ms();

        if let Some(command) = shell_command(&run.steps[index].kind) {
            if let Err(errors) = fm_shell::parse_and_validate(command) {
                run.steps[index].status = StepStatus::Failed;
                run.steps[index].outcome = StepOutcome { stderr_tail: Some(errors.join("; ")), ..Default::default() };
                run.steps[index].finished_at_epoch_ms = Some(self.clock.epoch_ms());
                return Ok(());
            }
        }

        if run.steps[index].kind.is_content_idempotent() && self.already_applied(host, &run.steps[index].kind).await? {
            run.steps[index].status = StepStatus::Skipped;
            run.steps[index].outcome = StepOutcome { skipped_idempotent: true, ..Default::default() };
            run.steps[index].finished_at_epoch_ms = Some(self.clock.epoch_ms());
            return Ok(());
        }

        let outcome = self.execute(host, &run.steps[index].kind).await?;
        let succeeded = outcome.exit_code.map(|c| c == 0).unwrap_or(true);
        run.steps[index].status = if succeeded { StepStatus::Succeeded } else { StepStatus::Failed };
        run.steps[index].outcome = outcome;
        run.steps[index].finished_at_epoch_ms = Some(self.clock.epoch_ms());
        Ok(())
    }

    async fn already_applied(&self, host: &HostDescriptor, kind: &StepKind) -> Result<bool, ProviderError> {
        let (remote, text) = match kind {
            StepKind::AppendToFile { remote, text } | StepKind::PrependToFile { remote, text } => (remote, text),
            _ => return Ok(false),
        };
        let result = self
            .exec(host, vec!["cat".into(), remote.display().to_string()])
            .await?;
        if result.exit_code != 0 {
            return Ok(false);
        }
        Ok(result.stdout.contains(text.as_str()) || content_hash(&result.stdout) == content_hash(text))
    }

    async fn execute(&self, host: &HostDescriptor, kind: &StepKind) -> Result<StepOutcome, ProviderError> {
        let argv = match kind {
            StepKind::Upload { local, remote, mode } => {
                let req = fm_adapters::TransferRequest {
                    direction: fm_adapters::TransferDirection::Push,
                    local,
                    remote,
                    include: &[],
                    exclude: &[],
                };
                self.provider.transfer(host, req).await?;
                if let Some(mode) = mode {
                    return self.exec_outcome(host, vec!["chmod".into(), format!("{mode:o}"), remote.display().to_string()]).await;
                }
                return Ok(StepOutcome { exit_code: Some(0), ..Default::default() });
            }
            StepKind::CreateDir { remote } => vec!["mkdir".into(), "-p".into(), remote.display().to_string()],
            StepKind::AppendToFile { remote, text } => shell_append(remote.display().to_string(), text, false),
            StepKind::PrependToFile { remote, text } => shell_append(remote.display().to_string(), text, true),
            StepKind::RunUser { command } => vec!["sh".into(), "-c".into(), command.clone()],
            StepKind::RunSudo { command } => vec!["sudo".into(), "sh".into(), "-c".into(), command.clone()],
            StepKind::ApplyEnv { key, value } => {
                shell_append("$HOME/.fm_env".into(), &format!("{key}={value}"), false)
            }
        };
        self.exec_outcome(host, argv).await
    }

    async fn exec_outcome(&self, host: &HostDescriptor, argv: Vec<String>) -> Result<StepOutcome, ProviderError> {
        let result = self.exec(host, argv).await?;
        Ok(StepOutcome {
            exit_code: Some(result.exit_code),
            stdout_tail: Some(tail(&result.stdout, 4096)),
            stderr_tail: Some(tail(&result.stderr, 4096)),
            skipped_idempotent: false,
        })
    }

    async fn exec(&self, host: &HostDescriptor, argv: Vec<String>) -> Result<fm_adapters::ExecResult, ProviderError> {
        let req = ExecRequest { argv, cwd: None, user: None, hard_timeout: DEFAULT_STEP_TIMEOUT, warn_timeout: None };
        self.provider.exec(host, req).await
    }
}

/// Extracts the raw shell command from `run_user`/`run_sudo` steps so it
/// can be validated before it's shelled out — steps come from agent-type
/// defaults (already checked in `fm-profile::resolve`) but also from
/// CLI-/config-supplied runbooks, which never go through that check.
fn shell_command(kind: &StepKind) -> Option<&str> {
    match kind {
        StepKind::RunUser { command } | StepKind::RunSudo { command } => Some(command.as_str()),
        _ => None,
    }
}

fn shell_append(remote: String, text: &str, prepend: bool) -> Vec<String> {
    let escaped = text.replace('\'', "'\\''");
    let command = if prepend {
        format!("printf '%s\\n' '{escaped}' | cat - '{remote}' > '{remote}.tmp' && mv '{remote}.tmp' '{remote}'")
    } else {
        format!("printf '%s\\n' '{escaped}' >> '{remote}'")
    };
    vec!["sh".into(), "-c".into(), command]
}

fn content_hash(s: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn tail(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        s.to_string()
    } else {
        s[s.len() - max_bytes..].to_string()
    }
}

#[cfg(test)]
mod tests {
    use fm_adapters::{ExecResult, FakeProvider};
    use fm_core::{FakeClock, ProviderKind, ProvisionRunId};

    use super::*;

    fn host() -> HostDescriptor {
        fm_core::HostDescriptorBuilder::default().provider(ProviderKind::Local).build()
    }

    fn run_with(steps: Vec<StepKind>) -> ProvisionRun {
        let mut run = ProvisionRun::new(ProvisionRunId::new());
        for (index, kind) in steps.into_iter().enumerate() {
            run.steps.push(StepRecord {
                index,
                kind,
                status: StepStatus::Pending,
                outcome: StepOutcome::default(),
                started_at_epoch_ms: 0,
                finished_at_epoch_ms: None,
            });
        }
        run
    }

    #[tokio::test]
    async fn run_user_step_succeeds_on_zero_exit() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        let clock = FakeClock::new();
        let executor = ProvisionExecutor::new(&provider, &clock);
        let mut run = run_with(vec![StepKind::RunUser { command: "true".into() }]);
        executor.run(&host(), &mut run).await.unwrap();
        assert_eq!(run.steps[0].status, StepStatus::Succeeded);
    }

    #[tokio::test]
    async fn failure_aborts_remaining_steps() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 1, stderr: "boom".into(), ..Default::default() });
        let clock = FakeClock::new();
        let executor = ProvisionExecutor::new(&provider, &clock);
        let mut run = run_with(vec![
            StepKind::RunUser { command: "false".into() },
            StepKind::RunUser { command: "true".into() },
        ]);
        let err = executor.run(&host(), &mut run).await.unwrap_err();
        assert!(matches!(err, ProvisionError::StepFailed { index: 0, .. }));
        assert_eq!(run.steps[0].status, StepStatus::Failed);
        assert_eq!(run.steps[1].status, StepStatus::Pending);
    }

    #[tokio::test]
    async fn append_to_file_skips_when_text_already_present() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, stdout: "export FOO=bar\n".into(), ..Default::default() });
        let clock = FakeClock::new();
        let executor = ProvisionExecutor::new(&provider, &clock);
        let mut run = run_with(vec![StepKind::AppendToFile { remote: "/etc/profile.d/fm.sh".into(), text: "export FOO=bar".into() }]);
        executor.run(&host(), &mut run).await.unwrap();
        assert_eq!(run.steps[0].status, StepStatus::Skipped);
        assert!(run.steps[0].outcome.skipped_idempotent);
    }

    #[tokio::test]
    async fn run_user_step_with_unparseable_command_fails_without_executing() {
        let provider = FakeProvider::new(ProviderKind::Local);
        let clock = FakeClock::new();
        let executor = ProvisionExecutor::new(&provider, &clock);
        let mut run = run_with(vec![StepKind::RunUser { command: "echo 'unterminated".into() }]);
        let err = executor.run(&host(), &mut run).await.unwrap_err();
        assert!(matches!(err, ProvisionError::StepFailed { index: 0, .. }));
        assert_eq!(run.steps[0].status, StepStatus::Failed);
        assert!(provider.exec_calls().is_empty());
    }

    #[tokio::test]
    async fn create_dir_runs_mkdir_p() {
        let provider = FakeProvider::new(ProviderKind::Local);
        provider.push_exec_result(ExecResult { exit_code: 0, ..Default::default() });
        let clock = FakeClock::new();
        let executor = ProvisionExecutor::new(&provider, &clock);
        let mut run = run_with(vec![StepKind::CreateDir { remote: "/opt/fm".into() }]);
        executor.run(&host(), &mut run).await.unwrap();
        let calls = provider.exec_calls();
        assert!(calls[0].contains(&"mkdir".to_string()));
    }
}
