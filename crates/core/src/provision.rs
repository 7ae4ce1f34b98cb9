// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Provisioning pipeline data types (C6, §4.5).
//!
//! Grounded on the teacher's `Job`/`StepRecord`/`StepOutcome`/`StepStatus`
//! machinery (`core/src/job.rs`): same step/step_status/step_history shape,
//! generalized from "runbook step executing an agent" to the six concrete
//! provisioning-step operations. The executor (`fm-engine::provision`) walks
//! these; this crate only defines the vocabulary.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Identifies one run of the provisioning pipeline against one agent.
    pub struct ProvisionRunId("prv-");
}

/// One of the six concrete provisioning operations (§4.5 lists five
/// categories; `append_to_file`/`prepend_to_file` are the two text-insertion
/// variants of category 3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    Upload { local: PathBuf, remote: PathBuf, mode: Option<u32> },
    CreateDir { remote: PathBuf },
    AppendToFile { remote: PathBuf, text: String },
    PrependToFile { remote: PathBuf, text: String },
    RunUser { command: String },
    RunSudo { command: String },
    ApplyEnv { key: String, value: String },
}

impl StepKind {
    /// Short tag used in logs and the CLI's step display.
    pub fn label(&self) -> &'static str {
        match self {
            StepKind::Upload { .. } => "upload",
            StepKind::CreateDir { .. } => "create_dir",
            StepKind::AppendToFile { .. } => "append_to_file",
            StepKind::PrependToFile { .. } => "prepend_to_file",
            StepKind::RunUser { .. } => "run_user",
            StepKind::RunSudo { .. } => "run_sudo",
            StepKind::ApplyEnv { .. } => "apply_env",
        }
    }

    /// Whether this step kind's idempotence contract is "skip if content
    /// already present" rather than "authors must write idempotent
    /// commands" (§4.5 Idempotence contract).
    pub fn is_content_idempotent(&self) -> bool {
        matches!(self, StepKind::AppendToFile { .. } | StepKind::PrependToFile { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Skipped,
}

/// Outcome of one executed step: exit detail plus whether the idempotent
/// skip-check fired.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout_tail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr_tail: Option<String>,
    #[serde(default)]
    pub skipped_idempotent: bool,
}

/// One entry in a provision run's step history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub kind: StepKind,
    pub status: StepStatus,
    pub outcome: StepOutcome,
    pub started_at_epoch_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at_epoch_ms: Option<u64>,
}

/// A full provisioning run against one agent: the ordered step list from
/// §4.5's ordering rule (agent-type defaults, then user-supplied steps, then
/// environment writes) plus its execution history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRun {
    pub id: ProvisionRunId,
    pub steps: Vec<StepRecord>,
}

impl ProvisionRun {
    pub fn new(id: ProvisionRunId) -> Self {
        Self { id, steps: Vec::new() }
    }

    pub fn failed_step(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.status == StepStatus::Failed)
    }

    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| matches!(s.status, StepStatus::Succeeded | StepStatus::Skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(status: StepStatus) -> StepRecord {
        StepRecord {
            index: 0,
            kind: StepKind::RunUser { command: "true".into() },
            status,
            outcome: StepOutcome::default(),
            started_at_epoch_ms: 0,
            finished_at_epoch_ms: None,
        }
    }

    #[test]
    fn labels_match_step_kind() {
        assert_eq!(StepKind::CreateDir { remote: "/tmp/x".into() }.label(), "create_dir");
        assert_eq!(StepKind::RunSudo { command: "apt update".into() }.label(), "run_sudo");
    }

    #[test]
    fn only_append_and_prepend_are_content_idempotent() {
        assert!(StepKind::AppendToFile { remote: "/a".into(), text: "x".into() }.is_content_idempotent());
        assert!(StepKind::PrependToFile { remote: "/a".into(), text: "x".into() }.is_content_idempotent());
        assert!(!StepKind::RunUser { command: "x".into() }.is_content_idempotent());
    }

    #[test]
    fn run_is_complete_only_when_no_pending_or_failed_steps_remain() {
        let mut run = ProvisionRun::new(ProvisionRunId::new());
        run.steps.push(step(StepStatus::Succeeded));
        run.steps.push(step(StepStatus::Skipped));
        assert!(run.is_complete());
        run.steps.push(step(StepStatus::Running));
        assert!(!run.is_complete());
    }

    #[test]
    fn finds_the_first_failed_step() {
        let mut run = ProvisionRun::new(ProvisionRunId::new());
        run.steps.push(step(StepStatus::Succeeded));
        run.steps.push(step(StepStatus::Failed));
        assert!(run.failed_step().is_some());
    }
}
