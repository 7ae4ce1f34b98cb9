// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured error taxonomy (§7) shared by every FM crate and surfaced to
//! the CLI as an exit code.
//!
//! Grounded on the teacher's per-adapter `thiserror` enums (e.g. its agent
//! adapter's `AgentAdapterError`): one shared taxonomy type, carrying kind,
//! operation, identifiers, and an optional cause, instead of one bespoke
//! error enum per crate.

use std::fmt;

/// The seven failure categories of spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    NotFound,
    LockContention,
    Unavailable,
    Quota,
    InvalidSpec,
    Timeout,
    Integrity,
    Internal,
}

impl ErrorKind {
    /// Whether a caller may usefully retry an operation that failed with
    /// this kind. The orchestrator never retries internally (§7) — this is
    /// only a hint surfaced to the user or an outer scripted loop.
    pub fn retryable(self) -> bool {
        matches!(self, ErrorKind::LockContention | ErrorKind::Unavailable)
    }

    /// Process exit code per spec §6's common exit codes.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::InvalidRequest | ErrorKind::InvalidSpec => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::LockContention => 4,
            ErrorKind::Timeout => 5,
            ErrorKind::Unavailable
            | ErrorKind::Quota
            | ErrorKind::Integrity
            | ErrorKind::Internal => 1,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::NotFound => "not_found",
            ErrorKind::LockContention => "lock_contention",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Quota => "quota",
            ErrorKind::InvalidSpec => "invalid_spec",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Integrity => "integrity",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// A structured FM error: kind, the operation that failed, the identifiers
/// involved, and an optional underlying cause.
#[derive(Debug, thiserror::Error)]
#[error("{operation} failed ({kind}){}{}",
    .host_id.as_ref().map(|h| format!(" host={h}")).unwrap_or_default(),
    .agent_id.as_ref().map(|a| format!(" agent={a}")).unwrap_or_default())]
pub struct FmError {
    pub kind: ErrorKind,
    pub operation: &'static str,
    pub host_id: Option<String>,
    pub agent_id: Option<String>,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl FmError {
    pub fn new(kind: ErrorKind, operation: &'static str) -> Self {
        Self { kind, operation, host_id: None, agent_id: None, cause: None }
    }

    pub fn host(mut self, host_id: impl Into<String>) -> Self {
        self.host_id = Some(host_id.into());
        self
    }

    pub fn agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn not_found(operation: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, operation)
    }

    pub fn invalid_request(operation: &'static str) -> Self {
        Self::new(ErrorKind::InvalidRequest, operation)
    }

    pub fn lock_contention(operation: &'static str) -> Self {
        Self::new(ErrorKind::LockContention, operation)
    }

    pub fn unavailable(operation: &'static str) -> Self {
        Self::new(ErrorKind::Unavailable, operation)
    }

    pub fn timeout(operation: &'static str) -> Self {
        Self::new(ErrorKind::Timeout, operation)
    }

    pub fn exit_code(&self) -> i32 {
        self.kind.exit_code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds() {
        assert!(ErrorKind::Unavailable.retryable());
        assert!(ErrorKind::LockContention.retryable());
        assert!(!ErrorKind::NotFound.retryable());
    }

    #[test]
    fn exit_codes_match_spec_table() {
        assert_eq!(ErrorKind::InvalidRequest.exit_code(), 2);
        assert_eq!(ErrorKind::NotFound.exit_code(), 3);
        assert_eq!(ErrorKind::LockContention.exit_code(), 4);
        assert_eq!(ErrorKind::Timeout.exit_code(), 5);
        assert_eq!(ErrorKind::Internal.exit_code(), 1);
    }

    #[test]
    fn display_includes_identifiers() {
        let err = FmError::not_found("destroy_host").host("hst-abc");
        let msg = err.to_string();
        assert!(msg.contains("destroy_host"));
        assert!(msg.contains("hst-abc"));
    }
}
