// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Custom error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly, allowing `main()` to handle process termination. The code
//! always matches `fm_core::ErrorKind::exit_code()` (§6) so a daemon error
//! and a CLI-local validation error land on the same exit code for the
//! same failure category.

use std::fmt;

use fm_core::ErrorKind;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    /// Builds an `ExitError` from a taxonomy kind (§7), for CLI-local
    /// validation failures that never reach the daemon.
    pub fn kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind.exit_code(), message.into())
    }

    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(1, message)
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Maps a daemon error message back to an exit code. The wire protocol
/// carries only a display string (`Response::Error { message }`), so this
/// recognizes the `ErrorKind` Display spellings `FmError` produces and
/// falls back to the generic-failure code for anything else (e.g. a
/// `ClientError` that never reached the daemon at all).
pub fn exit_code_for_daemon_message(message: &str) -> i32 {
    for (needle, kind) in [
        ("(invalid_request)", ErrorKind::InvalidRequest),
        ("(invalid_spec)", ErrorKind::InvalidSpec),
        ("(not_found)", ErrorKind::NotFound),
        ("(lock_contention)", ErrorKind::LockContention),
        ("(timeout)", ErrorKind::Timeout),
        ("(unavailable)", ErrorKind::Unavailable),
        ("(quota)", ErrorKind::Quota),
        ("(integrity)", ErrorKind::Integrity),
        ("(internal)", ErrorKind::Internal),
    ] {
        if message.contains(needle) {
            return kind.exit_code();
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_kind_markers_in_daemon_messages() {
        assert_eq!(exit_code_for_daemon_message("destroy_host failed (not_found) host=hst-x"), 3);
        assert_eq!(exit_code_for_daemon_message("create_agent failed (lock_contention) host=hst-x"), 4);
    }

    #[test]
    fn unrecognized_messages_fall_back_to_generic() {
        assert_eq!(exit_code_for_daemon_message("connection refused"), 1);
    }
}
