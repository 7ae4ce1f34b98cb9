// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier & naming rules (C1).
//!
//! Agent ids and host ids are generated, opaque `fm-core::id` values (see
//! [`crate::agent::AgentId`], [`crate::host::HostId`]). Names are user-chosen,
//! mutable, and must be unique within the fleet at any moment (data model
//! invariant 2) — this module validates the name grammar only; uniqueness is
//! enforced by `fm-storage` against the live descriptor set.

/// Maximum length of a user-chosen agent or host name.
pub const MAX_NAME_LEN: usize = 63;

/// A name is valid if non-empty, at most [`MAX_NAME_LEN`] bytes, starts with
/// an ASCII letter, and contains only ASCII alphanumerics, `-` and `_`.
///
/// This mirrors the grammar of a DNS label / tmux session name component so
/// that a name is always safe to use verbatim as a session name suffix and
/// as a path component.
pub fn validate_name(name: &str) -> Result<(), InvalidName> {
    if name.is_empty() {
        return Err(InvalidName::Empty);
    }
    if name.len() > MAX_NAME_LEN {
        return Err(InvalidName::TooLong(name.len()));
    }
    let mut chars = name.chars();
    let first = chars.next().ok_or(InvalidName::Empty)?;
    if !first.is_ascii_alphabetic() {
        return Err(InvalidName::BadStart(first));
    }
    for c in chars {
        if !(c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(InvalidName::BadChar(c));
        }
    }
    Ok(())
}

/// Build the multiplexer session name for an agent: `<prefix><agent-name>`.
///
/// Spec invariant 3: session name is maintained in lockstep with the agent
/// name across renames; this function is the single place that formats it so
/// the rename protocol and the create sequence never drift apart.
pub fn session_name(prefix: &str, agent_name: &str) -> String {
    format!("{prefix}{agent_name}")
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidName {
    #[error("name must not be empty")]
    Empty,
    #[error("name is {0} bytes, exceeds the {MAX_NAME_LEN}-byte limit")]
    TooLong(usize),
    #[error("name must start with an ASCII letter, got {0:?}")]
    BadStart(char),
    #[error("name contains disallowed character {0:?}")]
    BadChar(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_names() {
        assert!(validate_name("foo").is_ok());
        assert!(validate_name("foo-bar_2").is_ok());
    }

    #[test]
    fn rejects_empty_and_bad_start() {
        assert_eq!(validate_name(""), Err(InvalidName::Empty));
        assert_eq!(validate_name("2foo"), Err(InvalidName::BadStart('2')));
        assert_eq!(validate_name("-foo"), Err(InvalidName::BadStart('-')));
    }

    #[test]
    fn rejects_bad_chars_and_overlength() {
        assert_eq!(validate_name("foo bar"), Err(InvalidName::BadChar(' ')));
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert_eq!(validate_name(&long), Err(InvalidName::TooLong(long.len())));
    }

    #[test]
    fn session_name_is_prefix_plus_name() {
        assert_eq!(session_name("fm-", "foo"), "fm-foo");
    }
}
