// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timer identifiers for the two timeout kinds FM schedules (§5).
//!
//! Pruned from the teacher's much larger `TimerKind` (liveness/cooldown/
//! queue-retry/cron/queue-poll) down to the two kinds this system actually
//! needs: the idle supervisor's per-host poll tick (§4.9) and the
//! two-threshold exec/transfer timeout (§4.1, §5). Unlike `AgentId`/`HostId`,
//! a timer id is a structured routing key of variable length rather than a
//! fixed-width random suffix, so it is a plain string newtype, not an
//! `IdBuf`-backed `define_id!` type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::host::HostId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(pub String);

impl TimerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn idle_poll(host: &HostId) -> Self {
        TimerKind::IdlePoll(host.clone()).to_timer_id()
    }

    pub fn exec_timeout(host: &HostId, operation: &str) -> Self {
        TimerKind::ExecTimeout { host: host.clone(), operation: operation.to_string() }.to_timer_id()
    }

    pub fn kind(&self) -> Option<TimerKind> {
        TimerKind::parse(&self.0)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parsed representation of a timer ID for type-safe routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerKind {
    /// §4.9: per-host idle-supervisor poll tick.
    IdlePoll(HostId),
    /// §4.1/§5: hard-timeout deadline for an in-flight provider call.
    ExecTimeout { host: HostId, operation: String },
}

impl TimerKind {
    pub fn parse(id: &str) -> Option<TimerKind> {
        if let Some(rest) = id.strip_prefix("idle-poll:") {
            return Some(TimerKind::IdlePoll(HostId::from_string(rest)));
        }
        if let Some(rest) = id.strip_prefix("exec-timeout:") {
            let (host, operation) = rest.split_once(':')?;
            return Some(TimerKind::ExecTimeout {
                host: HostId::from_string(host),
                operation: operation.to_string(),
            });
        }
        None
    }

    pub fn to_timer_id(&self) -> TimerId {
        match self {
            TimerKind::IdlePoll(host) => TimerId::new(format!("idle-poll:{host}")),
            TimerKind::ExecTimeout { host, operation } => {
                TimerId::new(format!("exec-timeout:{host}:{operation}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_poll_round_trips() {
        let host = HostId::from_string("hst-aaa");
        let id = TimerId::idle_poll(&host);
        assert_eq!(id.kind(), Some(TimerKind::IdlePoll(host)));
    }

    #[test]
    fn exec_timeout_round_trips() {
        let host = HostId::from_string("hst-bbb");
        let id = TimerId::exec_timeout(&host, "create_host");
        assert_eq!(
            id.kind(),
            Some(TimerKind::ExecTimeout { host, operation: "create_host".to_string() })
        );
    }

    #[test]
    fn unknown_format_parses_to_none() {
        assert_eq!(TimerKind::parse("bogus"), None);
    }
}
