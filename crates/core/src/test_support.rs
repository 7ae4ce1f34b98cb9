// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::agent::{AgentDescriptor, AgentId, AgentStatus, IdleMode};
use crate::host::{HostDescriptor, HostId, HostStatus};
use crate::provider_kind::ProviderKind;
use std::path::PathBuf;

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::agent::AgentStatus;
    use crate::host::HostStatus;
    use proptest::prelude::*;

    pub fn arb_agent_status() -> impl Strategy<Value = AgentStatus> {
        prop_oneof![
            Just(AgentStatus::Creating),
            Just(AgentStatus::Running),
            Just(AgentStatus::Stopped),
            Just(AgentStatus::Destroying),
            Just(AgentStatus::Destroyed),
        ]
    }

    pub fn arb_host_status() -> impl Strategy<Value = HostStatus> {
        prop_oneof![
            Just(HostStatus::Building),
            Just(HostStatus::Starting),
            Just(HostStatus::Running),
            Just(HostStatus::Stopping),
            Just(HostStatus::Stopped),
            Just(HostStatus::Destroyed),
            Just(HostStatus::Failed),
        ]
    }
}

/// A minimal `running` local host, for tests that don't care about its
/// specific fields.
pub fn fake_host(id: &str, name: &str) -> HostDescriptor {
    HostDescriptor::builder()
        .id(HostId::from_string(id))
        .name(name)
        .provider(ProviderKind::Local)
        .status(HostStatus::Running)
        .build()
}

/// A minimal `running` agent on the given host, for tests that don't care
/// about its specific fields.
pub fn fake_agent(id: &str, host_id: &str, name: &str) -> AgentDescriptor {
    AgentDescriptor::builder()
        .id(AgentId::from_string(id))
        .host_id(HostId::from_string(host_id))
        .name(name)
        .agent_type("generic")
        .command(vec!["true".to_string()])
        .work_dir(PathBuf::from("/tmp/work"))
        .idle_mode(IdleMode::Io)
        .idle_timeout_seconds(3600)
        .status(AgentStatus::Running)
        .build()
}
