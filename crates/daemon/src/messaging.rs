// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messaging Adapter (C10, §4.10): sends text into an agent's session via
//! `SessionAdapter::send_keys`, with an explicit trailing-newline policy
//! and multi-target fan-out.
//!
//! Grounded on the teacher's `daemon/src/engine/runtime/handlers/
//! message.rs`: a thin wrapper that resolves targets then calls the same
//! per-target primitive in a loop, collecting per-target outcomes instead
//! of failing the whole batch on the first error.

use fm_adapters::{NotifyAdapter, SessionError};
use fm_core::{AgentId, Clock};
use fm_storage::StoreError;
use thiserror::Error;

use crate::context::DaemonContext;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl MessagingError {
    pub fn to_error_kind(&self) -> fm_core::ErrorKind {
        match self {
            MessagingError::Store(e) => e.to_error_kind(),
            MessagingError::Session(e) => e.to_error_kind(),
        }
    }
}

/// Whether a multi-target send keeps going after one target fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    Abort,
    Continue,
}

impl From<fm_wire::OnError> for OnError {
    fn from(value: fm_wire::OnError) -> Self {
        match value {
            fm_wire::OnError::Abort => OnError::Abort,
            fm_wire::OnError::Continue => OnError::Continue,
        }
    }
}

/// Outcome of a send to a single agent.
pub struct TargetResult {
    pub agent_id: AgentId,
    pub result: Result<(), MessagingError>,
}

/// Sends `text` to one agent's session, appending a trailing newline
/// unless `raw` is set (§4.10: "trailing newline policy is explicit").
pub async fn send<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_ref: &str,
    text: &str,
    append_newline: bool,
) -> Result<(), MessagingError> {
    let mut agent = ctx.store.find_agent(agent_ref)?;
    let host = ctx.store.read_host(&agent.host_id)?;
    let session = ctx.session_name(&agent.name);
    let mut payload = text.as_bytes().to_vec();
    if append_newline && !payload.ends_with(b"\n") {
        payload.push(b'\n');
    }
    ctx.session.send_keys(&host, &session, &payload).await?;
    let now = ctx.clock.epoch_ms();
    ctx.activity.touch(&agent.host_id, "user", now)?;
    agent.user_activity_at_epoch_ms = fm_core::AgentDescriptor::bump_activity(agent.user_activity_at_epoch_ms, now);
    ctx.store.write_agent(&agent)?;
    Ok(())
}

/// Fans a message out across several agents, isolating per-agent failures.
/// Under [`OnError::Abort`], the first failure stops the remaining sends;
/// under [`OnError::Continue`], every target is attempted regardless.
pub async fn send_many<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_refs: &[String],
    text: &str,
    append_newline: bool,
    on_error: OnError,
) -> Vec<TargetResult> {
    let mut results = Vec::with_capacity(agent_refs.len());
    for agent_ref in agent_refs {
        let result = send(ctx, agent_ref, text, append_newline).await;
        let agent_id = match ctx.store.find_agent(agent_ref) {
            Ok(a) => a.id,
            Err(_) => AgentId::from_string(agent_ref.clone()),
        };
        let failed = result.is_err();
        results.push(TargetResult { agent_id, result });
        if failed && on_error == OnError::Abort {
            break;
        }
    }
    results
}
