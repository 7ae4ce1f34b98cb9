// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm connect` — interactive takeover of an agent's session (§4.3).
//!
//! `TmuxSessionAdapter::attach` deliberately refuses to run from a
//! non-interactive context (it cannot hand the caller's tty to a detached
//! subprocess call); real attach happens by execing `tmux attach -t
//! <session>` directly from the CLI process, which already owns the tty.
//! `fm` only talks to `fmd` to resolve the agent, confirm it's attachable
//! (`AgentAttach` validates the id and any pairing token against the
//! fleet's state — §4.3, §4.11), and compute its session name; the
//! terminal handoff itself never goes over the IPC socket.

use std::process::Command;

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;

#[derive(Args)]
pub struct ConnectArgs {
    /// Agent id or name.
    pub agent: String,

    /// Pairing token, required when the agent's idle mode is `ssh` or a
    /// provider requires authenticated attach (§4.11).
    #[arg(long)]
    pub token: Option<String>,
}

pub async fn connect(args: ConnectArgs) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;

    let agent = client
        .get_agent(&args.agent)
        .await
        .map_err(|e| anyhow!("{}", e))?
        .ok_or_else(|| anyhow!("agent not found: {}", args.agent))?;

    client
        .agent_attach_ready(&agent.id, args.token.clone())
        .await
        .map_err(|e| anyhow!("{}", e))?;

    let root_name = fm_daemon::env::root_name();
    let prefix = fm_daemon::env::session_prefix(&root_name);
    let session = fm_core::naming::session_name(&prefix, &agent.name);

    let status = Command::new("tmux")
        .args(["attach-session", "-t", &session])
        .status()
        .map_err(|e| anyhow!("failed to exec tmux: {}", e))?;

    if !status.success() {
        return Err(anyhow!("tmux attach-session exited with status: {}", status));
    }
    Ok(())
}
