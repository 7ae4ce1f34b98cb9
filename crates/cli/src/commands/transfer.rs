// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm push` / `fm pull` / `fm pair` — all three are `Request::Transfer`
//! with a different §4.4 `TransferMode` name; `push`/`pull` default to
//! `vcs-push`/`vcs-pull`, `pair` to the bidirectional `pair` mode, and each
//! accepts `--mode` to pick a different one (e.g. `fm push --mode rsync`).

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct TransferArgs {
    /// Agent id or name.
    pub agent: String,

    /// Source path (on the caller's side for push/pull).
    pub source: PathBuf,

    /// Target path (on the agent's host).
    pub target: PathBuf,

    /// Transfer mode override (§4.4): in-place, copy, clone, worktree,
    /// rsync, vcs-push, vcs-pull, pair.
    #[arg(long)]
    pub mode: Option<String>,
}

pub async fn push(args: TransferArgs, format: OutputFormat) -> Result<()> {
    run(args, "vcs-push", format).await
}

pub async fn pull(args: TransferArgs, format: OutputFormat) -> Result<()> {
    run(args, "vcs-pull", format).await
}

/// `fm pair` runs until interrupted: the daemon starts a continuous
/// watch loop in the background and keeps it alive after this call
/// returns, so the CLI blocks on Ctrl-C itself and sends
/// `StopTransfer` on the way out (same shape as `output::tail_file`'s
/// watch-then-ctrl-c loop).
pub async fn pair(args: TransferArgs, format: OutputFormat) -> Result<()> {
    let mode = args.mode.unwrap_or_else(|| "pair".to_string());
    fm_engine::TransferMode::parse(&mode).ok_or_else(|| anyhow!("unknown transfer mode {mode:?}"))?;

    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let agent = args.agent.clone();
    let id = client.transfer(&agent, &mode, args.source, args.target).await.map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({ "id": &id, "mode": &mode });
    format_or_json(format, &obj, || println!("pair watch started for {} ({}); press Ctrl-C to stop", id, mode))?;

    tokio::signal::ctrl_c().await.ok();
    client.stop_transfer(&agent).await.map_err(|e| anyhow!("{}", e))?;
    println!("pair watch stopped for {}", id);
    Ok(())
}

async fn run(args: TransferArgs, default_mode: &str, format: OutputFormat) -> Result<()> {
    let mode = args.mode.unwrap_or_else(|| default_mode.to_string());
    fm_engine::TransferMode::parse(&mode).ok_or_else(|| anyhow!("unknown transfer mode {mode:?}"))?;

    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let id = client.transfer(&args.agent, &mode, args.source, args.target).await.map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({ "id": &id, "mode": &mode });
    format_or_json(format, &obj, || println!("transfer started for {} ({})", id, mode))
}
