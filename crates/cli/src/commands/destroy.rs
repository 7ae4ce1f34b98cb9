// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm destroy` — destroy an agent, or with `--host` an entire host.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct DestroyArgs {
    /// Agent id or name, unless `--host` is given.
    pub target: String,

    /// Destroy the host `target` names, rather than an agent.
    #[arg(long)]
    pub host: bool,

    /// Delete the host's snapshots too (host destroy only).
    #[arg(long)]
    pub purge_snapshots: bool,

    /// Destroy even if the agent (or any agent on the host) is still running.
    #[arg(long)]
    pub force: bool,
}

pub async fn destroy(args: DestroyArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;

    if args.host {
        let id = client
            .destroy_host(&args.target, args.purge_snapshots, args.force)
            .await
            .map_err(|e| anyhow!("{}", e))?;
        let obj = serde_json::json!({ "id": &id, "kind": "host" });
        format_or_json(format, &obj, || println!("destroyed host {}", id))
    } else {
        let id = client.destroy_agent(&args.target, args.force).await.map_err(|e| anyhow!("{}", e))?;
        let obj = serde_json::json!({ "id": &id, "kind": "agent" });
        format_or_json(format, &obj, || println!("destroyed agent {}", id))
    }
}
