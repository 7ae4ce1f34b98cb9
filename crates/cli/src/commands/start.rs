// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm start` — start a stopped host, optionally restoring a snapshot.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct StartArgs {
    /// Host id or name.
    pub host: String,

    /// Restore from this snapshot reference instead of the host's current
    /// disk state.
    #[arg(long)]
    pub snapshot: Option<String>,
}

pub async fn start(args: StartArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let id = client.start_host(&args.host, args.snapshot).await.map_err(|e| anyhow!("{}", e))?;
    let obj = serde_json::json!({ "id": &id });
    format_or_json(format, &obj, || println!("started host {}", id))
}
