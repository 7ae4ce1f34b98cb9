// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm stop` — stop a running host.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct StopArgs {
    /// Host id or name.
    pub host: String,

    /// Take a snapshot immediately before stopping.
    #[arg(long)]
    pub snapshot_first: bool,
}

pub async fn stop(args: StopArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let id = client.stop_host(&args.host, args.snapshot_first).await.map_err(|e| anyhow!("{}", e))?;
    let obj = serde_json::json!({ "id": &id });
    format_or_json(format, &obj, || println!("stopped host {}", id))
}
