// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm snapshot` — take a snapshot of a host (§4.1; unsupported on
//! `local`-provider hosts, surfaced as an `invalid_spec` daemon error).

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct SnapshotArgs {
    /// Host id or name.
    pub host: String,
}

pub async fn snapshot(args: SnapshotArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let (host_id, snapshot) = client.snapshot(&args.host).await.map_err(|e| anyhow!("{}", e))?;
    let obj = serde_json::json!({ "host_id": &host_id, "snapshot": &snapshot });
    format_or_json(format, &obj, || println!("snapshotted {} as {}", host_id, snapshot))
}
