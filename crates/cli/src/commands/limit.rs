// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm limit` — set a host's resource ceiling (§4.1 `Resource`).

use anyhow::{anyhow, Result};
use clap::Args;
use fm_core::Resource;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct LimitArgs {
    /// Host id or name.
    pub host: String,

    #[arg(long)]
    pub cpu: Option<f64>,
    #[arg(long)]
    pub memory_mb: Option<u64>,
    #[arg(long)]
    pub disk_mb: Option<u64>,
    #[arg(long)]
    pub gpu: Option<String>,
}

pub async fn limit(args: LimitArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let resource = Resource { cpu: args.cpu, memory_mb: args.memory_mb, disk_mb: args.disk_mb, gpu: args.gpu };
    let host_id = client.set_limit(&args.host, resource).await.map_err(|e| anyhow!("{}", e))?;
    let obj = serde_json::json!({ "host_id": &host_id });
    format_or_json(format, &obj, || println!("limit set on {}", host_id))
}
