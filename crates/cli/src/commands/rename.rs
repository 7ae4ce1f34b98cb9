// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm rename` — rename an agent, keeping its session name in lockstep
//! (§C1 invariant 3; the daemon renames the multiplexer session before
//! writing the new descriptor name).

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct RenameArgs {
    /// Agent id or current name.
    pub agent: String,

    /// New name.
    pub new_name: String,
}

pub async fn rename(args: RenameArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let (id, name) = client.rename(&args.agent, &args.new_name).await.map_err(|e| anyhow!("{}", e))?;
    let obj = serde_json::json!({ "id": &id, "name": &name });
    format_or_json(format, &obj, || println!("renamed {} to {}", id, name))
}
