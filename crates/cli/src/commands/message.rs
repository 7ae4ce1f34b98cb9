// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm message` — write bytes to one or more agents' sessions as if typed
//! (§4.3 `send_keys`), for steering running agents without attaching to
//! them.

use anyhow::{anyhow, Result};
use clap::Args;
use fm_wire::OnError;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct MessageArgs {
    /// Agent id(s) or name(s), repeatable for a multi-target send.
    #[arg(required = true, num_args = 1..)]
    pub agent: Vec<String>,

    /// Text to send. Reads from stdin when omitted.
    #[arg(long)]
    pub text: Option<String>,

    /// Stop at the first target that fails instead of sending to the rest.
    #[arg(long)]
    pub on_error_abort: bool,
}

pub async fn message(args: MessageArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;

    let text = match args.text {
        Some(t) => t,
        None => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let on_error = if args.on_error_abort { OnError::Abort } else { OnError::Continue };

    let results = client.message(args.agent, text.into_bytes(), on_error).await.map_err(|e| anyhow!("{}", e))?;
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    let obj = serde_json::json!({
        "results": results.iter().map(|r| serde_json::json!({
            "agent_id": &r.agent_id,
            "error": &r.error,
        })).collect::<Vec<_>>(),
    });
    format_or_json(format, &obj, || {
        for r in &results {
            match &r.error {
                Some(e) => println!("{}: failed: {}", r.agent_id, e),
                None => println!("sent to {}", r.agent_id),
            }
        }
    })?;

    if !failed.is_empty() {
        return Err(anyhow!("{} of {} target(s) failed", failed.len(), results.len()));
    }
    Ok(())
}
