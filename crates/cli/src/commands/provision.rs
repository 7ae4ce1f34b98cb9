// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm provision` — re-run an agent's provisioning sequence on demand
//! (§4.5), e.g. after editing its agent type's default steps.

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ProvisionArgs {
    /// Agent id or name.
    pub agent: String,
}

pub async fn provision(args: ProvisionArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let run = client.provision(&args.agent).await.map_err(|e| anyhow!("{}", e))?;

    format_or_json(format, &run, || {
        println!("provision run {} ({})", run.id, if run.complete { "complete" } else { "incomplete" });
        let mut table = Table::new(vec![Column::muted("#"), Column::left("STEP"), Column::status("STATUS"), Column::left("EXIT")]);
        for step in &run.steps {
            table.row(vec![
                step.index.to_string(),
                step.label.clone(),
                step.status.clone(),
                step.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            ]);
        }
        table.render(&mut std::io::stdout());
        if let Some(failed) = run.failed_step {
            println!("failed at step #{}", failed);
        }
    })
}
