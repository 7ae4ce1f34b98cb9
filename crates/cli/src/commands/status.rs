// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm status` — one-shot fleet overview: daemon uptime plus a reconciled
//! per-agent summary, the CLI-facing read path for §C8's fleet status.

use anyhow::{anyhow, Result};

use crate::client::DaemonClient;
use crate::output::{format_or_json, OutputFormat};
use crate::table::{Column, Table};

pub async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => {
            let obj = serde_json::json!({ "daemon": "not_running" });
            return format_or_json(format, &obj, || println!("fmd not running"));
        }
    };

    let (uptime_secs, hosts_active, agents_active) = client.status().await.map_err(|e| anyhow!("{}", e))?;
    let entries = client.fleet_status().await.map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({
        "daemon": "running",
        "uptime_secs": uptime_secs,
        "hosts_active": hosts_active,
        "agents_active": agents_active,
        "entries": &entries,
    });

    format_or_json(format, &obj, || {
        println!("daemon: running (uptime {}s, {} hosts, {} agents)", uptime_secs, hosts_active, agents_active);
        let mut table = Table::new(vec![
            Column::left("HOST"),
            Column::left("AGENT"),
            Column::status("STATE"),
            Column::left("GC"),
        ]);
        for e in &entries {
            table.row(vec![
                e.host_name.clone(),
                e.agent_name.clone(),
                e.effective_state.to_string(),
                if e.is_gc_candidate { "candidate".to_string() } else { "-".to_string() },
            ]);
        }
        table.render(&mut std::io::stdout());
    })
}
