// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm list` — the Fleet Enumerator's (C8) command-line face: reconciled
//! fleet rows by default, or `--hosts` for the host-level summary.

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;
use fm_core::ProviderKind;

use crate::client::DaemonClient;
use crate::filter::{Filter, Row};
use crate::output::{apply_limit, handle_list_with_limit, render_template, OutputFormat};
use crate::table::{Column, Table};

/// Between `--watch` refreshes.
const WATCH_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Args)]
pub struct ListArgs {
    /// List hosts instead of reconciled agent rows.
    #[arg(long)]
    pub hosts: bool,

    /// Restrict to agents on this host (agent rows only).
    #[arg(long)]
    pub host: Option<String>,

    /// Shorthand for `--filter 'effective_state == "running"'`
    /// (`--hosts`: `status == "running"`).
    #[arg(long, conflicts_with = "filter")]
    pub running: bool,

    /// Shorthand for `--filter 'effective_state == "stopped"'`
    /// (`--hosts`: `status == "stopped"`).
    #[arg(long, conflicts_with_all = ["filter", "running"])]
    pub stopped: bool,

    /// Shorthand for `--provider local`.
    #[arg(long, conflicts_with_all = ["provider", "remote"])]
    pub local: bool,

    /// Shorthand for every non-local provider.
    #[arg(long, conflicts_with_all = ["provider", "local"])]
    pub remote: bool,

    /// Restrict to hosts on this provider.
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// CEL expression over each row's fields, e.g. `status == "running"`.
    #[arg(long)]
    pub filter: Option<String>,

    /// Comma-separated field names to sort by, in priority order.
    #[arg(long)]
    pub sort: Option<String>,

    /// Maximum rows to print.
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,

    /// Show every matching row.
    #[arg(long, conflicts_with = "limit")]
    pub no_limit: bool,

    /// Render each row through a `{field}`-style template instead of the
    /// table/JSON forms.
    #[arg(long)]
    pub template: Option<String>,

    /// Re-run the listing every couple seconds until interrupted, instead
    /// of printing once.
    #[arg(long)]
    pub watch: bool,
}

impl ListArgs {
    /// Folds the `running`/`stopped` shorthands into an equivalent CEL
    /// filter expression, the field name depending on whether this is a
    /// host or fleet listing.
    fn effective_filter(&self) -> Option<String> {
        if let Some(expr) = &self.filter {
            return Some(expr.clone());
        }
        let field = if self.hosts { "status" } else { "effective_state" };
        if self.running {
            return Some(format!("{field} == \"running\""));
        }
        if self.stopped {
            return Some(format!("{field} == \"stopped\""));
        }
        None
    }

    fn effective_provider(&self) -> Option<ProviderKind> {
        if self.provider.is_some() {
            return self.provider;
        }
        if self.local {
            return Some(ProviderKind::Local);
        }
        None
    }
}

pub async fn list(args: ListArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;

    loop {
        if args.hosts {
            list_hosts(&client, &args, format).await?;
        } else {
            list_fleet(&client, &args, format).await?;
        }
        if !args.watch {
            return Ok(());
        }
        tokio::time::sleep(WATCH_INTERVAL).await;
        if format == OutputFormat::Table {
            println!();
        }
    }
}

async fn list_hosts(client: &DaemonClient, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let mut hosts = client.list_hosts().await.map_err(|e| anyhow!("{}", e))?;

    if args.remote {
        hosts.retain(|h| h.provider != ProviderKind::Local);
    }
    if let Some(provider) = args.effective_provider() {
        hosts.retain(|h| h.provider == provider);
    }

    if let Some(expr) = args.effective_filter() {
        let filter = Filter::compile(&expr)?;
        hosts.retain(|h| {
            let row = Row::new()
                .str("id", h.id.clone())
                .str("name", h.name.clone())
                .str("provider", h.provider.to_string())
                .str("status", h.status.to_string())
                .int("agent_count", h.agent_count as i64);
            filter.matches(&row).unwrap_or(false)
        });
    }

    if let Some(sort) = &args.sort {
        let keys: Vec<&str> = sort.split(',').map(str::trim).collect();
        hosts.sort_by(|a, b| {
            for key in &keys {
                let ord = match *key {
                    "name" => a.name.cmp(&b.name),
                    "status" => a.status.to_string().cmp(&b.status.to_string()),
                    "provider" => a.provider.to_string().cmp(&b.provider.to_string()),
                    "agent_count" => a.agent_count.cmp(&b.agent_count),
                    "created_at" => a.created_at_epoch_ms.cmp(&b.created_at_epoch_ms),
                    _ => std::cmp::Ordering::Equal,
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    let truncation = apply_limit(&mut hosts, args.limit, args.no_limit);

    if let Some(template) = &args.template {
        for host in &hosts {
            println!("{}", render_template(template, &serde_json::to_value(host)?));
        }
        return Ok(());
    }

    handle_list_with_limit(format, &hosts, "No hosts found.", truncation, |items, out| {
        let mut table = Table::new(vec![
            Column::muted("ID"),
            Column::left("NAME"),
            Column::left("PROVIDER"),
            Column::status("STATUS"),
            Column::left("AGENTS"),
            Column::muted("AGE"),
        ]);
        for h in items {
            table.row(vec![
                h.id.clone(),
                h.name.clone(),
                h.provider.to_string(),
                h.status.to_string(),
                h.agent_count.to_string(),
                crate::output::format_time_ago(h.created_at_epoch_ms),
            ]);
        }
        table.render(out);
    })
}

async fn list_fleet(client: &DaemonClient, args: &ListArgs, format: OutputFormat) -> Result<()> {
    let mut entries = client.fleet_status().await.map_err(|e| anyhow!("{}", e))?;

    if let Some(host_id) = &args.host {
        entries.retain(|e| e.host_id == *host_id || e.host_id.starts_with(host_id.as_str()));
    }

    if args.remote {
        entries.retain(|e| e.host_provider != ProviderKind::Local);
    }
    if let Some(provider) = args.effective_provider() {
        entries.retain(|e| e.host_provider == provider);
    }

    if let Some(expr) = args.effective_filter() {
        let filter = Filter::compile(&expr)?;
        entries.retain(|e| {
            let row = Row::new()
                .str("host_id", e.host_id.clone())
                .str("host_name", e.host_name.clone())
                .str("host_status", e.host_status.to_string())
                .str("agent_id", e.agent_id.clone())
                .str("agent_name", e.agent_name.clone())
                .str("agent_status", e.agent_status.to_string())
                .str("effective_state", e.effective_state.to_string())
                .bool("is_gc_candidate", e.is_gc_candidate);
            filter.matches(&row).unwrap_or(false)
        });
    }

    if let Some(sort) = &args.sort {
        let keys: Vec<&str> = sort.split(',').map(str::trim).collect();
        entries.sort_by(|a, b| {
            for key in &keys {
                let ord = match *key {
                    "host_name" => a.host_name.cmp(&b.host_name),
                    "agent_name" => a.agent_name.cmp(&b.agent_name),
                    "agent_status" => a.agent_status.to_string().cmp(&b.agent_status.to_string()),
                    "effective_state" => a.effective_state.to_string().cmp(&b.effective_state.to_string()),
                    _ => std::cmp::Ordering::Equal,
                };
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    let truncation = apply_limit(&mut entries, args.limit, args.no_limit);

    if let Some(template) = &args.template {
        for entry in &entries {
            println!("{}", render_template(template, &serde_json::to_value(entry)?));
        }
        return Ok(());
    }

    handle_list_with_limit(format, &entries, "No agents found.", truncation, |items, out| {
        let mut table = Table::new(vec![
            Column::muted("AGENT"),
            Column::left("NAME").with_max(20),
            Column::left("HOST").with_max(20),
            Column::status("STATE"),
            Column::left("GC"),
        ]);
        for e in items {
            table.row(vec![
                e.agent_id.clone(),
                e.agent_name.clone(),
                e.host_name.clone(),
                e.effective_state.to_string(),
                if e.is_gc_candidate { "candidate".to_string() } else { "-".to_string() },
            ]);
        }
        table.render(out);
    })
}
