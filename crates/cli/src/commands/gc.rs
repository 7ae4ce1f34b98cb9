// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm gc` — reclaim fleet-tagged resources no longer referenced by any
//! live descriptor, per category (§4.10).

use anyhow::{anyhow, Result};
use clap::Args;
use fm_core::ProviderKind;
use fm_wire::{GcCategory, OnError};

use crate::client::DaemonClient;
use crate::output::{handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct GcArgs {
    /// Report what would be reclaimed without destroying anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Category to sweep, repeatable (`work_dirs`, `logs`, `build_cache`,
    /// `machines`, `snapshots`, `volumes`). Defaults to every category.
    #[arg(long = "category", value_parser = parse_category)]
    pub categories: Vec<GcCategory>,

    /// Only reclaim resources whose host/agent name contains this
    /// substring, repeatable.
    #[arg(long)]
    pub include: Vec<String>,

    /// Skip resources whose host/agent name contains this substring,
    /// repeatable.
    #[arg(long)]
    pub exclude: Vec<String>,

    /// Restrict the sweep to hosts on this provider.
    #[arg(long)]
    pub provider: Option<ProviderKind>,

    /// Stop the whole sweep at the first failure instead of continuing
    /// with the remaining resources.
    #[arg(long)]
    pub on_error_abort: bool,
}

fn parse_category(s: &str) -> Result<GcCategory, String> {
    match s {
        "work_dirs" => Ok(GcCategory::WorkDirs),
        "logs" => Ok(GcCategory::Logs),
        "build_cache" => Ok(GcCategory::BuildCache),
        "machines" => Ok(GcCategory::Machines),
        "snapshots" => Ok(GcCategory::Snapshots),
        "volumes" => Ok(GcCategory::Volumes),
        other => Err(format!("unknown gc category {other:?}")),
    }
}

pub async fn gc(args: GcArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;
    let on_error = if args.on_error_abort { OnError::Abort } else { OnError::Continue };
    let reclaimed = client
        .gc(args.dry_run, args.categories, args.include, args.exclude, args.provider, on_error)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    handle_list(format, &reclaimed, "Nothing to reclaim.", |items, out| {
        let mut table = Table::new(vec![Column::muted("ID"), Column::left("CATEGORY")]);
        for (category, id) in items {
            table.row(vec![id.clone(), category.clone()]);
        }
        table.render(out);
    })
}
