// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm plugin` — inspect the compile-time capability registries: agent
//! types (fm-profile) and provider kinds (fm-core), since neither is a
//! runtime-loadable plugin (the wire-level collaborators note's "explicit
//! capability registries... no runtime monkey-patching" redesign).

use anyhow::Result;
use clap::{Args, Subcommand};
use fm_core::ProviderKind;

use crate::output::{handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommand,
}

#[derive(Subcommand)]
pub enum PluginCommand {
    /// List built-in agent types.
    AgentTypes,
    /// List provider kinds and their capability flags.
    Providers,
}

pub async fn plugin(args: PluginArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        PluginCommand::AgentTypes => agent_types(format),
        PluginCommand::Providers => providers(format),
    }
}

fn agent_types(format: OutputFormat) -> Result<()> {
    let registry = fm_profile::built_in_agent_types();
    let rows: Vec<serde_json::Value> = registry
        .values()
        .map(|t| serde_json::json!({ "key": t.key, "description": t.description, "default_steps": t.default_steps.len() }))
        .collect();

    handle_list(format, &rows, "No agent types registered.", |items, out| {
        let mut table = Table::new(vec![Column::left("KEY"), Column::left("DESCRIPTION"), Column::muted("DEFAULT STEPS")]);
        for (item, agent_type) in items.iter().zip(registry.values()) {
            table.row(vec![
                agent_type.key.to_string(),
                agent_type.description.to_string(),
                item["default_steps"].to_string(),
            ]);
        }
        table.render(out);
    })
}

fn providers(format: OutputFormat) -> Result<()> {
    let kinds = [ProviderKind::Local, ProviderKind::Container, ProviderKind::CloudSandbox, ProviderKind::SecureShell];
    let rows: Vec<serde_json::Value> = kinds
        .iter()
        .map(|k| {
            serde_json::json!({
                "kind": k.to_string(),
                "supports_create": k.supports_create(),
                "supports_snapshot": k.supports_snapshot(),
            })
        })
        .collect();

    handle_list(format, &rows, "No providers registered.", |items, out| {
        let mut table = Table::new(vec![Column::left("KIND"), Column::left("CREATE"), Column::left("SNAPSHOT")]);
        for item in items {
            table.row(vec![
                item["kind"].as_str().unwrap_or_default().to_string(),
                item["supports_create"].as_bool().unwrap_or(false).to_string(),
                item["supports_snapshot"].as_bool().unwrap_or(false).to_string(),
            ]);
        }
        table.render(out);
    })
}
