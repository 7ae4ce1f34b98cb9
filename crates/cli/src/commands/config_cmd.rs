// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm config` — show the merged command-default configuration and where
//! each value came from (§6).

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::CommandDefaults;
use crate::output::{handle_list, OutputFormat};
use crate::table::{Column, Table};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print every resolved `command.param` default and its provenance.
    List,
    /// Print the single resolved value for `command.param`.
    Get {
        command: String,
        param: String,
    },
}

pub async fn config(args: ConfigArgs, format: OutputFormat) -> Result<()> {
    let defaults = CommandDefaults::load()?;
    match args.command {
        ConfigCommand::List => list(&defaults, format),
        ConfigCommand::Get { command, param } => get(&defaults, &command, &param, format),
    }
}

fn list(defaults: &CommandDefaults, format: OutputFormat) -> Result<()> {
    let rows: Vec<serde_json::Value> = defaults
        .entries()
        .map(|((command, param), resolved)| {
            serde_json::json!({
                "command": command,
                "param": param,
                "value": resolved.value.to_string(),
                "provenance": resolved.provenance.to_string(),
            })
        })
        .collect();

    handle_list(format, &rows, "No configuration overrides set.", |items, out| {
        let mut table = Table::new(vec![
            Column::left("COMMAND"),
            Column::left("PARAM"),
            Column::left("VALUE"),
            Column::muted("FROM"),
        ]);
        for item in items {
            table.row(vec![
                item["command"].as_str().unwrap_or_default().to_string(),
                item["param"].as_str().unwrap_or_default().to_string(),
                item["value"].as_str().unwrap_or_default().to_string(),
                item["provenance"].as_str().unwrap_or_default().to_string(),
            ]);
        }
        table.render(out);
    })
}

fn get(defaults: &CommandDefaults, command: &str, param: &str, format: OutputFormat) -> Result<()> {
    match defaults.param(command, param) {
        Some(resolved) => {
            let obj = serde_json::json!({
                "command": command,
                "param": param,
                "value": resolved.value.to_string(),
                "provenance": resolved.provenance.to_string(),
            });
            crate::output::format_or_json(format, &obj, || println!("{} ({})", resolved.value, resolved.provenance))
        }
        None => {
            let obj = serde_json::json!({ "command": command, "param": param, "value": null });
            crate::output::format_or_json(format, &obj, || println!("no value set for {command}.{param}"))
        }
    }
}
