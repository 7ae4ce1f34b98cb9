// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm daemon` — manage the `fmd` background process.
//!
//! Near-verbatim port of the teacher's `commands/daemon.rs` minus the
//! job-domain `orphans` subcommand, which has no FM counterpart (FM's
//! equivalent "things that might need attention" surface is `fm gc
//! --dry-run` and `fm list --all`'s `effective_state` column, not a
//! separate startup-recovery concept).

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use crate::client::DaemonClient;
use crate::client_lifecycle::daemon_stop;
use crate::output::{display_log, format_or_json, OutputFormat};

#[derive(Args)]
pub struct DaemonArgs {
    #[command(subcommand)]
    pub command: DaemonCommand,
}

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start `fmd` (foreground or background).
    Start {
        #[arg(long)]
        foreground: bool,
    },
    /// Stop `fmd`.
    Stop {
        /// Destroy every host before stopping.
        #[arg(long)]
        kill: bool,
    },
    /// Check `fmd`'s process status.
    Status,
    /// Stop and restart `fmd`.
    Restart {
        #[arg(long)]
        kill: bool,
    },
    /// View `fmd`'s log file.
    Logs {
        #[arg(short = 'n', long, default_value = "200")]
        limit: usize,
        #[arg(long, conflicts_with = "limit")]
        no_limit: bool,
        #[arg(long, short)]
        follow: bool,
    },
}

pub async fn daemon(args: DaemonArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        DaemonCommand::Start { foreground } => start(foreground).await,
        DaemonCommand::Stop { kill } => stop(kill).await,
        DaemonCommand::Restart { kill } => restart(kill).await,
        DaemonCommand::Status => status(format).await,
        DaemonCommand::Logs { limit, no_limit, follow } => logs(limit, no_limit, follow, format).await,
    }
}

async fn start(foreground: bool) -> Result<()> {
    if foreground {
        let fmd_path = find_fmd_binary();
        let status = Command::new(&fmd_path).status()?;
        if !status.success() {
            return Err(anyhow!("fmd exited with status: {}", status));
        }
        return Ok(());
    }

    if let Ok(client) = DaemonClient::connect() {
        if let Ok((uptime, _, _)) = client.status().await {
            println!("fmd already running (uptime: {}s)", uptime);
            return Ok(());
        }
    }

    match DaemonClient::connect_or_start() {
        Ok(_client) => {
            println!("fmd started");
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e)),
    }
}

async fn stop(kill: bool) -> Result<()> {
    match daemon_stop(kill).await {
        Ok(true) => {
            println!("fmd stopped");
            Ok(())
        }
        Ok(false) => {
            println!("fmd not running");
            Ok(())
        }
        Err(e) => Err(anyhow!("failed to stop fmd: {}", e)),
    }
}

async fn restart(kill: bool) -> Result<()> {
    let was_running = daemon_stop(kill).await.map_err(|e| anyhow!("failed to stop fmd: {}", e))?;
    if was_running {
        // grace period for the OS to release the Unix socket
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    }
    match DaemonClient::connect_or_start() {
        Ok(_client) => {
            println!("fmd restarted");
            Ok(())
        }
        Err(e) => Err(anyhow!("{}", e)),
    }
}

async fn status(format: OutputFormat) -> Result<()> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(_) => return print_not_running(format),
    };

    let (uptime, hosts_active, agents_active) = match client.status().await {
        Ok(result) => result,
        Err(e) if e.is_not_running() => return print_not_running(format),
        Err(e) => return Err(anyhow!("{}", e)),
    };
    let version = client.hello().await.unwrap_or_else(|_| "unknown".to_string());

    let obj = serde_json::json!({
        "status": "running",
        "version": version,
        "uptime_secs": uptime,
        "uptime": format_uptime(uptime),
        "hosts_active": hosts_active,
        "agents_active": agents_active,
    });
    format_or_json(format, &obj, || {
        println!("Status: running");
        println!("Version: {}", version);
        println!("Uptime: {}", format_uptime(uptime));
        println!("Hosts: {} active", hosts_active);
        println!("Agents: {} active", agents_active);
    })
}

async fn logs(limit: usize, no_limit: bool, follow: bool, format: OutputFormat) -> Result<()> {
    let log_path = match find_log_file()? {
        Some(path) => path,
        None => {
            let empty: Vec<String> = vec![];
            let obj = serde_json::json!({ "log_path": null, "lines": empty });
            return format_or_json(format, &obj, || println!("no fmd log file found"));
        }
    };

    let content =
        if no_limit { std::fs::read_to_string(&log_path)? } else { read_last_lines(&log_path, limit)? };
    display_log(&log_path, &content, follow, 0, format, "daemon", "log").await?;
    Ok(())
}

fn print_not_running(format: OutputFormat) -> Result<()> {
    let obj = serde_json::json!({ "status": "not_running" });
    format_or_json(format, &obj, || println!("fmd not running"))
}

fn read_last_lines(path: &std::path::Path, n: usize) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let lines: Vec<String> = BufReader::new(file).lines().collect::<std::io::Result<_>>()?;
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].join("\n"))
}

fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    let secs = secs % 60;
    if hours > 0 {
        format!("{}h {}m {}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

/// `tracing_appender::rolling::daily` names files `fmd.log.<date>`; picks
/// the most recently modified match instead of guessing today's suffix.
fn find_log_file() -> Result<Option<PathBuf>> {
    let root_name = fm_daemon::env::root_name();
    let root_dir = fm_daemon::env::host_dir(&root_name);
    let Ok(entries) = std::fs::read_dir(&root_dir) else { return Ok(None) };
    let mut candidates: Vec<(std::time::SystemTime, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.starts_with("fmd.log") {
            let modified = entry.metadata().and_then(|m| m.modified()).unwrap_or(std::time::UNIX_EPOCH);
            candidates.push((modified, entry.path()));
        }
    }
    candidates.sort_by_key(|(t, _)| *t);
    Ok(candidates.pop().map(|(_, p)| p))
}

fn find_fmd_binary() -> PathBuf {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let sibling = dir.join("fmd");
            if sibling.exists() {
                return sibling;
            }
        }
    }
    PathBuf::from("fmd")
}
