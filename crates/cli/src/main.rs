// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm`: the fleet manager CLI binary (§6's command-line surface). Parses
//! arguments with `clap`, dispatches to one handler per subcommand, and
//! turns any handler failure into the right process exit code (§6: `0`
//! success, `1` generic, `2` invalid-request, `3` not-found, `4` lock
//! contention, `5` timeout).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod client;
mod client_lifecycle;
mod client_queries;
mod color;
mod commands;
mod config;
mod exit_error;
mod filter;
mod output;
mod table;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::client::ClientError;
use crate::commands::{
    config_cmd, connect, create, daemon, destroy, exec, gc, limit, list, message, plugin, provision, rename,
    snapshot, start, status, stop, transfer,
};
use crate::exit_error::{exit_code_for_daemon_message, ExitError};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "fm", version, about = "Multi-host AI-agent fleet manager")]
struct Cli {
    /// Output format: text, json, or jsonl.
    #[arg(short = 'o', long, global = true, default_value = "text")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an agent (and optionally a host for it).
    Create(create::CreateArgs),
    /// Attach to a running agent's session.
    Connect(connect::ConnectArgs),
    /// List hosts or reconciled fleet entries.
    List(list::ListArgs),
    /// Destroy an agent, or a host with `--host`.
    Destroy(destroy::DestroyArgs),
    /// Start a stopped host.
    Start(start::StartArgs),
    /// Stop a running host.
    Stop(stop::StopArgs),
    /// Run a command on an agent's host.
    Exec(exec::ExecArgs),
    /// Send input to an agent's session.
    Message(message::MessageArgs),
    /// Push a local workspace to an agent's host.
    Push(transfer::TransferArgs),
    /// Pull an agent's workspace back to the caller.
    Pull(transfer::TransferArgs),
    /// Bidirectionally sync an agent's workspace.
    Pair(transfer::TransferArgs),
    /// Rename an agent.
    Rename(rename::RenameArgs),
    /// Take a snapshot of a host.
    Snapshot(snapshot::SnapshotArgs),
    /// Reclaim exited/orphaned fleet entries.
    Gc(gc::GcArgs),
    /// Show or set resolved command-default configuration.
    Config(config_cmd::ConfigArgs),
    /// Re-run an agent's provisioning sequence.
    Provision(provision::ProvisionArgs),
    /// Set a host's resource ceiling.
    Limit(limit::LimitArgs),
    /// Inspect the built-in agent-type and provider registries.
    Plugin(plugin::PluginArgs),
    /// Fleet-wide status overview.
    Status,
    /// Manage the `fmd` background process.
    Daemon(daemon::DaemonArgs),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = cli.output;

    let result = match cli.command {
        Command::Create(args) => create::create(args, format).await,
        Command::Connect(args) => connect::connect(args).await,
        Command::List(args) => list::list(args, format).await,
        Command::Destroy(args) => destroy::destroy(args, format).await,
        Command::Start(args) => start::start(args, format).await,
        Command::Stop(args) => stop::stop(args, format).await,
        Command::Exec(args) => exec::exec(args, format).await,
        Command::Message(args) => message::message(args, format).await,
        Command::Push(args) => transfer::push(args, format).await,
        Command::Pull(args) => transfer::pull(args, format).await,
        Command::Pair(args) => transfer::pair(args, format).await,
        Command::Rename(args) => rename::rename(args, format).await,
        Command::Snapshot(args) => snapshot::snapshot(args, format).await,
        Command::Gc(args) => gc::gc(args, format).await,
        Command::Config(args) => config_cmd::config(args, format).await,
        Command::Provision(args) => provision::provision(args, format).await,
        Command::Limit(args) => limit::limit(args, format).await,
        Command::Plugin(args) => plugin::plugin(args, format).await,
        Command::Status => status::status(format).await,
        Command::Daemon(args) => daemon::daemon(args, format).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code_for_error(&err));
    }
}

/// Resolves the process exit code for a top-level command failure (§6):
/// an [`ExitError`] or a [`ClientError`] carrying a daemon-side message
/// already know their category; anything else (I/O, parse errors) is a
/// generic failure.
fn exit_code_for_error(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code;
    }
    if let Some(ClientError::Daemon(message)) = err.downcast_ref::<ClientError>() {
        return exit_code_for_daemon_message(message);
    }
    1
}
