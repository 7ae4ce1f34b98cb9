// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm exec` — synchronous command execution on an agent's host (§4.1's
//! provider-port `exec`, two-threshold timeout per §6).

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Args;

use crate::client::DaemonClient;
use crate::exit_error::ExitError;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct ExecArgs {
    /// Agent id or name.
    pub agent: String,

    /// Command and arguments to run.
    #[arg(num_args = 1.., last = true)]
    pub argv: Vec<String>,

    /// Working directory inside the host, overriding the agent's own.
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Hard timeout in seconds; the call is aborted past this point.
    #[arg(long, default_value = "60")]
    pub timeout: u64,

    /// Warning threshold in seconds; a slow-op event is recorded but the
    /// call still completes.
    #[arg(long)]
    pub warn_timeout: Option<u64>,
}

pub async fn exec(args: ExecArgs, format: OutputFormat) -> Result<()> {
    if args.argv.is_empty() {
        return Err(ExitError::generic("exec requires a command").into());
    }
    let client = DaemonClient::connect().map_err(|e| anyhow!("{}", e))?;

    let (exit_code, stdout, stderr) = client
        .exec(
            &args.agent,
            args.argv,
            args.cwd,
            Duration::from_secs(args.timeout),
            args.warn_timeout.map(Duration::from_secs),
        )
        .await
        .map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({ "exit_code": exit_code, "stdout": &stdout, "stderr": &stderr });
    format_or_json(format, &obj, || {
        print!("{}", stdout);
        eprint!("{}", stderr);
    })?;

    if exit_code != 0 {
        return Err(ExitError::generic(format!("exec exited with code {exit_code}")).into());
    }
    Ok(())
}
