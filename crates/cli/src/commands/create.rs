// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `fm create` — §4.6's ten-step create-agent sequence, CLI face.
//!
//! The wire protocol's `CreateAgent` request always carries a concrete
//! `host_id` (§4.7 host resolution happens once, here, rather than on
//! every call): with `--new-host` this first sends `CreateHost`, then
//! `CreateAgent` against the host id it returns; with `--host` or neither
//! flag it resolves to an existing/default host and skips straight to
//! `CreateAgent`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use fm_core::{IdleMode, ProviderKind, Resource};

use crate::client::DaemonClient;
use crate::config::CommandDefaults;
use crate::output::{format_or_json, OutputFormat};

#[derive(Args)]
pub struct CreateArgs {
    /// Agent name (mutable, unique in the fleet).
    pub name: String,

    /// Agent type key (`claude`, `codex`, `generic`, ...). Falls back to
    /// the `create.agent_type` config default, then `"generic"`.
    pub agent_type: Option<String>,

    /// Command to run instead of the agent type's default argv.
    #[arg(long = "cmd", num_args = 1..)]
    pub command: Vec<String>,

    /// Run on an existing host instead of the default/local one.
    #[arg(long, conflicts_with = "new_host_provider")]
    pub host: Option<String>,

    /// Create a new host on this provider for the agent.
    #[arg(long = "new-host", value_name = "PROVIDER")]
    pub new_host_provider: Option<ProviderKind>,

    /// Working directory inside the host (defaults to a generated one
    /// under the agent's state directory).
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Free-form project label. Falls back to the `create.project` config
    /// default, then the empty string.
    #[arg(long)]
    pub project: Option<String>,

    /// `key=value` labels, repeatable.
    #[arg(long = "label", value_parser = parse_kv)]
    pub labels: Vec<(String, String)>,

    /// `key=value` environment entries, repeatable.
    #[arg(long = "env", value_parser = parse_kv)]
    pub env: Vec<(String, String)>,

    /// Idle detection mode (§4.9): io, user, agent, ssh, create, boot, run,
    /// disabled. Falls back to the `create.idle_mode` config default, then
    /// `"io"`, when not passed (§6 precedence chain).
    #[arg(long)]
    pub idle_mode: Option<String>,

    /// Idle timeout before an agent is stopped automatically. Falls back
    /// to the `create.idle_timeout_seconds` config default, then `1800`.
    #[arg(long)]
    pub idle_timeout_seconds: Option<u64>,

    /// Restart this agent automatically when its host starts.
    #[arg(long)]
    pub start_on_boot: bool,

    /// Image or snapshot reference for a newly created host.
    #[arg(long)]
    pub image: Option<String>,

    /// vCPU request for a newly created host.
    #[arg(long)]
    pub cpu: Option<f64>,
    /// Memory request (MiB) for a newly created host.
    #[arg(long)]
    pub memory_mb: Option<u64>,
    /// Disk request (MiB) for a newly created host.
    #[arg(long)]
    pub disk_mb: Option<u64>,
}

fn parse_kv(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {s:?}"))
}

fn string_default(defaults: &CommandDefaults, param: &str) -> Option<String> {
    defaults.param("create", param).and_then(|r| r.value.as_str().map(String::from))
}

fn parse_idle_mode(s: &str) -> Result<IdleMode> {
    match s {
        "io" => Ok(IdleMode::Io),
        "user" => Ok(IdleMode::User),
        "agent" => Ok(IdleMode::Agent),
        "ssh" => Ok(IdleMode::Ssh),
        "create" => Ok(IdleMode::Create),
        "boot" => Ok(IdleMode::Boot),
        "start" => Ok(IdleMode::Start),
        "run" => Ok(IdleMode::Run),
        "disabled" => Ok(IdleMode::Disabled),
        other => Err(anyhow!("unknown idle mode {other:?}")),
    }
}

pub async fn create(args: CreateArgs, format: OutputFormat) -> Result<()> {
    let client = DaemonClient::connect_or_start().map_err(|e| anyhow!("{}", e))?;
    let defaults = CommandDefaults::load()?;

    let agent_type = args
        .agent_type
        .or_else(|| string_default(&defaults, "agent_type"))
        .unwrap_or_else(|| "generic".to_string());
    let project = args.project.or_else(|| string_default(&defaults, "project")).unwrap_or_default();
    let idle_mode_str = args.idle_mode.or_else(|| string_default(&defaults, "idle_mode")).unwrap_or_else(|| "io".to_string());
    let idle_mode = parse_idle_mode(&idle_mode_str)?;
    let idle_timeout_seconds = args
        .idle_timeout_seconds
        .or_else(|| defaults.param("create", "idle_timeout_seconds").and_then(|r| r.value.as_integer()).map(|v| v as u64))
        .unwrap_or(1800);

    let host_id = match (&args.host, args.new_host_provider) {
        (Some(host), None) => host.clone(),
        (None, Some(provider)) => {
            let resource = Resource {
                cpu: args.cpu,
                memory_mb: args.memory_mb,
                disk_mb: args.disk_mb,
                gpu: None,
            };
            let name = format!("host-{}", &args.name);
            client
                .create_host(&name, provider, args.image.clone(), resource, None)
                .await
                .map_err(|e| anyhow!("{}", e))?
        }
        (Some(_), Some(_)) => return Err(anyhow!("--host and --new-host are mutually exclusive")),
        (None, None) => resolve_default_host(&client).await?,
    };

    let labels: BTreeMap<String, String> = args.labels.into_iter().collect();
    let env: BTreeMap<String, String> = args.env.into_iter().collect();

    let id = client
        .create_agent(
            &host_id,
            &args.name,
            &agent_type,
            args.command,
            args.work_dir.unwrap_or_default(),
            project,
            labels,
            idle_mode,
            idle_timeout_seconds,
            args.start_on_boot,
            env,
        )
        .await
        .map_err(|e| anyhow!("{}", e))?;

    let obj = serde_json::json!({ "id": &id, "name": &args.name, "host_id": &host_id });
    format_or_json(format, &obj, || println!("created agent {} ({})", id, args.name))
}

/// §4.7's "no target at all → use the built-in local host" rule, resolved
/// client-side since the wire protocol's `CreateAgent.host_id` is
/// mandatory: looks up a host literally named `local`, falling back to
/// creating it the same way `fmd` does at startup.
async fn resolve_default_host(client: &DaemonClient) -> Result<String> {
    if let Some(host) = client.get_host("local").await.map_err(|e| anyhow!("{}", e))? {
        return Ok(host.id);
    }
    client
        .create_host("local", ProviderKind::Local, None, Resource::default(), None)
        .await
        .map_err(|e| anyhow!("{}", e))
}
