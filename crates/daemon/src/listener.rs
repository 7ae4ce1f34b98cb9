// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix domain socket listener dispatching `fm-wire` requests.
//!
//! Grounded on the teacher's `daemon/src/listener/mod.rs`: bind once,
//! spawn one task per accepted connection, each task loops
//! request/response pairs until the peer disconnects. The teacher also
//! listens on TCP; this daemon is local-machine-only (§6), so only the
//! Unix socket survives.

use std::path::Path;
use std::time::{Duration, Instant};

use fm_adapters::{ExecRequest, NotifyAdapter};
use fm_core::Clock;
use fm_engine::{ProvisionExecutor, TransferEngine, TransferMode, TransferSpec};
use fm_wire::{
    AgentDetail, AgentSummary, HostDetail, HostSummary, ProtocolError, ProvisionRunSummary,
    ProvisionStepSummary, Query, Request, Response,
};
use tokio::net::{UnixListener, UnixStream};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::context::DaemonContext;
use crate::lifecycle::{self, CreateAgentParams, LifecycleError};
use crate::{fleet, gc, messaging};

/// Formats any daemon-side error as a `Response::Error` carrying the
/// `(kind)` marker `exit_code_for_daemon_message` looks for, so a failure
/// surfaces the exit code its `ErrorKind` maps to (§6) instead of always
/// falling back to the generic-failure code.
fn err_response(kind: fm_core::ErrorKind, e: impl std::fmt::Display) -> Response {
    Response::Error { message: format!("{e} ({kind})") }
}

impl From<LifecycleError> for Response {
    fn from(e: LifecycleError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<fm_storage::StoreError> for Response {
    fn from(e: fm_storage::StoreError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<fm_adapters::ProviderError> for Response {
    fn from(e: fm_adapters::ProviderError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<crate::gc::GcError> for Response {
    fn from(e: crate::gc::GcError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<crate::fleet::FleetError> for Response {
    fn from(e: crate::fleet::FleetError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<crate::messaging::MessagingError> for Response {
    fn from(e: crate::messaging::MessagingError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<fm_engine::TransferError> for Response {
    fn from(e: fm_engine::TransferError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<fm_engine::ProvisionError> for Response {
    fn from(e: fm_engine::ProvisionError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

impl From<fm_profile::AgentTypeError> for Response {
    fn from(e: fm_profile::AgentTypeError) -> Self {
        let kind = e.to_error_kind();
        err_response(kind, e)
    }
}

/// Binds `socket_path` and serves connections until the process exits.
/// Removes a stale socket file left by a prior unclean shutdown before
/// binding — `bind` fails with `AddrInUse` otherwise.
pub async fn serve<C: Clock, N: NotifyAdapter>(
    ctx: DaemonContext<C, N>,
    socket_path: &Path,
    request_timeout: Duration,
) -> std::io::Result<()> {
    if socket_path.exists() {
        std::fs::remove_file(socket_path)?;
    }
    let listener = UnixListener::bind(socket_path)?;
    info!(path = %socket_path.display(), "listening");
    let started_at = Instant::now();

    loop {
        let (stream, _addr) = listener.accept().await?;
        let ctx = ctx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_connection(ctx, stream, request_timeout, started_at).await {
                warn!(error = %e, "connection closed with error");
            }
        });
    }
}

async fn handle_connection<C: Clock, N: NotifyAdapter>(
    ctx: DaemonContext<C, N>,
    mut stream: UnixStream,
    timeout: Duration,
    started_at: Instant,
) -> Result<(), ProtocolError> {
    loop {
        let request = match fm_wire::read_request(&mut stream, timeout).await {
            Ok(r) => r,
            Err(ProtocolError::ConnectionClosed) => return Ok(()),
            Err(e) => return Err(e),
        };
        let shutdown_requested = matches!(request, Request::Shutdown { .. });
        let response = dispatch(&ctx, request, started_at).await;
        fm_wire::write_response(&mut stream, &response, timeout).await?;
        if shutdown_requested {
            return Ok(());
        }
    }
}

async fn dispatch<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    request: Request,
    started_at: Instant,
) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version, token: _ } => {
            if version != fm_wire::PROTOCOL_VERSION {
                warn!(client = %version, daemon = %fm_wire::PROTOCOL_VERSION, "protocol version mismatch");
            }
            Response::Hello { version: fm_wire::PROTOCOL_VERSION.to_string() }
        }
        Request::Status => {
            let hosts = ctx.store.list_hosts().unwrap_or_default();
            let hosts_active = hosts.iter().filter(|h| !h.destroyed).count();
            let agents_active = hosts
                .iter()
                .map(|h| ctx.store.list_agents_on_host(&h.id).unwrap_or_default().into_iter().filter(|a| !a.destroyed).count())
                .sum();
            Response::Status { uptime_secs: started_at.elapsed().as_secs(), hosts_active, agents_active }
        }
        Request::Shutdown { kill } => {
            ctx.shutdown.cancel();
            if kill {
                for host in ctx.store.list_hosts().unwrap_or_default() {
                    let _ = lifecycle::destroy_host(ctx, host.id.as_str(), false, true).await;
                }
            }
            Response::ShuttingDown
        }
        Request::Query { query } => dispatch_query(ctx, query).await,
        Request::CreateHost { name, provider, image, resource, ssh } => {
            match lifecycle::create_host(ctx, &name, provider, image, resource, ssh, ctx.shutdown.clone()).await {
                Ok(host) => Response::HostCreated { id: host.id.to_string() },
                Err(e) => e.into(),
            }
        }
        Request::CreateAgent {
            host_id,
            name,
            agent_type,
            command,
            work_dir,
            project,
            labels,
            idle_mode,
            idle_timeout_seconds,
            start_on_boot,
            env,
        } => {
            let params = CreateAgentParams {
                target_host: Some(host_id),
                new_host_provider: None,
                name,
                agent_type,
                command,
                work_dir,
                project,
                labels,
                idle_mode,
                idle_timeout_seconds,
                start_on_boot,
                env,
                transfer: None,
            };
            match lifecycle::create_agent(ctx, params, ctx.shutdown.clone()).await {
                Ok(agent) => Response::AgentCreated { id: agent.id.to_string() },
                Err(e) => e.into(),
            }
        }
        Request::StartHost { id, snapshot } => {
            match lifecycle::start_host(ctx, &id, snapshot.as_deref(), ctx.shutdown.clone()).await {
                Ok(host) => Response::HostStarted { id: host.id.to_string() },
                Err(e) => e.into(),
            }
        }
        Request::StopHost { id, snapshot_first } => {
            match lifecycle::stop_host(ctx, &id, snapshot_first, ctx.shutdown.clone()).await {
                Ok(host) => Response::HostStopped { id: host.id.to_string() },
                Err(e) => e.into(),
            }
        }
        Request::DestroyHost { id, purge_snapshots, force } => {
            match lifecycle::destroy_host(ctx, &id, purge_snapshots, force).await {
                Ok(host) => Response::HostDestroyed { id: host.id.to_string() },
                Err(e) => e.into(),
            }
        }
        Request::DestroyAgent { id, force } => {
            match lifecycle::destroy_agent(ctx, &id, force, ctx.shutdown.clone()).await {
                Ok(agent) => Response::AgentDestroyed { id: agent.id.to_string() },
                Err(e) => e.into(),
            }
        }
        Request::Exec { agent_id, argv, cwd, hard_timeout, warn_timeout } => {
            exec(ctx, &agent_id, argv, cwd, hard_timeout, warn_timeout).await
        }
        Request::Message { agent_ids, bytes, on_error } => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let results = messaging::send_many(ctx, &agent_ids, &text, false, on_error.into()).await;
            Response::MessageSentMany {
                results: results
                    .into_iter()
                    .map(|r| fm_wire::MessageTargetResult {
                        agent_id: r.agent_id.to_string(),
                        error: r.result.err().map(|e| e.to_string()),
                    })
                    .collect(),
            }
        }
        Request::Transfer { agent_id, mode, source, target } => transfer(ctx, &agent_id, &mode, source, target).await,
        Request::StopTransfer { agent_id } => stop_transfer(ctx, &agent_id).await,
        Request::Rename { agent_id, new_name } => match lifecycle::rename_agent(ctx, &agent_id, &new_name).await {
            Ok(agent) => Response::Renamed { id: agent.id.to_string(), name: agent.name },
            Err(e) => e.into(),
        },
        Request::Snapshot { host_id } => snapshot(ctx, &host_id).await,
        Request::Gc { dry_run, categories, include, exclude, provider, on_error } => {
            let options = crate::gc::GcOptions {
                dry_run,
                categories: categories.into_iter().map(Into::into).collect(),
                include,
                exclude,
                provider,
                on_error: on_error.into(),
            };
            match gc::run(ctx, options).await {
                Ok(report) => Response::GcResult { reclaimed: report.reclaimed },
                Err(e) => e.into(),
            }
        }
        Request::Provision { agent_id } => provision(ctx, &agent_id).await,
        Request::SetLimit { host_id, resource } => set_limit(ctx, &host_id, resource).await,
        Request::AgentAttach { id, token: _ } => match ctx.store.find_agent(&id) {
            Ok(agent) => Response::AgentAttachReady { id: agent.id.to_string() },
            Err(e) => e.into(),
        },
    }
}

async fn dispatch_query<C: Clock, N: NotifyAdapter>(ctx: &DaemonContext<C, N>, query: Query) -> Response {
    match query {
        Query::ListHosts => {
            let hosts = ctx.store.list_hosts().unwrap_or_default();
            let summaries = hosts
                .into_iter()
                .filter(|h| ctx.tombstones.host_visible(h, ctx.clock.epoch_ms()))
                .map(|h| {
                    let agent_count = ctx.store.list_agents_on_host(&h.id).unwrap_or_default().len();
                    HostSummary {
                        id: h.id.to_string(),
                        name: h.name,
                        provider: h.provider,
                        status: h.status,
                        agent_count,
                        created_at_epoch_ms: h.created_at_epoch_ms,
                    }
                })
                .collect();
            Response::Hosts { hosts: summaries }
        }
        Query::GetHost { id } => match ctx.store.find_host(&id) {
            Ok(host) => {
                let mut detail = HostDetail::from(&host);
                detail.agents =
                    ctx.store.list_agents_on_host(&host.id).unwrap_or_default().iter().map(AgentSummary::from).collect();
                Response::Host { host: Some(Box::new(detail)) }
            }
            Err(_) => Response::Host { host: None },
        },
        Query::ListAgents { host_id } => {
            let agents = match host_id {
                Some(id) => match ctx.store.find_host(&id) {
                    Ok(host) => ctx.store.list_agents_on_host(&host.id).unwrap_or_default(),
                    Err(_) => Vec::new(),
                },
                None => ctx.store.list_all_agents().unwrap_or_default(),
            };
            let now = ctx.clock.epoch_ms();
            let summaries =
                agents.iter().filter(|a| ctx.tombstones.agent_visible(a, now)).map(AgentSummary::from).collect();
            Response::Agents { agents: summaries }
        }
        Query::GetAgent { id } => match ctx.store.find_agent(&id) {
            Ok(agent) => Response::Agent { agent: Some(Box::new(AgentDetail::from(&agent))) },
            Err(_) => Response::Agent { agent: None },
        },
        Query::FleetStatus => match fleet::reconcile(ctx).await {
            Ok(entries) => Response::FleetStatus { entries: entries.iter().map(fleet::to_status_entry).collect() },
            Err(e) => e.into(),
        },
        Query::GetHostLogs { id, lines, offset } => match ctx.store.find_host(&id) {
            Ok(host) => {
                let (log_path, content) = read_log(ctx.store.layout().host_logs_dir(&host.id), lines, offset);
                Response::HostLogs { log_path, content, offset }
            }
            Err(e) => e.into(),
        },
        Query::GetAgentLogs { id, lines, offset } => match ctx.store.find_agent(&id) {
            Ok(agent) => {
                let dir = ctx.store.layout().agent_logs_dir(&agent.host_id, &agent.id);
                let (log_path, content) = read_log(dir, lines, offset);
                Response::AgentLogs { log_path, content, offset }
            }
            Err(e) => e.into(),
        },
        Query::GetProvisionRun { agent_id: _ } => Response::ProvisionRun { run: None },
    }
}

/// Reads a log directory's most recent output, tolerating a missing file
/// (an agent that hasn't produced output yet isn't an error).
fn read_log(dir: std::path::PathBuf, lines: usize, offset: u64) -> (std::path::PathBuf, String) {
    let path = dir.join("output.log");
    let raw = std::fs::read_to_string(&path).unwrap_or_default();
    let tail = raw.get(offset as usize..).unwrap_or("");
    let content = if lines == 0 {
        tail.to_string()
    } else {
        tail.lines().rev().take(lines).collect::<Vec<_>>().into_iter().rev().collect::<Vec<_>>().join("\n")
    };
    (path, content)
}

async fn exec<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_id: &str,
    argv: Vec<String>,
    cwd: Option<std::path::PathBuf>,
    hard_timeout: Duration,
    warn_timeout: Option<Duration>,
) -> Response {
    let mut agent = match ctx.store.find_agent(agent_id) {
        Ok(a) => a,
        Err(e) => return e.into(),
    };
    let host = match ctx.store.read_host(&agent.host_id) {
        Ok(h) => h,
        Err(e) => return e.into(),
    };
    let backend = match ctx.providers.get(host.provider) {
        Ok(p) => p,
        Err(e) => return e.into(),
    };
    let req = ExecRequest { argv, cwd: cwd.or(Some(agent.work_dir.clone())), user: None, hard_timeout, warn_timeout };
    match backend.exec(&host, req).await {
        Ok(result) => {
            if result.slow {
                info!(agent = %agent.id, "exec exceeded warn timeout");
            }
            let now = ctx.clock.epoch_ms();
            let _ = ctx.activity.touch(&agent.host_id, "agent", now);
            agent.agent_activity_at_epoch_ms = fm_core::AgentDescriptor::bump_activity(agent.agent_activity_at_epoch_ms, now);
            let _ = ctx.store.write_agent(&agent);
            Response::ExecOutput { exit_code: result.exit_code, stdout: result.stdout, stderr: result.stderr }
        }
        Err(e) => e.into(),
    }
}

async fn transfer<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_id: &str,
    mode: &str,
    source: std::path::PathBuf,
    target: std::path::PathBuf,
) -> Response {
    let Some(mode) = TransferMode::parse(mode) else {
        return err_response(fm_core::ErrorKind::InvalidRequest, format!("unknown transfer mode {mode:?}"));
    };
    let agent = match ctx.store.find_agent(agent_id) {
        Ok(a) => a,
        Err(e) => return e.into(),
    };
    let host = match ctx.store.read_host(&agent.host_id) {
        Ok(h) => h,
        Err(e) => return e.into(),
    };
    let backend = match ctx.providers.get(host.provider) {
        Ok(p) => p.clone(),
        Err(e) => return e.into(),
    };
    let spec = TransferSpec::new(mode, source, target);

    // `pair` runs a continuous watch loop (§4.4); it must outlive this
    // request/response round trip, so it's spawned as a cancellable
    // background task instead of awaited inline like every other mode.
    if mode == TransferMode::Pair {
        let token = CancellationToken::new();
        ctx.pair_tasks.lock().insert(agent.id.to_string(), token.clone());
        let pair_tasks = ctx.pair_tasks.clone();
        let agent_key = agent.id.to_string();
        tokio::spawn(async move {
            let engine = TransferEngine::new(backend.as_ref());
            if let Err(e) = engine.pair(&host, &spec, token).await {
                warn!(agent = %agent_key, error = %e, "pair watch loop ended with an error");
            }
            pair_tasks.lock().remove(&agent_key);
        });
        return Response::TransferStarted { id: agent.id.to_string() };
    }

    let engine = TransferEngine::new(backend.as_ref());
    match engine.materialize(&host, &spec).await {
        Ok(()) => Response::TransferCompleted { id: agent.id.to_string() },
        Err(e) => e.into(),
    }
}

async fn stop_transfer<C: Clock, N: NotifyAdapter>(ctx: &DaemonContext<C, N>, agent_id: &str) -> Response {
    let agent = match ctx.store.find_agent(agent_id) {
        Ok(a) => a,
        Err(e) => return e.into(),
    };
    let id = agent.id.to_string();
    match ctx.pair_tasks.lock().remove(&id) {
        Some(token) => {
            token.cancel();
            Response::TransferCompleted { id }
        }
        None => err_response(fm_core::ErrorKind::InvalidRequest, format!("no active pair transfer for {id}")),
    }
}

async fn snapshot<C: Clock, N: NotifyAdapter>(ctx: &DaemonContext<C, N>, host_id: &str) -> Response {
    let mut host = match ctx.store.find_host(host_id) {
        Ok(h) => h,
        Err(e) => return e.into(),
    };
    let backend = match ctx.providers.get(host.provider) {
        Ok(p) => p,
        Err(e) => return e.into(),
    };
    match backend.snapshot(&host).await {
        Ok(snap) => {
            let reference = snap.reference.clone();
            host.snapshots.insert(0, snap);
            if let Err(e) = ctx.store.write_host(&host) {
                return e.into();
            }
            Response::Snapshotted { host_id: host.id.to_string(), snapshot: reference }
        }
        Err(e) => e.into(),
    }
}

async fn provision<C: Clock, N: NotifyAdapter>(ctx: &DaemonContext<C, N>, agent_id: &str) -> Response {
    let agent = match ctx.store.find_agent(agent_id) {
        Ok(a) => a,
        Err(e) => return e.into(),
    };
    let host = match ctx.store.read_host(&agent.host_id) {
        Ok(h) => h,
        Err(e) => return e.into(),
    };
    let agent_type = match fm_profile::resolve(&agent.agent_type) {
        Ok(t) => t,
        Err(e) => return e.into(),
    };
    let backend = match ctx.providers.get(host.provider) {
        Ok(p) => p,
        Err(e) => return e.into(),
    };
    let mut run = fm_core::ProvisionRun::new(fm_core::ProvisionRunId::new());
    for (index, kind) in agent_type.default_steps.iter().cloned().enumerate() {
        run.steps.push(fm_core::StepRecord {
            index,
            kind,
            status: fm_core::StepStatus::Pending,
            outcome: fm_core::StepOutcome::default(),
            started_at_epoch_ms: 0,
            finished_at_epoch_ms: None,
        });
    }
    let executor = ProvisionExecutor::new(backend.as_ref(), &ctx.clock);
    if let Err(e) = executor.run(&host, &mut run).await {
        error!(agent = %agent.id, error = %e, "provisioning run failed");
        return e.into();
    }
    let summary = ProvisionRunSummary {
        id: run.id.to_string(),
        steps: run
            .steps
            .iter()
            .map(|s| ProvisionStepSummary {
                index: s.index,
                label: s.kind.label().to_string(),
                status: s.status.to_string(),
                exit_code: s.outcome.exit_code,
            })
            .collect(),
        complete: run.is_complete(),
        failed_step: run.failed_step(),
    };
    Response::Provisioned { run: Box::new(summary) }
}

async fn set_limit<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host_id: &str,
    resource: fm_core::Resource,
) -> Response {
    let mut host = match ctx.store.find_host(host_id) {
        Ok(h) => h,
        Err(e) => return e.into(),
    };
    host.resource = resource;
    match ctx.store.write_host(&host) {
        Ok(()) => Response::LimitSet { host_id: host.id.to_string() },
        Err(e) => e.into(),
    }
}
