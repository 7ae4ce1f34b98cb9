// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle Orchestrator (C7, §4.6): one function per named state
//! transition, each acquiring the host lock before touching a host's
//! descriptor or its agents.
//!
//! Grounded on the teacher's `daemon/src/engine/runtime/handlers/
//! lifecycle.rs` + `daemon/src/lifecycle/{mod,reconcile,startup}.rs`: a
//! flat module of `async fn`s taking a shared context, not an actor or a
//! state-machine struct. The rename protocol's resume logic is grounded on
//! the same file's "detect a mismatch between persisted state and live
//! session state, resume or fail accordingly" reconciliation pattern.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

use fm_adapters::{CreateHostRequest, Provider, ProviderError, SessionError, StartRequest};
use fm_core::{
    naming, AgentDescriptor, AgentId, AgentStatus, Clock, ErrorKind, HostDescriptor, HostId,
    HostStatus, IdleMode, InvalidName, ProviderKind, Resource, Ssh,
};
use fm_engine::{ProvisionError, ProvisionExecutor, TransferEngine, TransferError, TransferSpec};
use fm_storage::{HostLockGuard, StoreError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::context::DaemonContext;
use fm_adapters::NotifyAdapter;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("host is locked by another in-flight operation")]
    HostLocked,
    #[error("{0}")]
    InvalidRequest(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Name(#[from] InvalidName),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    AgentType(#[from] fm_profile::AgentTypeError),
}

impl LifecycleError {
    pub fn to_error_kind(&self) -> ErrorKind {
        match self {
            LifecycleError::HostLocked => ErrorKind::LockContention,
            LifecycleError::InvalidRequest(_) | LifecycleError::Name(_) | LifecycleError::AgentType(_) => {
                ErrorKind::InvalidRequest
            }
            // A cancelled operation was interrupted by its caller (or by
            // daemon shutdown, §5) rather than failing on its own merits;
            // retrying it is exactly as sound as the original call was.
            LifecycleError::Cancelled => ErrorKind::Unavailable,
            LifecycleError::Store(e) => e.to_error_kind(),
            LifecycleError::Provider(e) => e.to_error_kind(),
            LifecycleError::Session(e) => e.to_error_kind(),
            LifecycleError::Transfer(e) => e.to_error_kind(),
            LifecycleError::Provision(e) => e.to_error_kind(),
        }
    }
}

/// Races `fut` against `cancel` (§5: "every operation must accept a
/// cancellation signal and propagate it into in-flight provider calls"),
/// the same `tokio::select!` shape [`fm_engine::TransferEngine::pair`]
/// already uses for its watch loop. `biased` so an already-cancelled
/// token wins even if `fut` would resolve immediately (e.g. a fake
/// provider in tests).
async fn cancellable<T, Fut>(cancel: &CancellationToken, fut: Fut) -> Result<T, LifecycleError>
where
    Fut: std::future::Future<Output = Result<T, LifecycleError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LifecycleError::Cancelled),
        result = fut => result,
    }
}

/// Acquires the host lock: an in-process reservation (so two concurrent
/// calls in this daemon never race) plus the persisted `HostLock` record
/// (so a crashed process's lock can be detected as stale by the next one).
fn acquire<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &mut HostDescriptor,
    operation: &'static str,
) -> Result<HostLockGuard, LifecycleError> {
    let guard = ctx.locks.try_reserve(&host.id).ok_or(LifecycleError::HostLocked)?;
    if let Some(existing) = &host.lock {
        let now = ctx.clock.epoch_ms();
        if !fm_storage::lock::is_reclaimable(existing, now, fm_storage::lock::DEFAULT_STALE_AGE) {
            return Err(LifecycleError::HostLocked);
        }
    }
    host.lock = Some(fm_storage::lock::new_lock(operation, &ctx.clock));
    ctx.store.write_host(host)?;
    Ok(guard)
}

fn release<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &mut HostDescriptor,
) -> Result<(), LifecycleError> {
    host.lock = None;
    ctx.store.write_host(host)?;
    Ok(())
}

/// §4.7: resolves `{target_host, new_host_provider}` to a concrete host,
/// creating one or falling back to the built-in local host as needed.
#[instrument(skip(ctx, cancel))]
pub async fn resolve_host<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    target_host: Option<&str>,
    new_host_provider: Option<ProviderKind>,
    cancel: CancellationToken,
) -> Result<HostDescriptor, LifecycleError> {
    match (target_host, new_host_provider) {
        (Some(_), Some(_)) => Err(LifecycleError::InvalidRequest(
            "target_host and new_host_provider are mutually exclusive".to_string(),
        )),
        (Some(target), None) => Ok(ctx.store.find_host(target)?),
        (None, Some(provider)) => {
            let name = format!("host-{}", fm_core::HostId::new().as_str());
            create_host(ctx, &name, provider, None, Resource::default(), None, cancel).await
        }
        (None, None) => match ctx.store.find_host("local") {
            Ok(host) => Ok(host),
            Err(StoreError::NotFound(_)) => {
                create_host(ctx, "local", ProviderKind::Local, None, Resource::default(), None, cancel).await
            }
            Err(e) => Err(e.into()),
        },
    }
}

/// Creates a new host via its provider (§4.1 `create_host`, §4.6 host
/// build sequence). Failure after the initial descriptor write leaves the
/// host tombstoned as `Failed`, never half-alive.
#[instrument(skip(ctx, ssh, cancel))]
pub async fn create_host<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    name: &str,
    provider: ProviderKind,
    image: Option<String>,
    resource: Resource,
    ssh: Option<Ssh>,
    cancel: CancellationToken,
) -> Result<HostDescriptor, LifecycleError> {
    naming::validate_name(name)?;
    if !provider.supports_create() {
        return Err(LifecycleError::InvalidRequest(format!(
            "{provider} hosts are defined in configuration, not created"
        )));
    }
    if ctx.store.host_name_taken(name, None)? {
        return Err(LifecycleError::InvalidRequest(format!("host name {name:?} already in use")));
    }

    let mut host = HostDescriptor {
        id: HostId::new(),
        name: name.to_string(),
        provider,
        provider_instance: "default".to_string(),
        status: HostStatus::Building,
        image,
        resource,
        ssh,
        tags: BTreeMap::new(),
        created_at_epoch_ms: ctx.clock.epoch_ms(),
        boot_at_epoch_ms: None,
        snapshots: Vec::new(),
        lock: None,
        destroyed: false,
        destroyed_at_epoch_ms: None,
    };
    let guard = acquire(ctx, &mut host, "create_host")?;

    let backend = ctx.providers.get(provider)?.clone();
    let req = CreateHostRequest {
        name: name.to_string(),
        image: host.image.clone(),
        resource: host.resource.clone(),
        env: BTreeMap::new(),
        tags: host.fleet_tags(&ctx.root_name),
    };
    match cancellable(&cancel, async { backend.create_host(&req).await.map_err(LifecycleError::from) }).await {
        Ok(info) => {
            if host.ssh.is_none() {
                host.ssh = info.ssh;
            }
            host.status = if info.running { HostStatus::Running } else { HostStatus::Stopped };
            host.boot_at_epoch_ms = Some(ctx.clock.epoch_ms());
            ctx.activity.touch(&host.id, "create", ctx.clock.epoch_ms())?;
            if info.running {
                ctx.activity.touch(&host.id, "boot", ctx.clock.epoch_ms())?;
            }
            release(ctx, &mut host)?;
            drop(guard);
            Ok(host)
        }
        Err(e) => {
            host.status = HostStatus::Failed;
            host.destroyed = true;
            host.destroyed_at_epoch_ms = Some(ctx.clock.epoch_ms());
            let _ = ctx.store.write_host(&host);
            drop(guard);
            Err(e)
        }
    }
}

/// Parameters for [`create_agent`] — the full set §4.6 step 1 says comes
/// out of effective-config resolution; that resolution (defaults/user/
/// project/local/env/CLI precedence) is the `fm` CLI's job, not this
/// crate's — by the time a `CreateAgent` wire request reaches `fmd`, it
/// already carries the single resolved value for each field.
pub struct CreateAgentParams {
    pub target_host: Option<String>,
    pub new_host_provider: Option<ProviderKind>,
    pub name: String,
    pub agent_type: String,
    pub command: Vec<String>,
    pub work_dir: PathBuf,
    pub project: String,
    pub labels: BTreeMap<String, String>,
    pub idle_mode: IdleMode,
    pub idle_timeout_seconds: u64,
    pub start_on_boot: bool,
    pub env: BTreeMap<String, String>,
    pub transfer: Option<TransferSpec>,
}

/// §4.6's centerpiece ten-step create-agent sequence. Any failure from
/// step 5 onward destroys the partially created agent (no `--reuse`
/// negotiation at this layer — that's a CLI-level retry decision).
#[instrument(skip(ctx, params, cancel), fields(agent_name = %params.name))]
pub async fn create_agent<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    params: CreateAgentParams,
    cancel: CancellationToken,
) -> Result<AgentDescriptor, LifecycleError> {
    naming::validate_name(&params.name)?;
    if ctx.store.agent_name_taken(&params.name, None)? {
        return Err(LifecycleError::InvalidRequest(format!("agent name {:?} already in use", params.name)));
    }
    let agent_type = fm_profile::resolve(&params.agent_type)?;

    let mut host =
        resolve_host(ctx, params.target_host.as_deref(), params.new_host_provider, cancel.clone()).await?;
    let guard = acquire(ctx, &mut host, "create_agent")?;

    let result = create_agent_inner(ctx, &mut host, &params, &agent_type, cancel).await;

    release(ctx, &mut host)?;
    drop(guard);
    result
}

async fn create_agent_inner<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &mut HostDescriptor,
    params: &CreateAgentParams,
    agent_type: &fm_profile::AgentType,
    cancel: CancellationToken,
) -> Result<AgentDescriptor, LifecycleError> {
    let id = AgentId::new();
    let work_dir = if params.work_dir.as_os_str().is_empty() {
        ctx.store.layout().agent_work_dir(&host.id, &id)
    } else {
        params.work_dir.clone()
    };

    let command = if params.command.is_empty() {
        let mut vars = HashMap::new();
        vars.insert("work_dir".to_string(), work_dir.display().to_string());
        vars.insert("project".to_string(), params.project.clone());
        agent_type.render_argv(&vars)
    } else {
        params.command.clone()
    };

    let mut agent = AgentDescriptor {
        id,
        host_id: host.id.clone(),
        name: params.name.clone(),
        agent_type: params.agent_type.clone(),
        command,
        work_dir,
        project: params.project.clone(),
        labels: params.labels.clone(),
        permissions: Default::default(),
        idle_mode: params.idle_mode,
        idle_timeout_seconds: params.idle_timeout_seconds,
        start_on_boot: params.start_on_boot,
        env: params.env.clone(),
        status: AgentStatus::Creating,
        created_at_epoch_ms: ctx.clock.epoch_ms(),
        started_at_epoch_ms: None,
        user_activity_at_epoch_ms: None,
        agent_activity_at_epoch_ms: None,
        ssh_activity_at_epoch_ms: None,
        pending_rename_to: None,
        destroyed: false,
        destroyed_at_epoch_ms: None,
    };
    ctx.store.write_agent(&agent)?;

    if let Err(e) =
        provision_and_start(ctx, host, &mut agent, agent_type, params.transfer.as_ref(), cancel).await
    {
        agent.status = AgentStatus::Destroyed;
        agent.destroyed = true;
        agent.destroyed_at_epoch_ms = Some(ctx.clock.epoch_ms());
        let _ = ctx.store.write_agent(&agent);
        return Err(e);
    }

    agent.status = AgentStatus::Running;
    agent.started_at_epoch_ms = Some(ctx.clock.epoch_ms());
    ctx.store.write_agent(&agent)?;
    ctx.activity.touch(&host.id, "create", ctx.clock.epoch_ms())?;
    Ok(agent)
}

/// §4.6 steps 5-8: materialize the workspace (C5), run the provisioning
/// pipeline (C6, agent-type defaults then environment writes), then start
/// the session (C4).
async fn provision_and_start<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &HostDescriptor,
    agent: &mut AgentDescriptor,
    agent_type: &fm_profile::AgentType,
    transfer: Option<&TransferSpec>,
    cancel: CancellationToken,
) -> Result<(), LifecycleError> {
    let backend = ctx.providers.get(host.provider)?;
    let provider: &dyn Provider = backend.as_ref();

    if let Some(spec) = transfer {
        let engine = TransferEngine::new(provider);
        cancellable(&cancel, async { engine.materialize(host, spec).await.map_err(LifecycleError::from) })
            .await?;
    }

    let mut run = fm_core::ProvisionRun::new(fm_core::ProvisionRunId::new());
    let env_steps = agent
        .env
        .iter()
        .map(|(k, v)| fm_core::StepKind::ApplyEnv { key: k.clone(), value: v.clone() });
    for (index, kind) in agent_type.default_steps.iter().cloned().chain(env_steps).enumerate() {
        run.steps.push(fm_core::StepRecord {
            index,
            kind,
            status: fm_core::StepStatus::Pending,
            outcome: fm_core::StepOutcome::default(),
            started_at_epoch_ms: 0,
            finished_at_epoch_ms: None,
        });
    }
    let executor = ProvisionExecutor::new(provider, &ctx.clock);
    cancellable(&cancel, async { executor.run(host, &mut run).await.map_err(LifecycleError::from) }).await?;

    let session = ctx.session_name(&agent.name);
    let env = runtime_env(&ctx.store.layout(), host, agent);
    let req = StartRequest { argv: &agent.command, env: &env, cwd: Some(&agent.work_dir) };
    cancellable(&cancel, async { ctx.session.start(host, &session, req).await.map_err(LifecycleError::from) })
        .await?;
    Ok(())
}

/// Builds the env map a started session actually gets: the well-known
/// runtime variables every agent process can rely on being set (§6),
/// overlaid with the agent's own configured `env` so a user key of the
/// same name always wins.
fn runtime_env(
    layout: &fm_storage::Layout,
    host: &HostDescriptor,
    agent: &AgentDescriptor,
) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    env.insert("FM_AGENT_ID".to_string(), agent.id.as_str().to_string());
    env.insert("FM_AGENT_NAME".to_string(), agent.name.clone());
    env.insert(
        "FM_AGENT_STATE_DIR".to_string(),
        layout.agent_dir(&host.id, &agent.id).display().to_string(),
    );
    env.insert("FM_AGENT_WORK_DIR".to_string(), agent.work_dir.display().to_string());
    env.insert("FM_HOST_DIR".to_string(), layout.host_dir(&host.id).display().to_string());
    env.extend(agent.env.iter().map(|(k, v)| (k.clone(), v.clone())));
    env
}

/// §4.6 stop sequence: kill session, snapshot + stop the host if this was
/// its last running agent.
#[instrument(skip(ctx))]
pub async fn stop_agent<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_ref: &str,
) -> Result<AgentDescriptor, LifecycleError> {
    let mut agent = ctx.store.find_agent(agent_ref)?;
    let mut host = ctx.store.read_host(&agent.host_id)?;
    let guard = acquire(ctx, &mut host, "stop_agent")?;

    let session = ctx.session_name(&agent.name);
    ctx.session.kill(&host, &session).await?;
    agent.status = AgentStatus::Stopped;
    ctx.store.write_agent(&agent)?;

    let other_running = ctx
        .store
        .list_agents_on_host(&host.id)?
        .iter()
        .any(|a| a.id != agent.id && a.status == AgentStatus::Running);
    if !other_running && host.status == HostStatus::Running {
        stop_host_resources(ctx, &mut host, true).await?;
    }

    release(ctx, &mut host)?;
    drop(guard);
    Ok(agent)
}

async fn stop_host_resources<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &mut HostDescriptor,
    snapshot_first: bool,
) -> Result<(), LifecycleError> {
    let backend = ctx.providers.get(host.provider)?;
    let do_snapshot = snapshot_first && host.provider.supports_snapshot();
    if let Some(snap) = backend.stop_host(host, do_snapshot).await? {
        host.snapshots.insert(0, snap);
    }
    host.status = HostStatus::Stopped;
    Ok(())
}

/// §4.6 start sequence: start the host if needed, restart the session
/// with its recorded argv.
#[instrument(skip(ctx))]
pub async fn start_agent<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_ref: &str,
) -> Result<AgentDescriptor, LifecycleError> {
    let mut agent = ctx.store.find_agent(agent_ref)?;
    let mut host = ctx.store.read_host(&agent.host_id)?;
    let guard = acquire(ctx, &mut host, "start_agent")?;

    if host.status != HostStatus::Running {
        let backend = ctx.providers.get(host.provider)?;
        let snapshot = host.latest_snapshot().map(|s| s.reference.clone());
        backend.start_host(&host, snapshot.as_deref()).await?;
        host.status = HostStatus::Running;
        host.boot_at_epoch_ms = Some(ctx.clock.epoch_ms());
        ctx.activity.touch(&host.id, "boot", ctx.clock.epoch_ms())?;
        ctx.store.write_host(&host)?;
    }

    let session = ctx.session_name(&agent.name);
    let env = runtime_env(&ctx.store.layout(), &host, &agent);
    let req = StartRequest { argv: &agent.command, env: &env, cwd: Some(&agent.work_dir) };
    ctx.session.start(&host, &session, req).await?;
    agent.status = AgentStatus::Running;
    agent.started_at_epoch_ms = Some(ctx.clock.epoch_ms());
    ctx.store.write_agent(&agent)?;

    release(ctx, &mut host)?;
    drop(guard);
    Ok(agent)
}

/// §4.6 destroy sequence (agent form): stop if running (requires `force`),
/// tombstone the descriptor; if this was the host's last live agent,
/// destroy the host too. Tombstones are purged later by the garbage
/// collector (C11), not here — SPEC_FULL §9 resolves retention as
/// persistent across restarts.
#[instrument(skip(ctx, cancel))]
pub async fn destroy_agent<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_ref: &str,
    force: bool,
    cancel: CancellationToken,
) -> Result<AgentDescriptor, LifecycleError> {
    let mut agent = ctx.store.find_agent(agent_ref)?;
    let mut host = ctx.store.read_host(&agent.host_id)?;
    let guard = acquire(ctx, &mut host, "destroy_agent")?;

    if agent.status == AgentStatus::Running {
        if !force {
            release(ctx, &mut host)?;
            drop(guard);
            return Err(LifecycleError::InvalidRequest(
                "agent is running; pass force to destroy".to_string(),
            ));
        }
        let session = ctx.session_name(&agent.name);
        cancellable(&cancel, async { ctx.session.kill(&host, &session).await.map_err(LifecycleError::from) })
            .await?;
    }

    agent.status = AgentStatus::Destroyed;
    agent.destroyed = true;
    agent.destroyed_at_epoch_ms = Some(ctx.clock.epoch_ms());
    ctx.store.write_agent(&agent)?;

    let live_remaining = ctx
        .store
        .list_agents_on_host(&host.id)?
        .iter()
        .filter(|a| !a.destroyed)
        .count();
    if live_remaining == 0 {
        let _ = cancellable(&cancel, async {
            destroy_host_resources(ctx, &mut host, false).await
        })
        .await;
    }

    release(ctx, &mut host)?;
    drop(guard);
    Ok(agent)
}

async fn destroy_host_resources<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host: &mut HostDescriptor,
    purge_snapshots: bool,
) -> Result<(), LifecycleError> {
    let backend = ctx.providers.get(host.provider)?;
    backend.destroy_host(host, purge_snapshots).await?;
    host.status = HostStatus::Destroyed;
    host.destroyed = true;
    host.destroyed_at_epoch_ms = Some(ctx.clock.epoch_ms());
    ctx.store.write_host(host)?;
    Ok(())
}

/// §4.6 destroy sequence (host form): destroys every live agent on the
/// host first (requires `force` if any are still running), then the host.
#[instrument(skip(ctx))]
pub async fn destroy_host<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host_ref: &str,
    purge_snapshots: bool,
    force: bool,
) -> Result<HostDescriptor, LifecycleError> {
    let mut host = ctx.store.find_host(host_ref)?;
    let guard = acquire(ctx, &mut host, "destroy_host")?;

    let live: Vec<_> = ctx
        .store
        .list_agents_on_host(&host.id)?
        .into_iter()
        .filter(|a| !a.destroyed)
        .collect();
    let any_running = live.iter().any(|a| a.status == AgentStatus::Running);
    if any_running && !force {
        release(ctx, &mut host)?;
        drop(guard);
        return Err(LifecycleError::InvalidRequest(
            "host has running agents; pass force to destroy".to_string(),
        ));
    }
    for mut agent in live {
        if agent.status == AgentStatus::Running {
            let session = ctx.session_name(&agent.name);
            let _ = ctx.session.kill(&host, &session).await;
        }
        agent.status = AgentStatus::Destroyed;
        agent.destroyed = true;
        agent.destroyed_at_epoch_ms = Some(ctx.clock.epoch_ms());
        ctx.store.write_agent(&agent)?;
    }

    destroy_host_resources(ctx, &mut host, purge_snapshots).await?;
    release(ctx, &mut host)?;
    drop(guard);
    Ok(host)
}

/// §4.6 host-level start/stop (`fm start`/`fm stop` with a host target):
/// starts the host and restarts every agent marked `start_on_boot`.
#[instrument(skip(ctx, cancel))]
pub async fn start_host<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host_ref: &str,
    snapshot: Option<&str>,
    cancel: CancellationToken,
) -> Result<HostDescriptor, LifecycleError> {
    let mut host = ctx.store.find_host(host_ref)?;
    let guard = acquire(ctx, &mut host, "start_host")?;

    if host.status != HostStatus::Running {
        let backend = ctx.providers.get(host.provider)?;
        let chosen = snapshot.map(str::to_string).or_else(|| host.latest_snapshot().map(|s| s.reference.clone()));
        cancellable(&cancel, async {
            backend.start_host(&host, chosen.as_deref()).await.map_err(LifecycleError::from)
        })
        .await?;
        host.status = HostStatus::Running;
        host.boot_at_epoch_ms = Some(ctx.clock.epoch_ms());
        ctx.activity.touch(&host.id, "boot", ctx.clock.epoch_ms())?;
    }

    for mut agent in ctx
        .store
        .list_agents_on_host(&host.id)?
        .into_iter()
        .filter(|a| a.start_on_boot && !a.destroyed)
    {
        if cancel.is_cancelled() {
            break;
        }
        let session = ctx.session_name(&agent.name);
        let env = runtime_env(&ctx.store.layout(), &host, &agent);
        let req = StartRequest { argv: &agent.command, env: &env, cwd: Some(&agent.work_dir) };
        if ctx.session.start(&host, &session, req).await.is_ok() {
            agent.status = AgentStatus::Running;
            agent.started_at_epoch_ms = Some(ctx.clock.epoch_ms());
            ctx.store.write_agent(&agent)?;
        }
    }

    release(ctx, &mut host)?;
    drop(guard);
    Ok(host)
}

#[instrument(skip(ctx, cancel))]
pub async fn stop_host<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    host_ref: &str,
    snapshot_first: bool,
    cancel: CancellationToken,
) -> Result<HostDescriptor, LifecycleError> {
    let mut host = ctx.store.find_host(host_ref)?;
    let guard = acquire(ctx, &mut host, "stop_host")?;

    for mut agent in ctx
        .store
        .list_agents_on_host(&host.id)?
        .into_iter()
        .filter(|a| a.status == AgentStatus::Running)
    {
        if cancel.is_cancelled() {
            break;
        }
        let session = ctx.session_name(&agent.name);
        let _ = ctx.session.kill(&host, &session).await;
        agent.status = AgentStatus::Stopped;
        ctx.store.write_agent(&agent)?;
    }

    cancellable(&cancel, async { stop_host_resources(ctx, &mut host, snapshot_first).await }).await?;
    release(ctx, &mut host)?;
    drop(guard);
    Ok(host)
}

/// §4.6 rename protocol. Ordered session-rename-then-descriptor-write
/// (the reverse of the spec's prose order) so resume is detectable from
/// state alone: a single `data.json` per agent has no room to keep both
/// the old and new name around simultaneously, so instead of writing the
/// new name first and hoping to remember the old one after a crash, the
/// session is renamed first — on resume, `session.has(new_session)`
/// already tells us whether that step completed. `pending_rename_to` is
/// persisted before the session rename so a crash in that window is
/// detectable too, not just a retried call with the same arguments; see
/// `fleet::reconcile` and DESIGN.md.
#[instrument(skip(ctx))]
pub async fn rename_agent<C: Clock, N: NotifyAdapter>(
    ctx: &DaemonContext<C, N>,
    agent_ref: &str,
    new_name: &str,
) -> Result<AgentDescriptor, LifecycleError> {
    naming::validate_name(new_name)?;
    let mut agent = ctx.store.find_agent(agent_ref)?;
    if agent.name == new_name {
        return Ok(agent);
    }
    if ctx.store.agent_name_taken(new_name, Some(&agent.id))? {
        return Err(LifecycleError::InvalidRequest(format!("agent name {new_name:?} already in use")));
    }
    let mut host = ctx.store.read_host(&agent.host_id)?;
    let guard = acquire(ctx, &mut host, "rename_agent")?;

    let old_session = ctx.session_name(&agent.name);
    let new_session = ctx.session_name(new_name);

    agent.pending_rename_to = Some(new_name.to_string());
    ctx.store.write_agent(&agent)?;

    let already_renamed = ctx.session.has(&host, &new_session).await.unwrap_or(false);
    if !already_renamed && ctx.session.has(&host, &old_session).await.unwrap_or(false) {
        ctx.session.rename(&host, &old_session, &new_session).await?;
    }
    agent.name = new_name.to_string();
    agent.pending_rename_to = None;
    ctx.store.write_agent(&agent)?;

    release(ctx, &mut host)?;
    drop(guard);
    Ok(agent)
}
