// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC client connecting `fm` to `fmd` over the Unix domain socket (§6).
//!
//! Grounded on the teacher's `DaemonClient` usage pattern visible throughout
//! `client_queries.rs`/`commands/daemon.rs` (`DaemonClient::connect()` as a
//! cheap, synchronous reachability probe; `client.send(&request).await?` for
//! the actual round trip; `Self::reject(other)` when a response doesn't
//! match the variant a typed wrapper expects) — the client source file
//! itself wasn't in the retrieved pack, so this reconstructs it from that
//! usage and from `fm-wire`'s protocol contract.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use fm_wire::{ProtocolError, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (socket {0})")]
    NotRunning(PathBuf),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("unexpected response from daemon: {0:?}")]
    Unexpected(Box<Response>),
    #[error("{0}")]
    Daemon(String),
    #[error("failed to spawn fmd: {0}")]
    Spawn(#[source] std::io::Error),
}

impl ClientError {
    pub fn is_not_running(&self) -> bool {
        matches!(self, ClientError::NotRunning(_))
    }
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    /// Cheap reachability probe: resolves the socket path from the
    /// environment (§6) and confirms something is listening on it. Kept
    /// synchronous so call sites like `commands::daemon::status` can probe
    /// before deciding whether to enter the async runtime for a real
    /// request.
    pub fn connect() -> Result<Self, ClientError> {
        let root_name = fm_daemon::env::root_name();
        let root_dir = fm_daemon::env::host_dir(&root_name);
        let socket_path = fm_daemon::env::socket_path(&root_dir);
        std::os::unix::net::UnixStream::connect(&socket_path)
            .map_err(|_| ClientError::NotRunning(socket_path.clone()))?;
        Ok(Self { socket_path, timeout: fm_daemon::env::ipc_timeout() })
    }

    /// Connects, spawning `fmd` in the background and retrying with a short
    /// backoff if nothing is listening yet (`fm daemon start` / `restart`,
    /// and the first `fm create` against a namespace with no running
    /// daemon).
    pub fn connect_or_start() -> Result<Self, ClientError> {
        if let Ok(client) = Self::connect() {
            return Ok(client);
        }

        let fmd_path = find_fmd_binary();
        Command::new(&fmd_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(ClientError::Spawn)?;

        let mut last_err = None;
        for attempt in 0..20u32 {
            std::thread::sleep(Duration::from_millis(100 * u64::from(attempt.min(5) + 1)));
            match Self::connect() {
                Ok(client) => return Ok(client),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| ClientError::NotRunning(PathBuf::from("fmd.sock"))))
    }

    /// Sends a single request and awaits its response over a fresh
    /// connection. `fmd`'s listener accepts one task per connection and
    /// loops request/response pairs on it (§5's host-lock serialization
    /// happens inside the daemon, not on this connection), so a CLI
    /// invocation that issues exactly one request needs nothing more.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let fut = async {
            let mut stream = UnixStream::connect(&self.socket_path)
                .await
                .map_err(|_| ClientError::NotRunning(self.socket_path.clone()))?;
            let data = fm_wire::encode(request)?;
            fm_wire::write_message(&mut stream, &data).await?;
            let bytes = fm_wire::read_message(&mut stream).await?;
            let response: Response = fm_wire::decode(&bytes)?;
            match response {
                Response::Error { message } => Err(ClientError::Daemon(message)),
                other => Ok(other),
            }
        };
        tokio::time::timeout(self.timeout, fut).await.map_err(|_| ClientError::Protocol(ProtocolError::Timeout))?
    }

    /// Sends a request whose only expected success response is `Ok`.
    pub async fn send_simple(&self, request: &Request) -> Result<(), ClientError> {
        match self.send(request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self) -> Result<(u64, usize, usize), ClientError> {
        match self.send(&Request::Status).await? {
            Response::Status { uptime_secs, hosts_active, agents_active } => {
                Ok((uptime_secs, hosts_active, agents_active))
            }
            other => Self::reject(other),
        }
    }

    pub async fn hello(&self) -> Result<String, ClientError> {
        let request = Request::Hello { version: fm_wire::PROTOCOL_VERSION.to_string(), token: None };
        match self.send(&request).await? {
            Response::Hello { version } => Ok(version),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self, kill: bool) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown { kill }).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }

    pub(crate) fn reject<T>(other: Response) -> Result<T, ClientError> {
        Err(ClientError::Unexpected(Box::new(other)))
    }
}

/// Stops the daemon if one is reachable; returns whether it was running.
/// Shared by `fm daemon stop` and `fm daemon restart`.
pub async fn daemon_stop(kill: bool) -> Result<bool, ClientError> {
    let client = match DaemonClient::connect() {
        Ok(c) => c,
        Err(e) if e.is_not_running() => return Ok(false),
        Err(e) => return Err(e),
    };
    client.shutdown(kill).await?;
    Ok(true)
}

/// Locates the `fmd` binary: alongside the running `fm` executable first
/// (the common install layout), falling back to `PATH` lookup — same
/// fallback chain as the teacher's `find_ojd_binary`, minus its
/// debug-build/`CARGO_MANIFEST_DIR` special case, which only matters for a
/// source checkout of the teacher's own workspace.
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
