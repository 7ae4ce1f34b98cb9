//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for testing `fm` CLI behavior end to end
//! against a real `fmd` daemon. Grounded on the teacher's own
//! `tests/specs/prelude.rs` (`CliBuilder`/`RunAssert`/`Project` shape,
//! `binary_path`'s llvm-cov-aware resolution), adapted from the job/runbook
//! domain to hosts and agents.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// Aggressive timeouts for fast tests.
//
// IMPORTANT:
//   Do NOT change these.
//   File a performance bug instead.
const FM_IPC_TIMEOUT_MS: &str = "2000";
const FM_IDLE_POLL_MS: &str = "50";

pub const SPEC_POLL_INTERVAL_MS: u64 = 10;
pub const SPEC_WAIT_MAX_MS: u64 = 2000;

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// `CARGO_MANIFEST_DIR` is stale (e.g. compiled by a removed worktree into
/// a shared target directory).
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

fn fm_binary() -> PathBuf {
    binary_path("fm")
}

pub fn fmd_binary() -> PathBuf {
    binary_path("fmd")
}

/// Create a CLI builder for `fm` commands.
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions.
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![
                ("FM_IPC_TIMEOUT_MS".into(), FM_IPC_TIMEOUT_MS.into()),
                ("FM_IDLE_POLL_MS".into(), FM_IDLE_POLL_MS.into()),
            ],
        }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string_lossy().to_string()));
        self
    }

    pub fn command(self) -> Command {
        let mut cmd = Command::new(fm_binary());
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // Prevent a parent FM_HOST_DIR from leaking into tests and scoping
        // a test's fleet to the wrong root.
        cmd.env_remove("FM_HOST_DIR");

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    pub fn passes(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }

    pub fn fails(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        assert!(
            !output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        RunAssert { output }
    }
}

/// Result of a CLI run for chaining assertions.
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    pub fn code(&self) -> Option<i32> {
        self.output.status.code()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(stdout.contains(expected), "stdout does not contain '{}'\nstdout: {}", expected, stdout);
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(!stdout.contains(unexpected), "stdout should not contain '{}'\nstdout: {}", unexpected, stdout);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(stderr.contains(expected), "stderr does not contain '{}'\nstderr: {}", expected, stderr);
        self
    }

    pub fn code_eq(self, expected: i32) -> Self {
        assert_eq!(self.code(), Some(expected), "stderr: {}", self.stderr());
        self
    }
}

/// Poll a condition until it returns true or timeout is reached.
pub fn wait_for<F>(timeout_ms: u64, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);
    let poll_interval = std::time::Duration::from_millis(SPEC_POLL_INTERVAL_MS);

    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(poll_interval);
    }
    false
}

/// Isolated fleet root for one test: its own `FM_HOST_DIR`, so hosts,
/// sockets and log files never collide across parallel test runs.
pub struct Fleet {
    root: tempfile::TempDir,
}

impl Fleet {
    pub fn empty() -> Self {
        Self { root: tempfile::tempdir().expect("tempdir") }
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Run `fm` scoped to this fleet's root directory.
    pub fn fm(&self) -> CliBuilder {
        cli().env("FM_HOST_DIR", self.root_path())
    }

    pub fn daemon_log(&self) -> String {
        let Ok(entries) = std::fs::read_dir(self.root_path()) else { return "(no fleet root)".to_string() };
        for entry in entries.flatten() {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with("fmd.log") {
                return std::fs::read_to_string(entry.path()).unwrap_or_else(|_| "(unreadable)".to_string());
            }
        }
        "(no daemon log)".to_string()
    }
}

impl Drop for Fleet {
    fn drop(&mut self) {
        let mut cmd = self.fm().args(&["daemon", "stop", "--kill"]).command();
        cmd.stdout(std::process::Stdio::null()).stderr(std::process::Stdio::null());
        let _ = cmd.status();
    }
}
