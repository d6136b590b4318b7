//! External lint tool invocation
//!
//! The lint tool is an opaque subprocess: given a target path and the
//! daemon environment flag it prints a JSON payload with a `violations`
//! collection on stdout. This module owns that boundary and nothing else;
//! the engine consumes the parsed [`RunSnapshot`] through the
//! [`LintInvoker`] trait, so tests substitute canned snapshots.

use crate::finding::RunSnapshot;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Environment flag asking the lint tool to use its daemon fast path.
/// Set for the child only when the caller has not set it already.
pub const DAEMON_ENV: &str = "VHDL_POLICY_DAEMON";

/// Default lint executable, relative to the working directory.
pub const DEFAULT_TOOL: &str = "./vhdl-lint";

/// Flag requesting JSON output from the lint tool.
const JSON_FLAG: &str = "-j";

/// How often a timed invocation polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Errors that can occur while invoking the lint tool
#[derive(Error, Debug)]
pub enum InvokerError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("lint failed: {0}")]
    ToolFailed(String),

    #[error("lint output was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("lint timed out after {0}s")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for invoker operations
pub type Result<T> = std::result::Result<T, InvokerError>;

/// Capability to produce the current findings for a target path.
///
/// Exactly one attempt per call; the invoker never retries.
pub trait LintInvoker {
    fn run(&self, path: &Path) -> Result<RunSnapshot>;
}

/// Invoker that shells out to the real lint tool.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    tool: String,
    timeout: Option<Duration>,
}

impl CommandInvoker {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            timeout: None,
        }
    }

    /// Kill the tool and fail with [`InvokerError::Timeout`] when it runs
    /// longer than this. No timeout by default.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.tool);
        cmd.arg(JSON_FLAG).arg(path);
        // setdefault semantics: an explicit caller value wins over ours.
        if std::env::var_os(DAEMON_ENV).is_none() {
            cmd.env(DAEMON_ENV, "1");
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

impl LintInvoker for CommandInvoker {
    fn run(&self, path: &Path) -> Result<RunSnapshot> {
        tracing::debug!(tool = %self.tool, path = %path.display(), "invoking lint tool");
        let mut cmd = self.command(path);

        let output = match self.timeout {
            None => cmd.output().map_err(|source| InvokerError::Spawn {
                tool: self.tool.clone(),
                source,
            })?,
            Some(timeout) => {
                let child = cmd.spawn().map_err(|source| InvokerError::Spawn {
                    tool: self.tool.clone(),
                    source,
                })?;
                wait_with_deadline(child, timeout)?
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let diagnostic = if stderr.is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr
            };
            return Err(InvokerError::ToolFailed(diagnostic));
        }

        let mut snapshot: RunSnapshot = serde_json::from_slice(&output.stdout)?;
        snapshot.captured_at = Some(unix_timestamp());
        tracing::debug!(findings = snapshot.len(), "lint tool finished");
        Ok(snapshot)
    }
}

/// Wait for the child to exit, killing it once the deadline passes.
///
/// Reader threads drain stdout/stderr from the start so a chatty tool can
/// never fill the pipe buffer and deadlock against our wait loop.
fn wait_with_deadline(mut child: Child, timeout: Duration) -> Result<std::process::Output> {
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());
    let deadline = Instant::now() + timeout;

    let status: ExitStatus = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            // Readers are not joined here: a grandchild of the killed tool
            // may still hold the pipe open, and the failure path must not
            // block on it.
            return Err(InvokerError::Timeout(timeout.as_secs()));
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(std::process::Output {
        status,
        stdout: stdout.join().unwrap_or_default(),
        stderr: stderr.join().unwrap_or_default(),
    })
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

/// Unix seconds, without pulling in a date-time dependency.
fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
