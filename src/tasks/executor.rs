//! Shell command execution with output streaming and group cancellation

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use super::TaskMessage;
use crate::constants::SPAWN_FAILURE_CODE;

/// Result of one shell command invocation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunResult {
    pub exit_code: i32,
    pub succeeded: bool,
}

impl RunResult {
    fn from_code(exit_code: i32) -> Self {
        Self {
            exit_code,
            succeeded: exit_code == 0,
        }
    }

    fn spawn_failure() -> Self {
        Self {
            exit_code: SPAWN_FAILURE_CODE,
            succeeded: false,
        }
    }
}

/// Shared cancellation handle for the single active task.
///
/// Holds the process-group id of the currently running child while one is
/// alive. `cancel` signals the whole group so shell chains (`a && b`) and
/// anything they forked are reached; the blocked `run_shell` call observes
/// the exit and returns normally with `succeeded = false`.
#[derive(Debug, Default)]
pub struct TaskControl {
    cancel_requested: AtomicBool,
    active_pgid: Mutex<Option<i32>>,
}

impl TaskControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the cancel flag before a new task starts
    pub fn reset(&self) {
        self.cancel_requested.store(false, Ordering::SeqCst);
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }

    /// Request cancellation: SIGTERM the active process group, if any.
    /// Idempotent when nothing is running; does not wait for exit.
    pub fn cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
        let pgid = self.active_pgid.lock().map(|g| *g).unwrap_or(None);
        if let Some(pgid) = pgid {
            tracing::info!("Cancelling active process group {}", pgid);
            if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGTERM) {
                tracing::warn!("Failed to signal process group {}: {}", pgid, e);
            }
        }
    }

    fn register(&self, pgid: i32) {
        if let Ok(mut guard) = self.active_pgid.lock() {
            *guard = Some(pgid);
        }
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.active_pgid.lock() {
            *guard = None;
        }
    }
}

/// Run a shell command, streaming combined stdout/stderr line-by-line.
///
/// The command runs via `sh -c` in its own process group. Blocks until the
/// child exits; callers run this off the UI loop. Spawn failure is reported
/// through the channel and the sentinel exit code, never as an Err.
pub async fn run_shell(
    control: &TaskControl,
    tx: &mpsc::Sender<TaskMessage>,
    command: &str,
) -> RunResult {
    tracing::info!("Running shell command: {}", command);

    let mut child = match Command::new("sh")
        .arg("-c")
        .arg(command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::error!("Failed to spawn command: {}", e);
            let _ = tx
                .send(TaskMessage::Line(format!("Failed to start command: {}", e)))
                .await;
            return RunResult::spawn_failure();
        }
    };

    // With process_group(0) the child leads its own group, so pgid == pid.
    if let Some(pid) = child.id() {
        control.register(pid as i32);
        // A cancel that landed between spawn and register found no pgid to
        // signal; re-issue it now that the group is known.
        if control.cancel_requested() {
            control.cancel();
        }
    }

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let tx_out = tx.clone();
    let stdout_task = tokio::spawn(async move {
        if let Some(stdout) = stdout {
            let mut reader = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                if tx_out.send(TaskMessage::Line(line)).await.is_err() {
                    break;
                }
            }
        }
    });

    let tx_err = tx.clone();
    let stderr_task = tokio::spawn(async move {
        if let Some(stderr) = stderr {
            let mut reader = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = reader.next_line().await {
                if tx_err.send(TaskMessage::Line(line)).await.is_err() {
                    break;
                }
            }
        }
    });

    let status = child.wait().await;
    control.clear();

    // Pipes close when the group exits, so the readers finish on their own.
    let _ = stdout_task.await;
    let _ = stderr_task.await;

    match status {
        Ok(status) => {
            // Signal-terminated children read like a shell would report them
            let code = status
                .code()
                .or_else(|| status.signal().map(|sig| 128 + sig))
                .unwrap_or(-1);
            tracing::info!("Command exited with code {}", code);
            RunResult::from_code(code)
        }
        Err(e) => {
            tracing::error!("Failed to wait for command: {}", e);
            RunResult::spawn_failure()
        }
    }
}

/// Run a command quietly and capture its output (no streaming)
pub async fn run_capture(cmd: &str, args: &[&str]) -> Result<(bool, String, String)> {
    tracing::debug!("Capturing command: {} {:?}", cmd, args);

    let output = Command::new(cmd)
        .args(args)
        .output()
        .await
        .with_context(|| format!("Failed to execute command: {}", cmd))?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    Ok((output.status.success(), stdout, stderr))
}

/// Check if a command exists on PATH
pub async fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}
