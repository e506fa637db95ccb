// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process handles: the I/O channels and exit notification of a spawned process.

use std::fmt;
use std::io;
use std::process::ExitStatus;
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Child;
use tokio::sync::oneshot;

/// Byte sink feeding a process's standard input.
pub type InputSink = Box<dyn AsyncWrite + Send + Unpin>;

/// Byte source reading one of a process's output channels.
pub type OutputSource = Box<dyn AsyncRead + Send + Unpin>;

/// One-time notification that resolves when the process has terminated.
pub type ExitNotification = BoxFuture<'static, io::Result<ExitReason>>;

/// Why a process stopped running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Exited on its own with this status code.
    Code(i32),
    /// Killed by this signal (Unix only).
    Signal(i32),
    /// Neither a code nor a signal was reported.
    Unknown,
}

impl ExitReason {
    pub fn code(self) -> Option<i32> {
        match self {
            ExitReason::Code(code) => Some(code),
            ExitReason::Signal(_) | ExitReason::Unknown => None,
        }
    }

    pub fn success(self) -> bool {
        self == ExitReason::Code(0)
    }
}

impl From<ExitStatus> for ExitReason {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitReason::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitReason::Signal(signal);
            }
        }
        ExitReason::Unknown
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Code(code) => write!(f, "exit code {code}"),
            ExitReason::Signal(signal) => write!(f, "signal {signal}"),
            ExitReason::Unknown => write!(f, "unknown exit"),
        }
    }
}

/// Raw pieces of a process handle.
///
/// Any channel may be absent when it was not piped.
pub struct ProcessParts {
    pub pid: Option<u32>,
    /// Human-readable form of the invoked command.
    pub display: String,
    pub stdin: Option<InputSink>,
    pub stdout: Option<OutputSource>,
    pub stderr: Option<OutputSource>,
    pub exit: ExitNotification,
}

/// An already-spawned process: its channels plus a single exit notification.
pub struct ProcessHandle {
    pub(crate) pid: Option<u32>,
    pub(crate) display: String,
    pub(crate) stdin: Option<InputSink>,
    pub(crate) stdout: Option<OutputSource>,
    pub(crate) stderr: Option<OutputSource>,
    pub(crate) exit: ExitNotification,
}

impl ProcessHandle {
    pub fn from_parts(parts: ProcessParts) -> Self {
        Self {
            pid: parts.pid,
            display: parts.display,
            stdin: parts.stdin,
            stdout: parts.stdout,
            stderr: parts.stderr,
            exit: parts.exit,
        }
    }

    /// Take the pipes of a spawned child and hand the child to an exit
    /// watcher task.
    ///
    /// The watcher reaps the child even if nobody ever awaits the exit
    /// notification. With a `timeout`, the child is killed once it elapses.
    /// Must be called from within a tokio runtime.
    pub fn from_child(mut child: Child, display: impl Into<String>, timeout: Option<Duration>) -> Self {
        let display = display.into();
        let pid = child.id();
        let stdin = child.stdin.take().map(|s| Box::new(s) as InputSink);
        let stdout = child.stdout.take().map(|s| Box::new(s) as OutputSource);
        let stderr = child.stderr.take().map(|s| Box::new(s) as OutputSource);

        let (tx, rx) = oneshot::channel();
        tokio::spawn(watch_child(child, pid, timeout, tx));

        let exit: ExitNotification = Box::pin(async move {
            rx.await
                .unwrap_or_else(|_| Err(io::Error::other("exit watcher stopped before reporting")))
        });

        Self {
            pid,
            display,
            stdin,
            stdout,
            stderr,
            exit,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("display", &self.display)
            .field("stdin", &self.stdin.is_some())
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish_non_exhaustive()
    }
}

/// Wait for a child to terminate, enforcing an optional timeout.
async fn watch_child(
    mut child: Child,
    pid: Option<u32>,
    timeout: Option<Duration>,
    tx: oneshot::Sender<io::Result<ExitReason>>,
) {
    let start = Instant::now();
    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                tracing::warn!(?pid, timeout_ms = limit.as_millis() as u64, "command timed out, killing");
                match child.start_kill() {
                    Ok(()) => child.wait().await,
                    Err(e) => Err(e),
                }
            }
        },
        None => child.wait().await,
    };

    let result = status.map(ExitReason::from);
    match &result {
        Ok(reason) => tracing::debug!(
            ?pid,
            %reason,
            duration_ms = start.elapsed().as_millis() as u64,
            "command exited"
        ),
        Err(e) => tracing::warn!(?pid, error = %e, "failed to wait for command"),
    }
    // Receiver gone means the handle was dropped without anyone listening.
    let _ = tx.send(result);
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
