// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared identity and deferred result of a command.

use std::fmt;
use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::completion::{Completion, Settled};
use crate::process::ExitReason;
use crate::CommandError;

/// Lifecycle of the stream side of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Neither side has finished.
    Open,
    /// Output reached its end or input was closed.
    Ended,
    /// Output ended, input closed and the exit outcome settled.
    Destroyed,
}

/// Successful outcome of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: i32,
    pub command: CommandHandle,
}

/// Cheap, clonable reference to a command.
///
/// Awaiting a handle observes the command's exit; every await (through any
/// clone) shares one subscription and sees the same outcome. Two handles
/// compare equal when they refer to the same command.
#[derive(Clone)]
pub struct CommandHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    pid: Option<u32>,
    display: String,
    completion: Completion,
    input_closed: AtomicBool,
    output_ended: AtomicBool,
}

impl CommandHandle {
    pub(crate) fn new(pid: Option<u32>, display: String, completion: Completion) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                pid,
                display,
                completion,
                input_closed: AtomicBool::new(false),
                output_ended: AtomicBool::new(false),
            }),
        }
    }

    /// Process id, if the process reported one.
    pub fn id(&self) -> Option<u32> {
        self.inner.pid
    }

    /// The command as it was invoked.
    pub fn display(&self) -> &str {
        &self.inner.display
    }

    /// Wait for the process to exit.
    ///
    /// Status 0 resolves; anything else rejects with a [`CommandError`].
    /// Never re-reads output.
    pub async fn wait(&self) -> Result<CommandResult, CommandError> {
        let settled = self.inner.completion.settled().await;
        self.outcome(settled)
    }

    /// Whether the exit outcome is known.
    pub fn is_settled(&self) -> bool {
        self.inner.completion.is_settled()
    }

    pub fn state(&self) -> StreamState {
        let output_ended = self.inner.output_ended.load(Ordering::Acquire);
        let input_closed = self.inner.input_closed.load(Ordering::Acquire);
        if output_ended && input_closed && self.is_settled() {
            StreamState::Destroyed
        } else if output_ended || input_closed {
            StreamState::Ended
        } else {
            StreamState::Open
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.state() == StreamState::Destroyed
    }

    pub fn is_input_closed(&self) -> bool {
        self.inner.input_closed.load(Ordering::Acquire)
    }

    pub(crate) fn completion(&self) -> &Completion {
        &self.inner.completion
    }

    pub(crate) fn mark_input_closed(&self) {
        if !self.inner.input_closed.swap(true, Ordering::AcqRel) {
            tracing::debug!(pid = ?self.inner.pid, "command input closed");
        }
    }

    pub(crate) fn mark_output_ended(&self) {
        if !self.inner.output_ended.swap(true, Ordering::AcqRel) {
            tracing::debug!(pid = ?self.inner.pid, "command output ended");
        }
    }

    fn outcome(&self, settled: Settled) -> Result<CommandResult, CommandError> {
        let command = self.clone();
        match settled {
            Settled::Exited(ExitReason::Code(0)) => Ok(CommandResult { status: 0, command }),
            Settled::Exited(ExitReason::Code(status)) => Err(CommandError::Failed { status, command }),
            Settled::Exited(ExitReason::Signal(signal)) => Err(CommandError::Terminated {
                signal: Some(signal),
                command,
            }),
            Settled::Exited(ExitReason::Unknown) => Err(CommandError::Terminated {
                signal: None,
                command,
            }),
            Settled::Failed(source) => Err(CommandError::Channel { source, command }),
        }
    }
}

impl PartialEq for CommandHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CommandHandle {}

impl fmt::Debug for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHandle")
            .field("pid", &self.inner.pid)
            .field("display", &self.inner.display)
            .field("state", &self.state())
            .finish()
    }
}

impl fmt::Display for CommandHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.display)
    }
}

impl IntoFuture for CommandHandle {
    type Output = Result<CommandResult, CommandError>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl<'a> IntoFuture for &'a CommandHandle {
    type Output = Result<CommandResult, CommandError>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.wait())
    }
}
