// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for command streams, output captures and command failures.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::CommandHandle;

/// One of the three standard I/O channels of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Stdin,
    /// Primary output channel.
    Stdout,
    /// Secondary output channel.
    Stderr,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Stdin => write!(f, "stdin"),
            Channel::Stdout => write!(f, "stdout"),
            Channel::Stderr => write!(f, "stderr"),
        }
    }
}

/// Errors raised by the stream side of a command and by output captures.
///
/// I/O errors are held behind an [`Arc`] so that memoized outcomes can be
/// handed to every consumer.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// A write was attempted after the write side had been ended.
    #[error("write after end")]
    WriteAfterEnd,

    /// The process was spawned without this channel piped.
    #[error("{channel} is not available")]
    ChannelUnavailable { channel: Channel },

    /// The channel has already been handed to another consumer.
    #[error("{channel} has already been consumed")]
    OutputConsumed { channel: Channel },

    /// A lower-level I/O error reported by one of the process's channels.
    #[error("{channel} error: {source}")]
    Channel {
        channel: Channel,
        source: Arc<io::Error>,
    },

    /// Command could not be spawned.
    #[error("failed to spawn `{command}`: {source}")]
    SpawnFailed {
        command: String,
        source: Arc<io::Error>,
    },

    /// Redirection target could not be opened or written.
    #[error("redirection failed: {message}")]
    RedirectFailed {
        message: String,
        source: Arc<io::Error>,
    },
}

impl Error {
    pub(crate) fn channel(channel: Channel, source: io::Error) -> Self {
        Error::Channel {
            channel,
            source: Arc::new(source),
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            Error::WriteAfterEnd => io::ErrorKind::BrokenPipe,
            Error::ChannelUnavailable { .. } | Error::OutputConsumed { .. } => {
                io::ErrorKind::NotConnected
            }
            Error::Channel { source, .. }
            | Error::SpawnFailed { source, .. }
            | Error::RedirectFailed { source, .. } => source.kind(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        io::Error::new(err.io_kind(), err)
    }
}

/// Failure outcome of awaiting a command.
///
/// Every variant carries a handle back to the command that produced it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommandError {
    /// The process exited with a non-zero status.
    #[error("command failed: `{command}` exited with status {status}")]
    Failed { status: i32, command: CommandHandle },

    /// The process was terminated without an exit status (e.g. by a signal).
    #[error("command terminated: `{command}` was killed{}", signal_suffix(.signal))]
    Terminated {
        signal: Option<i32>,
        command: CommandHandle,
    },

    /// Observing the process failed (exit wait or output relay I/O error).
    #[error("command failed: `{command}`: {source}")]
    Channel {
        source: Arc<io::Error>,
        command: CommandHandle,
    },
}

impl CommandError {
    /// Exit status, when the process exited on its own.
    pub fn status(&self) -> Option<i32> {
        match self {
            CommandError::Failed { status, .. } => Some(*status),
            CommandError::Terminated { .. } | CommandError::Channel { .. } => None,
        }
    }

    /// Handle of the command that produced this failure.
    pub fn command(&self) -> &CommandHandle {
        match self {
            CommandError::Failed { command, .. }
            | CommandError::Terminated { command, .. }
            | CommandError::Channel { command, .. } => command,
        }
    }
}

fn signal_suffix(signal: &Option<i32>) -> String {
    match signal {
        Some(sig) => format!(" by signal {sig}"),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
