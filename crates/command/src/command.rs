// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dual-interface command: a byte stream that can also be awaited.
//!
//! A [`Command`] composes a [`CommandStream`] (stdin/stdout as
//! `AsyncWrite`/`AsyncRead`) with a [`CommandHandle`] (identity and exit
//! outcome). Both halves share one reference-counted handle, so the stream
//! can be piped away while the result is still awaited elsewhere.

use std::future::IntoFuture;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::lines::Lines;
use crate::process::{OutputSource, ProcessHandle};
use crate::{
    Channel, CommandBuilder, CommandError, CommandHandle, CommandOutput, CommandResult,
    CommandStream, Error, StreamOptions, StreamState,
};

/// A spawned process exposed as both a stream and an awaitable result.
pub struct Command {
    stream: CommandStream,
    stderr: Option<OutputSource>,
}

impl Command {
    /// Builder for running `command_line` through the platform shell.
    pub fn builder(command_line: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(command_line)
    }

    /// Spawn `command_line` with default options.
    pub fn spawn(command_line: impl Into<String>) -> Result<Self, Error> {
        CommandBuilder::new(command_line).spawn()
    }

    /// Wrap an already-spawned process. Requires a tokio runtime.
    pub fn from_process(process: ProcessHandle) -> Self {
        Self::from_process_with(process, StreamOptions::default())
    }

    pub fn from_process_with(process: ProcessHandle, options: StreamOptions) -> Self {
        let (stream, stderr) = CommandStream::attach(process, options);
        Self { stream, stderr }
    }

    pub fn id(&self) -> Option<u32> {
        self.stream.handle().id()
    }

    pub fn display(&self) -> &str {
        self.stream.handle().display()
    }

    pub fn state(&self) -> StreamState {
        self.stream.handle().state()
    }

    pub fn is_destroyed(&self) -> bool {
        self.stream.handle().is_destroyed()
    }

    /// The result half: a clonable handle that can be awaited anywhere.
    pub fn as_future(&self) -> CommandHandle {
        self.stream.handle().clone()
    }

    pub fn as_stream(&mut self) -> &mut CommandStream {
        &mut self.stream
    }

    /// Give up the stderr channel and keep only the stream half.
    pub fn into_stream(self) -> CommandStream {
        self.stream
    }

    /// Wait for the process to exit. Same outcome on every call.
    ///
    /// The returned future owns a handle, so it does not borrow the command.
    pub fn wait(&self) -> BoxFuture<'static, Result<CommandResult, CommandError>> {
        self.as_future().into_future()
    }

    /// Capture stdout. Detaches it from the stream side; `None` if stdout
    /// was not piped or has already been taken.
    pub fn stdout(&mut self) -> Option<CommandOutput> {
        self.stream
            .detach_reader()
            .map(|reader| CommandOutput::new(Channel::Stdout, Box::new(reader)))
    }

    /// Capture stderr; `None` if not piped or already taken.
    pub fn stderr(&mut self) -> Option<CommandOutput> {
        self.stderr
            .take()
            .map(|source| CommandOutput::new(Channel::Stderr, source))
    }

    pub async fn next_chunk(&mut self) -> Option<Result<Vec<u8>, Error>> {
        self.stream.next_chunk().await
    }

    /// See [`CommandStream::pipe_to`].
    pub async fn pipe_to<W>(&mut self, dest: &mut W) -> Result<u64, Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        self.stream.pipe_to(dest).await
    }

    /// See [`CommandStream::pipe_from`].
    pub async fn pipe_from<R>(&mut self, src: &mut R) -> Result<u64, Error>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.stream.pipe_from(src).await
    }

    pub async fn end(&mut self) -> Result<(), Error> {
        self.stream.end().await
    }

    pub fn lines(&mut self) -> Lines<&mut CommandStream> {
        self.stream.lines()
    }
}

impl AsyncRead for Command {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_read(cx, buf)
    }
}

impl AsyncWrite for Command {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().stream).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().stream).poll_shutdown(cx)
    }
}

impl<'a> IntoFuture for &'a Command {
    type Output = Result<CommandResult, CommandError>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        self.wait()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("handle", self.stream.handle())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "command_tests/mod.rs"]
mod tests;
