// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Byte-stream side of a command.
//!
//! Reads come from the relayed stdout of the process, writes go to its
//! stdin. Ending the write side, finishing a `pipe_from`, or reaching the
//! end of output closes the process's stdin so it observes end of input.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};

use crate::completion::Completion;
use crate::lines::Lines;
use crate::process::{InputSink, ProcessHandle};
use crate::relay::OutputReader;
use crate::{Channel, CommandHandle, Error, StreamOptions};

const PIPE_BUF_SIZE: usize = 8 * 1024;

enum WriteSide {
    Open(InputSink),
    /// Process was spawned without a stdin pipe.
    Unavailable,
    Ended,
}

enum ReadSide {
    Relay(OutputReader),
    /// Handed to an output capture.
    Detached,
    /// Process was spawned without a stdout pipe.
    Unavailable,
}

/// Bidirectional byte stream over a process's stdin and stdout.
pub struct CommandStream {
    handle: CommandHandle,
    reader: ReadSide,
    writer: WriteSide,
}

impl CommandStream {
    /// Wire up a process. Returns the stream and the untouched stderr source.
    ///
    /// Starts relaying stdout immediately; requires a tokio runtime.
    pub(crate) fn attach(
        process: ProcessHandle,
        options: StreamOptions,
    ) -> (Self, Option<crate::process::OutputSource>) {
        let ProcessHandle {
            pid,
            display,
            stdin,
            stdout,
            stderr,
            exit,
        } = process;

        let handle = CommandHandle::new(pid, display, Completion::new(exit));

        let reader = match stdout {
            Some(source) => ReadSide::Relay(OutputReader::spawn(
                source,
                options.chunk_size,
                handle.completion().clone(),
            )),
            None => {
                handle.mark_output_ended();
                ReadSide::Unavailable
            }
        };
        let writer = match stdin {
            Some(sink) => WriteSide::Open(sink),
            None => {
                handle.mark_input_closed();
                WriteSide::Unavailable
            }
        };

        tracing::debug!(pid = ?handle.id(), cmd = %handle, "command stream attached");
        (
            Self {
                handle,
                reader,
                writer,
            },
            stderr,
        )
    }

    pub fn handle(&self) -> &CommandHandle {
        &self.handle
    }

    /// Next stdout chunk with its original boundaries, `None` at end.
    pub async fn next_chunk(&mut self) -> Option<Result<Vec<u8>, Error>> {
        let chunk = match &mut self.reader {
            ReadSide::Relay(reader) => std::future::poll_fn(|cx| reader.poll_chunk(cx)).await,
            ReadSide::Detached => {
                return Some(Err(Error::OutputConsumed {
                    channel: Channel::Stdout,
                }))
            }
            ReadSide::Unavailable => None,
        };
        match chunk {
            Some(chunk) => Some(chunk.map_err(|e| Error::channel(Channel::Stdout, e))),
            None => {
                self.on_output_end();
                None
            }
        }
    }

    /// Copy all stdout into `dest`, then end `dest`.
    ///
    /// Every chunk is written in emission order exactly once.
    pub async fn pipe_to<W>(&mut self, dest: &mut W) -> Result<u64, Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut total = 0u64;
        while let Some(chunk) = self.next_chunk().await {
            let chunk = chunk?;
            dest.write_all(&chunk)
                .await
                .map_err(|e| dest_error("cannot write to pipe destination", e))?;
            total += chunk.len() as u64;
        }
        dest.shutdown()
            .await
            .map_err(|e| dest_error("cannot end pipe destination", e))?;
        tracing::debug!(pid = ?self.handle.id(), bytes = total, "piped command output");
        Ok(total)
    }

    /// Copy `src` into the process's stdin, then unpipe (closing stdin).
    pub async fn pipe_from<R>(&mut self, src: &mut R) -> Result<u64, Error>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = vec![0u8; PIPE_BUF_SIZE];
        let mut total = 0u64;
        loop {
            let n = src
                .read(&mut buf)
                .await
                .map_err(|e| sink_error("cannot read pipe source", e))?;
            if n == 0 {
                break;
            }
            self.write_all(&buf[..n])
                .await
                .map_err(|e| typed_io_error(Channel::Stdin, e))?;
            total += n as u64;
        }
        self.end().await?;
        Ok(total)
    }

    /// End the write side, closing the process's stdin.
    pub async fn end(&mut self) -> Result<(), Error> {
        self.shutdown()
            .await
            .map_err(|e| typed_io_error(Channel::Stdin, e))
    }

    /// Lazy line iterator over stdout. Consumes the read side.
    pub fn lines(&mut self) -> Lines<&mut Self> {
        Lines::new(self)
    }

    pub(crate) fn detach_reader(&mut self) -> Option<OutputReader> {
        match std::mem::replace(&mut self.reader, ReadSide::Detached) {
            ReadSide::Relay(reader) => Some(reader),
            other => {
                self.reader = other;
                None
            }
        }
    }

    fn on_output_end(&mut self) {
        self.handle.mark_output_ended();
        self.close_input();
    }

    /// Drop stdin without flushing; the process sees end of input.
    fn close_input(&mut self) {
        if matches!(self.writer, WriteSide::Open(_)) {
            self.writer = WriteSide::Ended;
        }
        self.handle.mark_input_closed();
    }
}

impl AsyncRead for CommandStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let reader = match &mut this.reader {
            ReadSide::Relay(reader) => reader,
            ReadSide::Detached => {
                return Poll::Ready(Err(Error::OutputConsumed {
                    channel: Channel::Stdout,
                }
                .into()))
            }
            ReadSide::Unavailable => return Poll::Ready(Ok(())),
        };
        ready!(Pin::new(&mut *reader).poll_read(cx, buf))?;
        if reader.is_done() {
            this.on_output_end();
        }
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for CommandStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.get_mut().writer {
            WriteSide::Open(sink) => Pin::new(sink).poll_write(cx, buf),
            WriteSide::Ended => Poll::Ready(Err(Error::WriteAfterEnd.into())),
            WriteSide::Unavailable => Poll::Ready(Err(Error::ChannelUnavailable {
                channel: Channel::Stdin,
            }
            .into())),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().writer {
            WriteSide::Open(sink) => Pin::new(sink).poll_flush(cx),
            WriteSide::Unavailable | WriteSide::Ended => Poll::Ready(Ok(())),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let result = match &mut this.writer {
            WriteSide::Open(sink) => ready!(Pin::new(sink).poll_shutdown(cx)),
            WriteSide::Unavailable | WriteSide::Ended => Ok(()),
        };
        // Closed even when shutdown failed: nothing more can be written.
        this.writer = WriteSide::Ended;
        this.handle.mark_input_closed();
        Poll::Ready(result)
    }
}

impl Drop for CommandStream {
    fn drop(&mut self) {
        self.close_input();
    }
}

impl std::fmt::Debug for CommandStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandStream")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Recover a typed [`Error`] from an `io::Error` produced by this crate.
pub(crate) fn typed_io_error(channel: Channel, e: io::Error) -> Error {
    if let Some(typed) = e.get_ref().and_then(|inner| inner.downcast_ref::<Error>()) {
        return typed.clone();
    }
    Error::channel(channel, e)
}

/// Keep typed errors raised by a destination from this crate (e.g. another
/// command's ended stdin); wrap anything else as a redirect failure.
fn dest_error(message: &str, source: io::Error) -> Error {
    match source.get_ref().and_then(|inner| inner.downcast_ref::<Error>()) {
        Some(typed) => typed.clone(),
        None => sink_error(message, source),
    }
}

fn sink_error(message: &str, source: io::Error) -> Error {
    Error::RedirectFailed {
        message: message.to_string(),
        source: std::sync::Arc::new(source),
    }
}
