// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output capture: buffer one output channel into a string, lines, or a sink.

use std::future::IntoFuture;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, OnceCell};

use crate::lines::Lines;
use crate::process::OutputSource;
use crate::{Channel, Error};

const READ_SIZE: usize = 8 * 1024;

/// Captures one output channel of a command.
///
/// Awaiting the capture drains the channel once and settles to its trimmed
/// text; later awaits return the same text without reading again. The
/// channel has a single consumer: `redirect_to` and `lines` take the capture
/// by value and fail with [`Error::OutputConsumed`] once the text has been
/// produced.
pub struct CommandOutput {
    channel: Channel,
    capture: Mutex<Capture>,
    text: OnceCell<Result<String, Error>>,
}

struct Capture {
    source: Option<OutputSource>,
    /// Chunks read so far; kept across a cancelled `text()` call.
    chunks: Vec<Vec<u8>>,
}

impl CommandOutput {
    pub fn new(channel: Channel, source: OutputSource) -> Self {
        Self {
            channel,
            capture: Mutex::new(Capture {
                source: Some(source),
                chunks: Vec::new(),
            }),
            text: OnceCell::new(),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The channel's full output as text, trimmed of surrounding whitespace.
    pub async fn text(&self) -> Result<String, Error> {
        self.text.get_or_init(|| self.drain()).await.clone()
    }

    /// Copy the raw channel into a file, creating or truncating it.
    pub async fn redirect(self, path: impl AsRef<Path>) -> Result<u64, Error> {
        let path = path.as_ref();
        let mut file =
            tokio::fs::File::create(path)
                .await
                .map_err(|source| Error::RedirectFailed {
                    message: format!("cannot open '{}' for writing", path.display()),
                    source: Arc::new(source),
                })?;
        self.redirect_to(&mut file).await
    }

    /// Copy the raw channel into `sink`; resolves once the sink has ended.
    pub async fn redirect_to<W>(self, sink: &mut W) -> Result<u64, Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let channel = self.channel;
        let mut source = self.into_source()?;
        let mut buf = vec![0u8; READ_SIZE];
        let mut total = 0u64;
        loop {
            let n = source
                .read(&mut buf)
                .await
                .map_err(|e| Error::channel(channel, e))?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n])
                .await
                .map_err(|e| write_error(channel, e))?;
            total += n as u64;
        }
        sink.shutdown().await.map_err(|e| write_error(channel, e))?;
        tracing::debug!(%channel, bytes = total, "redirected output");
        Ok(total)
    }

    /// Lazy line iterator over the channel.
    pub fn lines(self) -> Result<Lines<OutputSource>, Error> {
        Ok(Lines::new(self.into_source()?))
    }

    async fn drain(&self) -> Result<String, Error> {
        let mut capture = self.capture.lock().await;
        let Capture { source, chunks } = &mut *capture;
        let Some(reader) = source.as_mut() else {
            return Err(Error::OutputConsumed {
                channel: self.channel,
            });
        };

        let mut buf = vec![0u8; READ_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => chunks.push(buf[..n].to_vec()),
                Err(e) => {
                    *source = None;
                    tracing::warn!(channel = %self.channel, error = %e, "output capture failed");
                    return Err(Error::channel(self.channel, e));
                }
            }
        }
        *source = None;

        let bytes = chunks.concat();
        tracing::debug!(channel = %self.channel, bytes = bytes.len(), "output captured");
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    /// Take the channel, replaying anything a cancelled `text()` already read.
    fn into_source(self) -> Result<OutputSource, Error> {
        let channel = self.channel;
        let Capture { source, chunks } = self.capture.into_inner();
        let source = source.ok_or(Error::OutputConsumed { channel })?;
        if chunks.is_empty() {
            return Ok(source);
        }
        Ok(Box::new(Cursor::new(chunks.concat()).chain(source)))
    }
}

impl<'a> IntoFuture for &'a CommandOutput {
    type Output = Result<String, Error>;
    type IntoFuture = BoxFuture<'a, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.text())
    }
}

impl std::fmt::Debug for CommandOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandOutput")
            .field("channel", &self.channel)
            .field("settled", &self.text.initialized())
            .finish_non_exhaustive()
    }
}

fn write_error(channel: Channel, source: std::io::Error) -> Error {
    Error::RedirectFailed {
        message: format!("cannot write {channel} to sink"),
        source: Arc::new(source),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
