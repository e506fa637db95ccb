// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background relay that drains an output channel into an unbounded chunk queue.
//!
//! The relay starts as soon as it is created and never waits for a reader,
//! so the process can always make progress and exit even when only its
//! result is awaited. Chunks keep emission order and end of stream is
//! signalled by closing the queue.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::sync::mpsc;

use crate::completion::Completion;
use crate::process::OutputSource;

type Chunk = io::Result<Vec<u8>>;

/// Read side of a relay: yields relayed chunks as an [`AsyncRead`].
pub struct OutputReader {
    rx: mpsc::UnboundedReceiver<Chunk>,
    /// Remainder of a chunk that did not fit the caller's buffer.
    partial: Vec<u8>,
    offset: usize,
    done: bool,
}

impl OutputReader {
    /// Start relaying `source` and return the reader for it.
    ///
    /// Relay I/O errors are delivered in-band and also reported to
    /// `completion`, which settles with them only if it is being awaited.
    pub(crate) fn spawn(
        source: OutputSource,
        chunk_size: usize,
        completion: Completion,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(relay(source, tx, chunk_size.max(1), completion));
        Self {
            rx,
            partial: Vec::new(),
            offset: 0,
            done: false,
        }
    }

    /// Whether end of stream has been delivered.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Poll the next chunk with its original boundaries, partial remainder first.
    pub(crate) fn poll_chunk(&mut self, cx: &mut Context<'_>) -> Poll<Option<Chunk>> {
        if self.offset < self.partial.len() {
            let rest = self.partial.split_off(self.offset);
            self.partial.clear();
            self.offset = 0;
            return Poll::Ready(Some(Ok(rest)));
        }
        if self.done {
            return Poll::Ready(None);
        }
        match ready!(self.rx.poll_recv(cx)) {
            Some(chunk) => Poll::Ready(Some(chunk)),
            None => {
                self.done = true;
                Poll::Ready(None)
            }
        }
    }
}

impl AsyncRead for OutputReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.offset >= this.partial.len() {
            match ready!(this.poll_chunk(cx)) {
                Some(Ok(chunk)) => {
                    this.partial = chunk;
                    this.offset = 0;
                }
                Some(Err(e)) => return Poll::Ready(Err(e)),
                None => return Poll::Ready(Ok(())),
            }
        }

        let available = &this.partial[this.offset..];
        let n = available.len().min(buf.remaining());
        buf.put_slice(&available[..n]);
        this.offset += n;
        Poll::Ready(Ok(()))
    }
}

impl std::fmt::Debug for OutputReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputReader")
            .field("buffered", &(self.partial.len() - self.offset))
            .field("done", &self.done)
            .finish()
    }
}

async fn relay(
    mut source: OutputSource,
    tx: mpsc::UnboundedSender<Chunk>,
    chunk_size: usize,
    completion: Completion,
) {
    let mut buf = vec![0u8; chunk_size];
    let mut relayed: u64 = 0;
    loop {
        match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                relayed += n as u64;
                tracing::trace!(bytes = n, "relay chunk");
                if tx.send(Ok(buf[..n].to_vec())).is_err() {
                    // Reader dropped; stop draining so the channel closes.
                    tracing::debug!(relayed, "relay reader dropped");
                    return;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, relayed, "output relay failed");
                let reported = io::Error::new(e.kind(), e.to_string());
                completion.report_channel_error(reported);
                let _ = tx.send(Err(e));
                return;
            }
        }
    }
    tracing::debug!(relayed, "relay reached end of output");
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
