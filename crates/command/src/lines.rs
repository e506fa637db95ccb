// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lazy line decoding over an output byte stream.
//!
//! Lines end at `\n`, `\r\n` or a lone `\r`. A `\r\n` pair split across two
//! chunks still counts as a single break. A trailing line without a
//! terminator is yielded when the stream ends. Invalid UTF-8 is replaced.

use std::io;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use futures_util::Stream;
use tokio::io::{AsyncRead, ReadBuf};

const READ_SIZE: usize = 8 * 1024;

/// Incremental line splitter with unbounded buffering.
///
/// Each byte is scanned for a line break once, however many chunks a
/// long line spans.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
    /// Start of the current line in `pending`.
    start: usize,
    /// Bytes before this offset hold no line break.
    scan_from: usize,
    /// The previous line ended in `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        if self.start > 0 {
            self.pending.drain(..self.start);
            self.scan_from = self.scan_from.saturating_sub(self.start);
            self.start = 0;
        }
        self.pending.extend_from_slice(chunk);
    }

    /// Pop the next complete line, if one is buffered.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        if self.skip_lf && self.start < self.pending.len() {
            if self.pending[self.start] == b'\n' {
                self.start += 1;
            }
            self.skip_lf = false;
        }

        let from = self.scan_from.max(self.start);
        let Some(found) = self.pending[from..]
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
        else {
            self.scan_from = self.pending.len();
            return None;
        };
        let end = from + found;
        self.skip_lf = self.pending[end] == b'\r';
        let line = String::from_utf8_lossy(&self.pending[self.start..end]).into_owned();
        self.start = end + 1;
        self.scan_from = self.start;
        Some(line)
    }

    /// Flush the unterminated remainder once the source has ended.
    pub(crate) fn finish(&mut self) -> Option<String> {
        let line = (self.start < self.pending.len())
            .then(|| String::from_utf8_lossy(&self.pending[self.start..]).into_owned());
        self.pending.clear();
        self.start = 0;
        self.scan_from = 0;
        line
    }
}

/// Stream of text lines decoded from an [`AsyncRead`].
///
/// Consumes its reader; not restartable.
pub struct Lines<R> {
    reader: R,
    buf: LineBuffer,
    chunk: Box<[u8]>,
    eof: bool,
}

impl<R: AsyncRead + Unpin> Lines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: LineBuffer::default(),
            chunk: vec![0; READ_SIZE].into_boxed_slice(),
            eof: false,
        }
    }

    /// Next line, or `None` once the reader is exhausted.
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        std::future::poll_fn(|cx| Pin::new(&mut *self).poll_next(cx))
            .await
            .transpose()
    }

    /// Collect every remaining line.
    pub async fn collect_lines(mut self) -> io::Result<Vec<String>> {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await? {
            lines.push(line);
        }
        Ok(lines)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead + Unpin> Stream for Lines<R> {
    type Item = io::Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(line) = this.buf.next_line() {
                return Poll::Ready(Some(Ok(line)));
            }
            if this.eof {
                return Poll::Ready(this.buf.finish().map(Ok));
            }

            let mut read_buf = ReadBuf::new(&mut this.chunk);
            if let Err(e) = ready!(Pin::new(&mut this.reader).poll_read(cx, &mut read_buf)) {
                return Poll::Ready(Some(Err(e)));
            }
            let filled = read_buf.filled();
            if filled.is_empty() {
                this.eof = true;
            } else {
                this.buf.push(filled);
            }
        }
    }
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;
