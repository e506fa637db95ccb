// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, DuplexStream, ReadBuf};
use tokio::sync::oneshot;

use crate::process::{ExitNotification, InputSink, OutputSource, ProcessParts};
use crate::{ExitReason, ProcessHandle};

/// Install a test-writer tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Scripted output channel ─────────────────────────────────────────────────

/// Reader that yields pre-recorded chunks, then EOF or an error.
pub struct ScriptedReader {
    chunks: VecDeque<Vec<u8>>,
    error: Option<io::ErrorKind>,
}

impl ScriptedReader {
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            error: None,
        }
    }

    /// Fail with `kind` after the chunks instead of reaching EOF.
    pub fn failing(mut self, kind: io::ErrorKind) -> Self {
        self.error = Some(kind);
        self
    }
}

impl AsyncRead for ScriptedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        match this.chunks.pop_front() {
            Some(mut chunk) => {
                let n = chunk.len().min(buf.remaining());
                buf.put_slice(&chunk[..n]);
                if n < chunk.len() {
                    this.chunks.push_front(chunk.split_off(n));
                }
                Poll::Ready(Ok(()))
            }
            None => match this.error.take() {
                Some(kind) => Poll::Ready(Err(io::Error::new(kind, "scripted failure"))),
                None => Poll::Ready(Ok(())),
            },
        }
    }
}

// ── Fake process ────────────────────────────────────────────────────────────

enum FakeExit {
    Immediate(io::Result<ExitReason>),
    Manual,
}

/// Builder for an in-memory [`ProcessHandle`].
///
/// Output is scripted, stdin is a duplex pipe observable through
/// [`FakeControls::read_stdin`], and the exit can be immediate or released
/// by hand.
pub struct FakeProcess {
    pid: Option<u32>,
    display: String,
    stdin: bool,
    stdout: Option<OutputSource>,
    stderr: Option<OutputSource>,
    exit: FakeExit,
}

/// Test-side handles for a [`FakeProcess`].
pub struct FakeControls {
    stdin: Option<DuplexStream>,
    exit_tx: Option<oneshot::Sender<io::Result<ExitReason>>>,
    exit_waits: Arc<AtomicUsize>,
}

impl Default for FakeProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProcess {
    pub fn new() -> Self {
        Self {
            pid: Some(4242),
            display: "fake".to_string(),
            stdin: true,
            stdout: Some(Box::new(ScriptedReader::new(Vec::<Vec<u8>>::new()))),
            stderr: Some(Box::new(ScriptedReader::new(Vec::<Vec<u8>>::new()))),
            exit: FakeExit::Immediate(Ok(ExitReason::Code(0))),
        }
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    pub fn display(mut self, display: impl Into<String>) -> Self {
        self.display = display.into();
        self
    }

    /// Emit `text` on stdout as a single chunk.
    pub fn stdout(self, text: &str) -> Self {
        self.stdout_chunks([text])
    }

    pub fn stdout_chunks<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        self.stdout = Some(Box::new(ScriptedReader::new(chunks)));
        self
    }

    /// Use any reader as stdout.
    pub fn stdout_reader(mut self, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.stdout = Some(Box::new(reader));
        self
    }

    pub fn stderr(self, text: &str) -> Self {
        self.stderr_chunks([text])
    }

    pub fn stderr_chunks<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        self.stderr = Some(Box::new(ScriptedReader::new(chunks)));
        self
    }

    pub fn no_stdin(mut self) -> Self {
        self.stdin = false;
        self
    }

    pub fn no_stdout(mut self) -> Self {
        self.stdout = None;
        self
    }

    pub fn no_stderr(mut self) -> Self {
        self.stderr = None;
        self
    }

    /// Exit with `code` as soon as the exit is observed.
    pub fn status(mut self, code: i32) -> Self {
        self.exit = FakeExit::Immediate(Ok(ExitReason::Code(code)));
        self
    }

    pub fn signal(mut self, signal: i32) -> Self {
        self.exit = FakeExit::Immediate(Ok(ExitReason::Signal(signal)));
        self
    }

    pub fn exit_error(mut self, kind: io::ErrorKind) -> Self {
        self.exit = FakeExit::Immediate(Err(io::Error::new(kind, "scripted exit failure")));
        self
    }

    /// Hold the exit until [`FakeControls::exit`] is called.
    pub fn manual_exit(mut self) -> Self {
        self.exit = FakeExit::Manual;
        self
    }

    pub fn build(self) -> (ProcessHandle, FakeControls) {
        let exit_waits = Arc::new(AtomicUsize::new(0));

        let (stdin, stdin_peer) = if self.stdin {
            let (ours, theirs) = tokio::io::duplex(64 * 1024);
            (Some(Box::new(ours) as InputSink), Some(theirs))
        } else {
            (None, None)
        };

        let waits = Arc::clone(&exit_waits);
        let mut exit_tx = None;
        let exit: ExitNotification = match self.exit {
            FakeExit::Immediate(result) => Box::pin(async move {
                waits.fetch_add(1, Ordering::SeqCst);
                result
            }),
            FakeExit::Manual => {
                let (tx, rx) = oneshot::channel();
                exit_tx = Some(tx);
                Box::pin(async move {
                    waits.fetch_add(1, Ordering::SeqCst);
                    rx.await
                        .unwrap_or_else(|_| Err(io::Error::other("fake exit dropped")))
                })
            }
        };

        let handle = ProcessHandle::from_parts(ProcessParts {
            pid: self.pid,
            display: self.display,
            stdin,
            stdout: self.stdout,
            stderr: self.stderr,
            exit,
        });
        let controls = FakeControls {
            stdin: stdin_peer,
            exit_tx,
            exit_waits,
        };
        (handle, controls)
    }
}

impl FakeControls {
    /// Release a manual exit. Returns false if already released.
    pub fn exit(&mut self, reason: ExitReason) -> bool {
        match self.exit_tx.take() {
            Some(tx) => tx.send(Ok(reason)).is_ok(),
            None => false,
        }
    }

    /// How many times the exit notification has been awaited.
    pub fn exit_waits(&self) -> usize {
        self.exit_waits.load(Ordering::SeqCst)
    }

    /// Read everything written to stdin until the command closes it.
    pub async fn read_stdin(&mut self) -> io::Result<Vec<u8>> {
        let mut data = Vec::new();
        if let Some(peer) = self.stdin.as_mut() {
            peer.read_to_end(&mut data).await?;
        }
        Ok(data)
    }
}
