// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the deferred result of a command.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use super::command;
use crate::test_support::{FakeProcess, ScriptedReader};
use crate::{CommandError, ExitReason};
use futures_util::future::join_all;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};
use tokio::sync::oneshot;
use yare::parameterized;

/// Stdout that stays silent until released, then fails.
struct FailOnSignal {
    release: oneshot::Receiver<()>,
}

impl AsyncRead for FailOnSignal {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match Pin::new(&mut self.release).poll(cx) {
            Poll::Ready(_) => Poll::Ready(Err(std::io::Error::other("stdout pipe reset"))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[tokio::test]
async fn zero_status_resolves_with_own_handle() {
    let (cmd, _controls) = command(FakeProcess::new());
    let result = cmd.wait().await.unwrap();
    assert_eq!(result.status, 0);
    assert_eq!(result.command, cmd.as_future());
}

#[parameterized(
    one = { 1 },
    two = { 2 },
    not_found = { 127 },
)]
#[test_macro(tokio::test)]
async fn nonzero_status_rejects(status: i32) {
    let (cmd, _controls) = command(FakeProcess::new().display("make build").status(status));
    let err = (&cmd).await.unwrap_err();
    match &err {
        CommandError::Failed { status: s, command } => {
            assert_eq!(*s, status);
            assert_eq!(*command, cmd.as_future());
        }
        other => panic!("expected failed, got {other:?}"),
    }
    assert_eq!(err.status(), Some(status));
    assert_eq!(
        err.to_string(),
        format!("command failed: `make build` exited with status {status}")
    );
}

#[tokio::test]
async fn signal_rejects_as_terminated() {
    let (cmd, _controls) = command(FakeProcess::new().signal(15));
    let err = cmd.wait().await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Terminated {
            signal: Some(15),
            ..
        }
    ));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn unknown_exit_rejects_as_terminated() {
    let (cmd, mut controls) = command(FakeProcess::new().manual_exit());
    let waiter = tokio::spawn(cmd.wait());
    tokio::task::yield_now().await;
    assert!(controls.exit(ExitReason::Unknown));
    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(err, CommandError::Terminated { signal: None, .. }));
}

#[tokio::test]
async fn exit_wait_error_rejects_as_channel() {
    let (cmd, _controls) =
        command(FakeProcess::new().exit_error(std::io::ErrorKind::PermissionDenied));
    let err = cmd.wait().await.unwrap_err();
    match err {
        CommandError::Channel { source, command } => {
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
            assert_eq!(command, cmd.as_future());
        }
        other => panic!("expected channel error, got {other:?}"),
    }
}

#[tokio::test]
async fn awaiting_twice_subscribes_once() {
    let (cmd, controls) = command(FakeProcess::new().status(3));
    let first = (&cmd).await.unwrap_err();
    let second = (&cmd).await.unwrap_err();
    assert_eq!(first.status(), Some(3));
    assert_eq!(second.status(), Some(3));
    assert_eq!(first.command(), second.command());
    assert_eq!(controls.exit_waits(), 1);
}

#[tokio::test]
async fn concurrent_waiters_share_one_outcome() {
    let (cmd, mut controls) = command(FakeProcess::new().manual_exit());
    let waiters: Vec<_> = (0..4).map(|_| tokio::spawn(cmd.wait())).collect();
    tokio::task::yield_now().await;
    assert!(controls.exit(ExitReason::Code(0)));

    for joined in join_all(waiters).await {
        assert_eq!(joined.unwrap().unwrap().status, 0);
    }
    assert_eq!(controls.exit_waits(), 1);
}

#[tokio::test]
async fn exit_not_observed_until_awaited() {
    let (cmd, controls) = command(FakeProcess::new());
    tokio::task::yield_now().await;
    assert_eq!(controls.exit_waits(), 0);
    assert!(!cmd.as_future().is_settled());

    cmd.wait().await.unwrap();
    assert!(cmd.as_future().is_settled());
}

#[tokio::test]
async fn pending_until_process_exits() {
    let (cmd, mut controls) = command(FakeProcess::new().manual_exit());
    let pending = tokio::time::timeout(Duration::from_millis(20), cmd.wait()).await;
    assert!(pending.is_err());

    controls.exit(ExitReason::Code(0));
    // The subscription made by the cancelled wait still delivers.
    assert_eq!(cmd.wait().await.unwrap().status, 0);
    assert_eq!(controls.exit_waits(), 1);
}

#[tokio::test]
async fn handle_outlives_command() {
    let (cmd, _controls) = command(FakeProcess::new().stdout("ignored"));
    let handle = cmd.as_future();
    drop(cmd);
    assert_eq!(handle.await.unwrap().status, 0);
}

#[tokio::test]
async fn relay_error_rejects_awaited_result() {
    let (release, rx) = oneshot::channel();
    let (mut cmd, mut controls) = command(
        FakeProcess::new()
            .stdout_reader(FailOnSignal { release: rx })
            .manual_exit(),
    );
    let waiter = tokio::spawn(cmd.wait());
    tokio::task::yield_now().await;
    release.send(()).unwrap();

    let mut out = Vec::new();
    assert!(cmd.read_to_end(&mut out).await.is_err());
    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(err, CommandError::Channel { .. }));

    // The late exit does not replace the first outcome.
    controls.exit(ExitReason::Code(0));
    assert!(matches!(cmd.wait().await, Err(CommandError::Channel { .. })));
}

#[tokio::test]
async fn relay_error_ignored_when_not_awaited() {
    let reader = ScriptedReader::new(["x"]).failing(std::io::ErrorKind::Other);
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_reader(reader));

    let mut out = Vec::new();
    assert!(cmd.read_to_end(&mut out).await.is_err());
    assert_eq!(cmd.wait().await.unwrap().status, 0);
}

#[tokio::test]
async fn destroyed_once_everything_finished() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("Hello, world."));
    let mut sink = Vec::new();
    cmd.pipe_to(&mut sink).await.unwrap();
    assert!(!cmd.is_destroyed());

    (&cmd).await.unwrap();
    assert!(cmd.is_destroyed());
    assert_eq!(sink, b"Hello, world.");
}
