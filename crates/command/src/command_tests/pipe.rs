// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for piping a command into sinks and from sources.

use super::command;
use crate::test_support::{FakeProcess, ScriptedReader};
use crate::{Error, StreamState};
use tokio::io::AsyncWriteExt;

#[tokio::test]
async fn pipe_to_delivers_exact_bytes_then_resolves() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_chunks(["Hello", ", ", "world."]));
    let mut sink = Vec::new();
    let written = cmd.pipe_to(&mut sink).await.unwrap();
    assert_eq!(written, 13);
    assert_eq!(sink, b"Hello, world.");

    let result = (&cmd).await.unwrap();
    assert_eq!(result.status, 0);
    assert_eq!(result.command, cmd.as_future());
    assert!(cmd.is_destroyed());
}

#[tokio::test]
async fn pipe_to_ends_destination() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("payload"));
    let (mut dest, mut peer) = tokio::io::duplex(64);
    cmd.pipe_to(&mut dest).await.unwrap();

    let mut received = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut peer, &mut received)
        .await
        .unwrap();
    assert_eq!(received, b"payload");
}

#[tokio::test]
async fn pipe_to_stops_on_relay_error() {
    let reader = ScriptedReader::new(["partial"]).failing(std::io::ErrorKind::BrokenPipe);
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_reader(reader));
    let mut sink = Vec::new();
    let err = cmd.pipe_to(&mut sink).await.unwrap_err();
    assert!(matches!(err, Error::Channel { .. }));
    assert_eq!(sink, b"partial");
}

#[tokio::test]
async fn pipe_to_ended_command_keeps_typed_error() {
    let (mut upstream, _up) = command(FakeProcess::new().stdout("late data"));
    let (mut downstream, _down) = command(FakeProcess::new());
    downstream.end().await.unwrap();

    let err = upstream.pipe_to(&mut downstream).await.unwrap_err();
    assert!(matches!(err, Error::WriteAfterEnd));
}

#[tokio::test]
async fn pipe_to_foreign_sink_error_is_redirect_failure() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("data"));
    let (mut dest, peer) = tokio::io::duplex(64);
    drop(peer);

    let err = cmd.pipe_to(&mut dest).await.unwrap_err();
    assert!(matches!(err, Error::RedirectFailed { .. }));
}

#[tokio::test]
async fn pipe_to_after_capture_fails() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("x"));
    let _stdout = cmd.stdout();
    let err = cmd.pipe_to(&mut Vec::new()).await.unwrap_err();
    assert!(matches!(err, Error::OutputConsumed { .. }));
}

#[tokio::test]
async fn pipe_from_feeds_stdin_and_closes_it() {
    let (mut cmd, mut controls) = command(FakeProcess::new());
    let mut src = ScriptedReader::new(["first ", "second"]);
    let read = cmd.pipe_from(&mut src).await.unwrap();
    assert_eq!(read, 12);
    assert!(cmd.as_future().is_input_closed());
    assert_eq!(controls.read_stdin().await.unwrap(), b"first second");
}

#[tokio::test]
async fn pipe_from_then_write_is_rejected() {
    let (mut cmd, _controls) = command(FakeProcess::new());
    cmd.pipe_from(&mut &b"data"[..]).await.unwrap();
    let err = cmd.write_all(b"more").await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
}

#[tokio::test]
async fn pipe_from_without_stdin_reports_channel() {
    let (mut cmd, _controls) = command(FakeProcess::new().no_stdin());
    let err = cmd.pipe_from(&mut &b"data"[..]).await.unwrap_err();
    assert!(matches!(err, Error::ChannelUnavailable { .. }));
}

#[tokio::test]
async fn chained_commands_pass_output_along() {
    let (mut upstream, _up) = command(FakeProcess::new().display("producer").stdout("a\nb\n"));
    let (mut downstream, mut down) = command(FakeProcess::new().display("consumer"));

    upstream.pipe_to(downstream.as_stream()).await.unwrap();
    assert_eq!(downstream.state(), StreamState::Ended);
    assert_eq!(down.read_stdin().await.unwrap(), b"a\nb\n");

    assert_eq!(upstream.wait().await.unwrap().command.display(), "producer");
    assert_eq!(downstream.wait().await.unwrap().command.display(), "consumer");
}
