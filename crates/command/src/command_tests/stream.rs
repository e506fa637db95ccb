// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the read and write sides of the stream.

use super::command;
use crate::test_support::FakeProcess;
use crate::{Channel, Error, StreamState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

// ---------------------------------------------------------------------------
// Read side
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_side_yields_every_chunk_in_order() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_chunks(["a", "bb", "ccc"]));
    let mut chunks = Vec::new();
    while let Some(chunk) = cmd.next_chunk().await {
        chunks.push(chunk.unwrap());
    }
    assert_eq!(chunks, vec![b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]);
    // End is reported once and stays reported.
    assert!(cmd.next_chunk().await.is_none());
}

#[tokio::test]
async fn async_read_to_end() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_chunks(["Hello, ", "world."]));
    let mut out = String::new();
    cmd.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "Hello, world.");
    assert_eq!(cmd.state(), StreamState::Ended);
}

#[tokio::test]
async fn relay_starts_before_anyone_reads() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_chunks(["early"]));
    tokio::task::yield_now().await;
    let mut out = Vec::new();
    cmd.read_to_end(&mut out).await.unwrap();
    assert_eq!(out, b"early");
}

#[tokio::test]
async fn missing_stdout_reads_as_empty() {
    let (mut cmd, _controls) = command(FakeProcess::new().no_stdout());
    let mut out = Vec::new();
    cmd.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
    assert!(cmd.stdout().is_none());
}

#[tokio::test]
async fn output_channel_error_surfaces_on_stream() {
    let reader = crate::test_support::ScriptedReader::new(["ok"])
        .failing(std::io::ErrorKind::ConnectionReset);
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_reader(reader));
    assert_eq!(cmd.next_chunk().await.unwrap().unwrap(), b"ok");
    match cmd.next_chunk().await.unwrap().unwrap_err() {
        Error::Channel { channel, source } => {
            assert_eq!(channel, Channel::Stdout);
            assert_eq!(source.kind(), std::io::ErrorKind::ConnectionReset);
        }
        other => panic!("expected channel error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Write side
// ---------------------------------------------------------------------------

#[tokio::test]
async fn writes_reach_process_stdin() {
    let (mut cmd, mut controls) = command(FakeProcess::new());
    cmd.write_all(b"line one\n").await.unwrap();
    cmd.write_all(b"line two\n").await.unwrap();
    cmd.end().await.unwrap();
    assert_eq!(controls.read_stdin().await.unwrap(), b"line one\nline two\n");
}

#[tokio::test]
async fn write_after_end_fails() {
    let (mut cmd, _controls) = command(FakeProcess::new());
    cmd.shutdown().await.unwrap();

    let err = cmd.write_all(b"late").await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    let typed = err.get_ref().and_then(|e| e.downcast_ref::<Error>());
    assert!(matches!(typed, Some(Error::WriteAfterEnd)));
}

#[tokio::test]
async fn ending_twice_is_harmless() {
    let (mut cmd, _controls) = command(FakeProcess::new());
    cmd.end().await.unwrap();
    cmd.end().await.unwrap();
    assert!(cmd.as_future().is_input_closed());
}

#[tokio::test]
async fn ending_write_side_closes_stdin() {
    let (mut cmd, mut controls) = command(FakeProcess::new());
    assert!(!cmd.as_future().is_input_closed());
    cmd.end().await.unwrap();
    assert!(cmd.as_future().is_input_closed());
    // The peer sees end of input.
    assert!(controls.read_stdin().await.unwrap().is_empty());
}

#[tokio::test]
async fn end_of_output_closes_stdin() {
    let (mut cmd, mut controls) = command(FakeProcess::new().stdout("done"));
    let mut out = Vec::new();
    cmd.read_to_end(&mut out).await.unwrap();
    assert!(cmd.as_future().is_input_closed());
    assert!(controls.read_stdin().await.unwrap().is_empty());
}

#[tokio::test]
async fn dropping_command_closes_stdin() {
    let (cmd, mut controls) = command(FakeProcess::new());
    let handle = cmd.as_future();
    drop(cmd);
    assert!(handle.is_input_closed());
    assert!(controls.read_stdin().await.unwrap().is_empty());
}

#[tokio::test]
async fn writing_without_stdin_is_rejected() {
    let (mut cmd, _controls) = command(FakeProcess::new().no_stdin());
    let err = cmd.write_all(b"x").await.unwrap_err();
    let typed = err.get_ref().and_then(|e| e.downcast_ref::<Error>());
    assert!(matches!(
        typed,
        Some(Error::ChannelUnavailable {
            channel: Channel::Stdin
        })
    ));
}

// ---------------------------------------------------------------------------
// Lines and state
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lines_iterates_stdout() {
    let (mut cmd, _controls) =
        command(FakeProcess::new().stdout_chunks(["alpha\nbe", "ta\r\ngamma"]));
    let lines = cmd.lines().collect_lines().await.unwrap();
    assert_eq!(lines, vec!["alpha", "beta", "gamma"]);
    assert!(cmd.next_chunk().await.is_none());
}

#[tokio::test]
async fn state_moves_from_open_to_destroyed() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("x"));
    assert_eq!(cmd.state(), StreamState::Open);

    let mut out = Vec::new();
    cmd.read_to_end(&mut out).await.unwrap();
    assert_eq!(cmd.state(), StreamState::Ended);

    (&cmd).await.unwrap();
    assert_eq!(cmd.state(), StreamState::Destroyed);
    assert!(cmd.is_destroyed());
}

#[tokio::test]
async fn identity_comes_from_process() {
    let (cmd, _controls) = command(FakeProcess::new().pid(77).display("cat notes.txt"));
    assert_eq!(cmd.id(), Some(77));
    assert_eq!(cmd.display(), "cat notes.txt");
    assert_eq!(cmd.as_future().to_string(), "cat notes.txt");
}
