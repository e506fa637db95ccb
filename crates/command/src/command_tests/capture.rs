// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for stdout/stderr captures taken from a command.

use super::command;
use crate::test_support::FakeProcess;
use crate::{Channel, Error};
use tokio::io::AsyncReadExt;

#[tokio::test]
async fn stdout_capture_yields_trimmed_text() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout_chunks(["  four", "two\n"]));
    let stdout = cmd.stdout().unwrap();
    assert_eq!(stdout.channel(), Channel::Stdout);
    assert_eq!(stdout.text().await.unwrap(), "fourtwo");
    assert_eq!((&stdout).await.unwrap(), "fourtwo");
}

#[tokio::test]
async fn stdout_capture_detaches_stream_reads() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("taken"));
    let _stdout = cmd.stdout().unwrap();

    assert!(cmd.stdout().is_none());
    assert!(matches!(
        cmd.next_chunk().await,
        Some(Err(Error::OutputConsumed {
            channel: Channel::Stdout
        }))
    ));

    let mut buf = Vec::new();
    let err = cmd.read_to_end(&mut buf).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotConnected);
}

#[tokio::test]
async fn stderr_capture_is_independent_of_stdout() {
    let (mut cmd, _controls) = command(
        FakeProcess::new()
            .stdout("out")
            .stderr_chunks(["warning: ", "disk almost full\n"]),
    );
    let stderr = cmd.stderr().unwrap();
    assert_eq!(stderr.channel(), Channel::Stderr);
    assert!(cmd.stderr().is_none());

    assert_eq!(stderr.text().await.unwrap(), "warning: disk almost full");

    let mut out = String::new();
    cmd.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "out");
}

#[tokio::test]
async fn missing_stderr_has_no_capture() {
    let (mut cmd, _controls) = command(FakeProcess::new().no_stderr());
    assert!(cmd.stderr().is_none());
}

#[tokio::test]
async fn into_stream_keeps_stdout() {
    let (cmd, _controls) = command(FakeProcess::new().stdout("kept").stderr("dropped"));
    let mut stream = cmd.into_stream();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    assert_eq!(out, b"kept");
}

#[tokio::test]
async fn capture_lines_after_stdout_detach() {
    let (mut cmd, _controls) = command(FakeProcess::new().stdout("one\ntwo\n"));
    let lines = cmd.stdout().unwrap().lines().unwrap();
    assert_eq!(lines.collect_lines().await.unwrap(), vec!["one", "two"]);
}
