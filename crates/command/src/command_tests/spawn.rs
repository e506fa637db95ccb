// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests that spawn real processes through the shell.

use std::time::Duration;

use crate::{Command, CommandError, Error, StreamOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use yare::parameterized;

#[tokio::test]
async fn spawn_echo_pipes_output() {
    let mut cmd = Command::spawn("echo 'Hello, world.'").unwrap();
    assert!(cmd.id().is_some());
    assert_eq!(cmd.display(), "echo 'Hello, world.'");

    let mut out = Vec::new();
    cmd.pipe_to(&mut out).await.unwrap();
    assert_eq!(out, b"Hello, world.\n");
    let result = (&cmd).await.unwrap();
    assert_eq!(result.status, 0);
    assert!(cmd.is_destroyed());
}

#[parameterized(
    false_builtin = { "false", 1 },
    explicit = { "exit 7", 7 },
    missing_program = { "definitely-not-a-real-program-xyz", 127 },
)]
#[test_macro(tokio::test)]
async fn nonzero_exit_rejects(line: &str, status: i32) {
    let cmd = Command::spawn(line).unwrap();
    let err = cmd.wait().await.unwrap_err();
    assert_eq!(err.status(), Some(status));
    assert_eq!(err.command().display(), line);
}

#[tokio::test]
async fn write_side_feeds_cat() {
    let mut cmd = Command::spawn("cat").unwrap();
    cmd.write_all(b"round\ntrip\n").await.unwrap();
    cmd.end().await.unwrap();

    let mut out = String::new();
    cmd.read_to_string(&mut out).await.unwrap();
    assert_eq!(out, "round\ntrip\n");
    assert_eq!(cmd.wait().await.unwrap().status, 0);
}

#[tokio::test]
async fn pipe_from_reaches_process() {
    let mut cmd = Command::spawn("wc -c").unwrap();
    let stdout = cmd.stdout().unwrap();
    cmd.pipe_from(&mut &b"twelve bytes"[..]).await.unwrap();
    assert_eq!(stdout.text().await.unwrap(), "12");
    cmd.wait().await.unwrap();
}

#[tokio::test]
async fn chained_processes() {
    let mut producer = Command::spawn("printf 'b\\na\\nc\\n'").unwrap();
    let mut consumer = Command::spawn("sort").unwrap();
    producer.pipe_to(consumer.as_stream()).await.unwrap();

    let lines = consumer.lines().collect_lines().await.unwrap();
    assert_eq!(lines, vec!["a", "b", "c"]);
    producer.wait().await.unwrap();
    consumer.wait().await.unwrap();
}

#[tokio::test]
async fn stderr_captured_separately() {
    let mut cmd = Command::spawn("echo visible; echo hidden >&2").unwrap();
    let stderr = cmd.stderr().unwrap();
    let stdout = cmd.stdout().unwrap();
    assert_eq!(stdout.text().await.unwrap(), "visible");
    assert_eq!(stderr.text().await.unwrap(), "hidden");
}

#[tokio::test]
async fn redirect_stdout_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let mut cmd = Command::spawn("printf 'saved'").unwrap();
    let written = cmd.stdout().unwrap().redirect(&path).await.unwrap();
    assert_eq!(written, 5);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "saved");
    cmd.wait().await.unwrap();
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[tokio::test]
async fn builder_sets_cwd() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("marker"), "").unwrap();
    let mut cmd = Command::builder("ls").cwd(dir.path()).spawn().unwrap();
    assert_eq!(cmd.stdout().unwrap().text().await.unwrap(), "marker");
}

#[tokio::test]
async fn builder_sets_env() {
    let mut cmd = Command::builder("echo \"$GREETING $TARGET\"")
        .env("GREETING", "hello")
        .envs([("TARGET", "world")])
        .spawn()
        .unwrap();
    assert_eq!(cmd.stdout().unwrap().text().await.unwrap(), "hello world");
}

#[tokio::test]
async fn builder_env_clear_drops_inherited() {
    let mut cmd = Command::builder("echo \"[$HOME][$KEEP]\"")
        .env("KEEP", "kept")
        .env_clear()
        .spawn()
        .unwrap();
    assert_eq!(cmd.stdout().unwrap().text().await.unwrap(), "[][kept]");
}

#[tokio::test]
async fn builder_timeout_kills_process() {
    let cmd = Command::builder("sleep 30")
        .timeout(Duration::from_millis(100))
        .spawn()
        .unwrap();
    let err = tokio::time::timeout(Duration::from_secs(10), cmd.wait())
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, CommandError::Terminated { .. }));
}

#[tokio::test]
async fn builder_stream_options_bound_chunks() {
    let mut cmd = Command::builder("printf 'abcdefghij'")
        .stream(StreamOptions { chunk_size: 4 })
        .spawn()
        .unwrap();
    let mut total = Vec::new();
    while let Some(chunk) = cmd.next_chunk().await {
        let chunk = chunk.unwrap();
        assert!(chunk.len() <= 4);
        total.extend(chunk);
    }
    assert_eq!(total, b"abcdefghij");
}

#[tokio::test]
async fn spawn_fails_for_missing_cwd() {
    let dir = tempfile::tempdir().unwrap();
    let err = Command::builder("true")
        .cwd(dir.path().join("missing"))
        .spawn()
        .unwrap_err();
    match err {
        Error::SpawnFailed { command, .. } => assert_eq!(command, "true"),
        other => panic!("expected spawn failure, got {other:?}"),
    }
}
