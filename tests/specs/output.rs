// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capturing stdout and stderr.

use crate::prelude::*;

#[tokio::test]
async fn stdout_text_is_trimmed() {
    let mut cmd = sh("printf '\\n  padded output \\n\\n'");
    let stdout = cmd.stdout().unwrap();
    assert_eq!(stdout.text().await.unwrap(), "padded output");
    // Memoized: awaiting again does not read again.
    assert_eq!((&stdout).await.unwrap(), "padded output");
}

#[tokio::test]
async fn stderr_and_stdout_are_separate() {
    let mut cmd = sh("echo to-out; echo to-err >&2; exit 1");
    let stdout = cmd.stdout().unwrap();
    let stderr = cmd.stderr().unwrap();
    let (out, err) = tokio::join!(stdout.text(), stderr.text());
    assert_eq!(out.unwrap(), "to-out");
    assert_eq!(err.unwrap(), "to-err");
    assert_eq!(cmd.wait().await.unwrap_err().status(), Some(1));
}

#[tokio::test]
async fn stdout_lines_are_lazy() {
    let mut cmd = sh("printf 'one\\r\\ntwo\\nthree'");
    let mut lines = cmd.stdout().unwrap().lines().unwrap();
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("one"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("two"));
    assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("three"));
    assert_eq!(lines.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn redirect_writes_raw_output_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listing.txt");
    let mut cmd = sh("printf '  keep whitespace  \\n'");
    let bytes = cmd.stdout().unwrap().redirect(&path).await.unwrap();
    assert_eq!(bytes, 20);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "  keep whitespace  \n"
    );
}

#[tokio::test]
async fn redirect_to_unwritable_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = sh("echo nowhere");
    let err = cmd
        .stdout()
        .unwrap()
        .redirect(dir.path().join("missing/out.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::RedirectFailed { .. }));
}

#[tokio::test]
async fn stdout_capture_can_be_taken_once() {
    let mut cmd = sh("echo once");
    assert!(cmd.stdout().is_some());
    assert!(cmd.stdout().is_none());
    assert!(matches!(
        cmd.next_chunk().await,
        Some(Err(Error::OutputConsumed { .. }))
    ));
}

#[tokio::test]
async fn chunk_stream_collects_with_stream_ext() {
    use futures_util::StreamExt;

    let mut cmd = sh("printf 'a\\nb\\n'");
    let lines: Vec<String> = cmd
        .lines()
        .map(|line| line.unwrap())
        .collect()
        .await;
    assert_eq!(lines, vec!["a", "b"]);
}
