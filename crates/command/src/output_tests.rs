// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::ScriptedReader;
use std::io;
use tempfile::TempDir;

fn capture(source: ScriptedReader) -> CommandOutput {
    CommandOutput::new(Channel::Stdout, Box::new(source))
}

#[tokio::test]
async fn text_concatenates_chunks() {
    let output = capture(ScriptedReader::new(["a", "b", "c"]));
    assert_eq!(output.text().await.unwrap(), "abc");
}

#[tokio::test]
async fn text_is_memoized() {
    let output = capture(ScriptedReader::new(["a", "b", "c"]));
    let first = (&output).await.unwrap();
    let second = (&output).await.unwrap();
    assert_eq!(first, "abc");
    assert_eq!(first, second);
}

#[yare::parameterized(
    trailing_newline = { &["hello\n"], "hello" },
    surrounding_whitespace = { &["  \n", "hi there", " \t\n"], "hi there" },
    inner_whitespace_kept = { &["a\n\nb\n"], "a\n\nb" },
    empty = { &[], "" },
)]
fn text_is_trimmed(chunks: &[&str], expected: &str) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let output = capture(ScriptedReader::new(chunks.iter().copied()));
        assert_eq!(output.text().await.unwrap(), expected);
    });
}

#[tokio::test]
async fn text_failure_is_memoized() {
    let output = capture(ScriptedReader::new(["partial"]).failing(io::ErrorKind::BrokenPipe));
    for _ in 0..2 {
        match output.text().await.unwrap_err() {
            Error::Channel { channel, source } => {
                assert_eq!(channel, Channel::Stdout);
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("expected channel error, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn redirect_writes_raw_bytes_to_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.txt");
    let output = CommandOutput::new(
        Channel::Stderr,
        Box::new(ScriptedReader::new(["  raw\n", "bytes  "])),
    );

    let written = output.redirect(&path).await.unwrap();
    assert_eq!(written, 13);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "  raw\nbytes  ");
}

#[tokio::test]
async fn redirect_to_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.txt");
    let output = capture(ScriptedReader::new(["x"]));
    let err = output.redirect(&path).await.unwrap_err();
    assert!(matches!(err, Error::RedirectFailed { .. }));
}

#[tokio::test]
async fn redirect_to_sink_propagates_source_errors() {
    let output = capture(ScriptedReader::new(["x"]).failing(io::ErrorKind::UnexpectedEof));
    let mut sink = Vec::new();
    let err = output.redirect_to(&mut sink).await.unwrap_err();
    assert!(matches!(err, Error::Channel { .. }));
    assert_eq!(sink, b"x");
}

#[tokio::test]
async fn redirect_after_text_is_rejected() {
    let output = capture(ScriptedReader::new(["done"]));
    assert_eq!(output.text().await.unwrap(), "done");
    let err = output.redirect_to(&mut Vec::new()).await.unwrap_err();
    assert!(matches!(
        err,
        Error::OutputConsumed {
            channel: Channel::Stdout
        }
    ));
}

#[tokio::test]
async fn lines_iterates_channel() {
    let output = capture(ScriptedReader::new(["one\ntw", "o\nthree"]));
    let lines = output.lines().unwrap().collect_lines().await.unwrap();
    assert_eq!(lines, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn cancelled_text_keeps_buffered_chunks() {
    let (mut tx, rx) = tokio::io::duplex(64);
    let output = CommandOutput::new(Channel::Stdout, Box::new(rx));

    tx.write_all(b"kept ").await.unwrap();
    // Give up before the channel ends; the chunk already read must survive.
    let early = tokio::time::timeout(std::time::Duration::from_millis(50), output.text()).await;
    assert!(early.is_err());

    tx.write_all(b"and more").await.unwrap();
    drop(tx);
    let mut sink = Vec::new();
    output.redirect_to(&mut sink).await.unwrap();
    assert_eq!(sink, b"kept and more");
}

#[test]
fn debug_reports_settlement() {
    let output = capture(ScriptedReader::new(["x"]));
    let debug = format!("{output:?}");
    assert!(debug.contains("Stdout"));
    assert!(debug.contains("settled: false"));
}
