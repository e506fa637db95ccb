// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Piping bytes through chains of processes.

use crate::prelude::*;

#[tokio::test]
async fn hello_world_through_cat() {
    let mut echo = sh("echo 'Hello, world.'");
    let mut cat = sh("cat");

    echo.pipe_to(cat.as_stream()).await.unwrap();
    let out = read_all(&mut cat).await;
    assert_eq!(out, b"Hello, world.\n");

    assert_eq!((&echo).await.unwrap().status, 0);
    assert_eq!((&cat).await.unwrap().status, 0);
    assert!(echo.is_destroyed());
    assert!(cat.is_destroyed());
}

#[tokio::test]
async fn three_stage_pipeline() {
    let mut source = sh("printf 'pear\\napple\\npear\\nfig\\n'");
    let mut sort = sh("sort");
    let mut uniq = sh("uniq -c");

    // `sort` emits nothing until its input ends, so the stages run in turn.
    source.pipe_to(sort.as_stream()).await.unwrap();
    sort.pipe_to(uniq.as_stream()).await.unwrap();

    let lines = uniq.lines().collect_lines().await.unwrap();
    let counts: Vec<String> = lines
        .iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    assert_eq!(counts, vec!["1 apple", "1 fig", "2 pear"]);

    for cmd in [&source, &sort, &uniq] {
        cmd.wait().await.unwrap();
    }
}

#[tokio::test]
async fn large_output_survives_back_pressure() {
    let mut producer = sh("seq 1 20000");
    let mut out = Vec::new();
    producer.pipe_to(&mut out).await.unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 20000);
    assert_eq!(text.lines().last(), Some("20000"));
    producer.wait().await.unwrap();
}

#[tokio::test]
async fn writes_reach_process_in_order() {
    let mut cat = sh("cat");
    for i in 0..100 {
        cat.write_all(format!("{i}\n").as_bytes()).await.unwrap();
    }
    cat.end().await.unwrap();

    let out = String::from_utf8(read_all(&mut cat).await).unwrap();
    let expected: String = (0..100).map(|i| format!("{i}\n")).collect();
    assert_eq!(out, expected);
}

#[tokio::test]
async fn write_after_end_is_an_error() {
    let mut cat = sh("cat");
    cat.end().await.unwrap();
    let err = cat.write_all(b"late").await.unwrap_err();
    let typed = err.get_ref().and_then(|e| e.downcast_ref::<Error>());
    assert!(matches!(typed, Some(Error::WriteAfterEnd)));
}

#[tokio::test]
async fn ending_input_lets_reader_finish() {
    // `cat` only exits once its stdin is closed.
    let mut cat = sh("cat");
    cat.pipe_from(&mut &b"from a reader"[..]).await.unwrap();
    assert_eq!(cat.state(), StreamState::Ended);
    assert_eq!(read_all(&mut cat).await, b"from a reader");
    tokio::time::timeout(Duration::from_secs(10), cat.wait())
        .await
        .unwrap()
        .unwrap();
}
