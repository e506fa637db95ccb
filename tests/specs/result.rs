// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Awaiting commands for their exit outcome.

use crate::prelude::*;

#[tokio::test]
async fn success_carries_the_command() {
    let cmd = sh("true");
    let result = (&cmd).await.unwrap();
    assert_eq!(result.status, 0);
    assert_eq!(result.command, cmd.as_future());
    assert_eq!(result.command.display(), "true");
}

#[tokio::test]
async fn failure_carries_status_and_command() {
    let cmd = sh("echo partial; exit 4");
    let err = (&cmd).await.unwrap_err();
    assert_eq!(err.status(), Some(4));
    assert_eq!(*err.command(), cmd.as_future());
    assert_eq!(
        err.to_string(),
        "command failed: `echo partial; exit 4` exited with status 4"
    );
}

#[tokio::test]
async fn repeated_awaits_agree() {
    let cmd = sh("exit 2");
    let first = cmd.wait().await.unwrap_err();
    let second = cmd.wait().await.unwrap_err();
    let third = cmd.as_future().await.unwrap_err();
    assert_eq!(first.status(), Some(2));
    assert_eq!(second.status(), first.status());
    assert_eq!(third.status(), first.status());
}

#[tokio::test]
async fn result_does_not_consume_output() {
    let mut cmd = sh("echo still here");
    cmd.wait().await.unwrap();
    assert_eq!(read_all(&mut cmd).await, b"still here\n");
}

#[tokio::test]
async fn handle_awaited_from_another_task() {
    let cmd = sh("sleep 0.1; exit 5");
    let handle = cmd.as_future();
    let joined = tokio::spawn(async move { handle.await }).await.unwrap();
    assert_eq!(joined.unwrap_err().status(), Some(5));
}

#[cfg(unix)]
#[tokio::test]
async fn killed_process_is_terminated() {
    let cmd = sh("kill -9 $$");
    let err = cmd.wait().await.unwrap_err();
    assert!(matches!(
        err,
        CommandError::Terminated {
            signal: Some(9),
            ..
        }
    ));
}

#[tokio::test]
async fn timeout_kills_long_running_command() {
    let cmd = Command::builder("sleep 30")
        .timeout(Duration::from_millis(50))
        .spawn()
        .unwrap();
    let err = tokio::time::timeout(Duration::from_secs(10), cmd.wait())
        .await
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, CommandError::Terminated { .. }));
}

#[tokio::test]
async fn awaiting_without_reading_large_output_resolves() {
    let cmd = sh("head -c 1048576 /dev/zero");
    let result = tokio::time::timeout(Duration::from_secs(10), cmd.wait())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.status, 0);
}
