// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::io::AsyncReadExt;

#[yare::parameterized(
    success = { ExitReason::Code(0), Some(0), true },
    failure = { ExitReason::Code(3), Some(3), false },
    signal = { ExitReason::Signal(9), None, false },
    unknown = { ExitReason::Unknown, None, false },
)]
fn exit_reason_accessors(reason: ExitReason, code: Option<i32>, success: bool) {
    assert_eq!(reason.code(), code);
    assert_eq!(reason.success(), success);
}

#[test]
fn exit_reason_display() {
    assert_eq!(ExitReason::Code(1).to_string(), "exit code 1");
    assert_eq!(ExitReason::Signal(15).to_string(), "signal 15");
    assert_eq!(ExitReason::Unknown.to_string(), "unknown exit");
}

#[cfg(unix)]
#[test]
fn exit_reason_from_status() {
    use std::os::unix::process::ExitStatusExt;
    // Raw wait statuses: exit code lives in the high byte, signal in the low bits.
    assert_eq!(ExitReason::from(ExitStatus::from_raw(0)), ExitReason::Code(0));
    assert_eq!(ExitReason::from(ExitStatus::from_raw(2 << 8)), ExitReason::Code(2));
    assert_eq!(ExitReason::from(ExitStatus::from_raw(9)), ExitReason::Signal(9));
}

#[cfg(unix)]
#[tokio::test]
async fn from_child_takes_pipes_and_reports_exit() {
    let child = tokio::process::Command::new("sh")
        .arg("-c")
        .arg("echo out; exit 3")
        .stdout(std::process::Stdio::piped())
        .spawn()
        .unwrap();
    let mut handle = ProcessHandle::from_child(child, "sh -c 'echo out; exit 3'", None);
    assert!(handle.pid().is_some());
    assert!(handle.stdin.is_none());
    assert!(handle.stderr.is_none());

    let mut out = String::new();
    handle
        .stdout
        .take()
        .unwrap()
        .read_to_string(&mut out)
        .await
        .unwrap();
    assert_eq!(out, "out\n");
    assert_eq!(handle.exit.await.unwrap(), ExitReason::Code(3));
}

#[cfg(unix)]
#[tokio::test]
async fn from_child_kills_on_timeout() {
    let child = tokio::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .unwrap();
    let handle = ProcessHandle::from_child(child, "sleep 30", Some(Duration::from_millis(50)));
    let reason = handle.exit.await.unwrap();
    assert_eq!(reason, ExitReason::Signal(9));
}

#[test]
fn debug_lists_available_channels() {
    let handle = ProcessHandle::from_parts(ProcessParts {
        pid: Some(7),
        display: "true".to_string(),
        stdin: None,
        stdout: None,
        stderr: None,
        exit: Box::pin(async { Ok(ExitReason::Code(0)) }),
    });
    let debug = format!("{handle:?}");
    assert!(debug.contains("pid: Some(7)"));
    assert!(debug.contains("stdout: false"));
    assert_eq!(handle.display(), "true");
}
