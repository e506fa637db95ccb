// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::FakeProcess;
use crate::Command;

#[yare::parameterized(
    write_after_end = { Error::WriteAfterEnd, io::ErrorKind::BrokenPipe },
    unavailable = { Error::ChannelUnavailable { channel: Channel::Stdin }, io::ErrorKind::NotConnected },
    consumed = { Error::OutputConsumed { channel: Channel::Stdout }, io::ErrorKind::NotConnected },
    channel = {
        Error::channel(Channel::Stderr, io::Error::new(io::ErrorKind::TimedOut, "slow")),
        io::ErrorKind::TimedOut
    },
)]
fn io_error_conversion_keeps_kind(err: Error, kind: io::ErrorKind) {
    let io_err: io::Error = err.into();
    assert_eq!(io_err.kind(), kind);
}

#[test]
fn io_error_conversion_keeps_typed_error() {
    let io_err: io::Error = Error::WriteAfterEnd.into();
    let inner = io_err.get_ref().and_then(|e| e.downcast_ref::<Error>());
    assert!(matches!(inner, Some(Error::WriteAfterEnd)));
}

#[yare::parameterized(
    stdin = { Channel::Stdin, "stdin" },
    stdout = { Channel::Stdout, "stdout" },
    stderr = { Channel::Stderr, "stderr" },
)]
fn channel_display(channel: Channel, expected: &str) {
    assert_eq!(channel.to_string(), expected);
}

#[test]
fn error_messages() {
    assert_eq!(Error::WriteAfterEnd.to_string(), "write after end");
    assert_eq!(
        Error::OutputConsumed {
            channel: Channel::Stdout
        }
        .to_string(),
        "stdout has already been consumed"
    );
}

#[tokio::test]
async fn command_error_messages_name_the_command() {
    let (process, _controls) = FakeProcess::new().display("make build").build();
    let cmd = Command::from_process(process);
    let handle = cmd.as_future();

    let failed = CommandError::Failed {
        status: 2,
        command: handle.clone(),
    };
    assert_eq!(
        failed.to_string(),
        "command failed: `make build` exited with status 2"
    );
    assert_eq!(failed.status(), Some(2));
    assert_eq!(failed.command(), &handle);

    let killed = CommandError::Terminated {
        signal: Some(9),
        command: handle.clone(),
    };
    assert_eq!(
        killed.to_string(),
        "command terminated: `make build` was killed by signal 9"
    );
    assert_eq!(killed.status(), None);

    let unknown = CommandError::Terminated {
        signal: None,
        command: handle,
    };
    assert_eq!(
        unknown.to_string(),
        "command terminated: `make build` was killed"
    );
}
