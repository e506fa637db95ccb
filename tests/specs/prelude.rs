// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the end-to-end specs.

pub use pipecmd::{Command, CommandError, Error, StreamState};
pub use std::time::Duration;
pub use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Spawn `line` through the shell with tracing installed.
pub fn sh(line: &str) -> Command {
    pipecmd::test_support::init_tracing();
    match Command::spawn(line) {
        Ok(cmd) => cmd,
        Err(e) => panic!("failed to spawn `{line}`: {e}"),
    }
}

/// Collect every stdout chunk of `cmd` into one buffer.
pub async fn read_all(cmd: &mut Command) -> Vec<u8> {
    let mut out = Vec::new();
    cmd.read_to_end(&mut out).await.unwrap();
    out
}
