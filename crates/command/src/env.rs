// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.

use std::time::Duration;

/// Default relay read size in bytes
const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Shell used to run command lines: PIPECMD_SHELL > platform default
pub fn shell() -> String {
    if let Ok(shell) = std::env::var("PIPECMD_SHELL") {
        if !shell.is_empty() {
            return shell;
        }
    }
    if cfg!(windows) {
        "cmd".to_string()
    } else {
        "sh".to_string()
    }
}

/// Flag passing a command line to the shell.
pub fn shell_flag() -> &'static str {
    if cfg!(windows) {
        "/C"
    } else {
        "-c"
    }
}

/// Default spawn timeout (unset means no timeout)
pub fn default_timeout() -> Option<Duration> {
    std::env::var("PIPECMD_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
}

/// Relay read size (default 8 KiB, configurable via `PIPECMD_CHUNK_SIZE`).
pub fn chunk_size() -> usize {
    std::env::var("PIPECMD_CHUNK_SIZE")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CHUNK_SIZE)
}
