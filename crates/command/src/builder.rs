// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawning front end: runs a command line through the platform shell.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use crate::process::ProcessHandle;
use crate::{env, Command, Error};

/// Tuning for the stdout relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamOptions {
    /// Maximum bytes read from stdout per chunk.
    pub chunk_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            chunk_size: env::chunk_size(),
        }
    }
}

/// Builder for spawning a [`Command`] from a command line.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    command_line: String,
    cwd: Option<PathBuf>,
    env: Vec<(String, String)>,
    env_clear: bool,
    timeout: Option<Duration>,
    stream: StreamOptions,
}

impl CommandBuilder {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self {
            command_line: command_line.into(),
            cwd: None,
            env: Vec::new(),
            env_clear: false,
            timeout: env::default_timeout(),
            stream: StreamOptions::default(),
        }
    }

    /// Set the working directory.
    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    /// Set a single environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Set multiple environment variables.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Start from an empty environment instead of inheriting this process's.
    pub fn env_clear(mut self) -> Self {
        self.env_clear = true;
        self
    }

    /// Kill the process if it is still running after `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn stream(mut self, options: StreamOptions) -> Self {
        self.stream = options;
        self
    }

    /// Spawn the command with all three channels piped.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> Result<Command, Error> {
        let span = tracing::info_span!(
            "command.spawn",
            cmd = %self.command_line,
            pid = tracing::field::Empty,
        );
        let _guard = span.enter();

        let mut process = tokio::process::Command::new(env::shell());
        process.arg(env::shell_flag()).arg(&self.command_line);
        if let Some(cwd) = &self.cwd {
            process.current_dir(cwd);
        }
        if self.env_clear {
            process.env_clear();
        }
        process.envs(self.env.iter().map(|(k, v)| (k, v)));
        process.stdin(Stdio::piped());
        process.stdout(Stdio::piped());
        process.stderr(Stdio::piped());

        let child = process.spawn().map_err(|source| Error::SpawnFailed {
            command: self.command_line.clone(),
            source: Arc::new(source),
        })?;
        if let Some(pid) = child.id() {
            span.record("pid", pid);
        }
        tracing::info!(timeout = ?self.timeout, "command spawned");

        let handle = ProcessHandle::from_child(child, self.command_line, self.timeout);
        Ok(Command::from_process_with(handle, self.stream))
    }
}
