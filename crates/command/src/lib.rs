// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pipecmd: spawned processes as streams and awaitable results.
//!
//! A [`Command`] is an `AsyncRead + AsyncWrite` over the process's stdout
//! and stdin, and `&Command` is also a future resolving to the exit outcome:
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use pipecmd::Command;
//!
//! let mut cmd = Command::spawn("echo hello")?;
//! let mut out = Vec::new();
//! cmd.pipe_to(&mut out).await?;
//! let result = (&cmd).await?;
//! assert_eq!(result.status, 0);
//! assert_eq!(out, b"hello\n");
//! # Ok(())
//! # }
//! ```

mod builder;
mod command;
mod completion;
pub mod env;
mod error;
mod handle;
mod lines;
mod output;
pub mod process;
mod relay;
mod stream;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use builder::{CommandBuilder, StreamOptions};
pub use command::Command;
pub use error::{Channel, CommandError, Error};
pub use handle::{CommandHandle, CommandResult, StreamState};
pub use lines::Lines;
pub use output::CommandOutput;
pub use process::{ExitReason, ProcessHandle, ProcessParts};
pub use relay::OutputReader;
pub use stream::CommandStream;
