// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the command stream, its deferred result and output captures.

use super::*;
use crate::test_support::{FakeControls, FakeProcess};

mod capture;
mod pipe;
mod spawn;
mod stream;
mod wait;

/// Wrap a fake process in a command.
pub(crate) fn command(fake: FakeProcess) -> (Command, FakeControls) {
    crate::test_support::init_tracing();
    let (process, controls) = fake.build();
    (Command::from_process(process), controls)
}
