// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One-shot completion: turns a single exit notification into a settled value.
//!
//! The notification is taken at most once, on first subscription, and
//! driven by a background task. Settlement fills a watch slot only while it
//! is still empty, so the first outcome wins and every consumer observes it.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::process::{ExitNotification, ExitReason};

/// Terminal state of a completion.
#[derive(Debug, Clone)]
pub(crate) enum Settled {
    Exited(ExitReason),
    Failed(Arc<io::Error>),
}

#[derive(Clone)]
pub(crate) struct Completion {
    inner: Arc<Inner>,
}

struct Inner {
    exit: Mutex<Option<ExitNotification>>,
    subscribed: AtomicBool,
    slot: watch::Sender<Option<Settled>>,
}

impl Completion {
    pub(crate) fn new(exit: ExitNotification) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                exit: Mutex::new(Some(exit)),
                subscribed: AtomicBool::new(false),
                slot,
            }),
        }
    }

    /// Attach to the exit notification. Only the first call has an effect.
    pub(crate) fn subscribe(&self) {
        if self.inner.subscribed.swap(true, Ordering::AcqRel) {
            return;
        }
        let exit = self.inner.exit.lock().take();
        let completion = self.clone();
        tokio::spawn(async move {
            let settled = match exit {
                Some(exit) => match exit.await {
                    Ok(reason) => Settled::Exited(reason),
                    Err(e) => Settled::Failed(Arc::new(e)),
                },
                None => Settled::Failed(Arc::new(io::Error::other(
                    "exit notification already consumed",
                ))),
            };
            completion.settle(settled);
        });
    }

    /// Wait for the settled value, subscribing if nobody has yet.
    pub(crate) async fn settled(&self) -> Settled {
        self.subscribe();
        let mut rx = self.inner.slot.subscribe();
        let settled = match rx.wait_for(Option::is_some).await {
            Ok(value) => value.clone(),
            Err(_) => None,
        };
        settled.unwrap_or_else(|| {
            Settled::Failed(Arc::new(io::Error::other("completion dropped before settling")))
        })
    }

    /// Settle unless already settled. Returns whether this call won.
    pub(crate) fn settle(&self, settled: Settled) -> bool {
        let won = self.inner.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(settled);
            true
        });
        if won {
            let outcome = self.inner.slot.borrow().clone();
            tracing::debug!(?outcome, "completion settled");
        }
        won
    }

    /// Surface a channel error through the deferred result, but only when a
    /// consumer is already awaiting it.
    pub(crate) fn report_channel_error(&self, error: io::Error) {
        if self.is_subscribed() {
            self.settle(Settled::Failed(Arc::new(error)));
        }
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.inner.subscribed.load(Ordering::Acquire)
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.inner.slot.borrow().is_some()
    }
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod tests;
