// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::AtomicUsize;
use tokio::sync::oneshot;

fn counted(
    counter: Arc<AtomicUsize>,
    rx: oneshot::Receiver<io::Result<ExitReason>>,
) -> ExitNotification {
    Box::pin(async move {
        counter.fetch_add(1, Ordering::SeqCst);
        rx.await.unwrap_or_else(|_| Err(io::Error::other("dropped")))
    })
}

#[tokio::test]
async fn exit_is_not_observed_until_subscribed() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (_tx, rx) = oneshot::channel();
    let completion = Completion::new(counted(Arc::clone(&counter), rx));

    tokio::task::yield_now().await;
    assert_eq!(counter.load(Ordering::SeqCst), 0);
    assert!(!completion.is_subscribed());
    assert!(!completion.is_settled());
}

#[tokio::test]
async fn settles_once_for_every_consumer() {
    let counter = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel();
    let completion = Completion::new(counted(Arc::clone(&counter), rx));

    let first = tokio::spawn({
        let completion = completion.clone();
        async move { completion.settled().await }
    });
    let second = tokio::spawn({
        let completion = completion.clone();
        async move { completion.settled().await }
    });
    tx.send(Ok(ExitReason::Code(7))).unwrap();

    for handle in [first, second] {
        match handle.await.unwrap() {
            Settled::Exited(reason) => assert_eq!(reason, ExitReason::Code(7)),
            other => panic!("expected exit, got {other:?}"),
        }
    }
    assert!(matches!(
        completion.settled().await,
        Settled::Exited(ExitReason::Code(7))
    ));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn first_settlement_wins() {
    let (_tx, rx) = oneshot::channel();
    let completion = Completion::new(counted(Arc::new(AtomicUsize::new(0)), rx));

    assert!(completion.settle(Settled::Exited(ExitReason::Code(0))));
    assert!(!completion.settle(Settled::Exited(ExitReason::Code(1))));
    assert!(matches!(
        completion.settled().await,
        Settled::Exited(ExitReason::Code(0))
    ));
}

#[tokio::test]
async fn exit_wait_error_settles_as_failure() {
    let completion = Completion::new(Box::pin(async {
        Err(io::Error::new(io::ErrorKind::Interrupted, "wait failed"))
    }));
    match completion.settled().await {
        Settled::Failed(e) => assert_eq!(e.kind(), io::ErrorKind::Interrupted),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn channel_error_ignored_before_subscription() {
    let completion = Completion::new(Box::pin(async { Ok(ExitReason::Code(0)) }));
    completion.report_channel_error(io::Error::other("boom"));
    assert!(!completion.is_settled());
    assert!(matches!(
        completion.settled().await,
        Settled::Exited(ExitReason::Code(0))
    ));
}
