use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use flowd_core::{Actor, CoreError, Message, Params, Status, Value};

use crate::testutil::{collector, test_context};

use super::*;

fn rps_params(rps: i64) -> Params {
    let mut params = Params::new();
    params.insert("rps".into(), Value::from(rps));
    params
}

fn new_throttler(rps: i64) -> Arc<dyn Actor> {
    let (ctx, _failures) = test_context(1);
    Throttler::build("limit", ctx, &rps_params(rps)).unwrap()
}

#[test]
fn test_build_requires_rps() {
    let (ctx, _failures) = test_context(1);
    let err = Throttler::build("limit", ctx, &Params::new()).unwrap_err();
    assert!(matches!(err, CoreError::MissingParam { .. }));
}

#[test]
fn test_build_rejects_non_positive_rps() {
    let (ctx, _failures) = test_context(1);
    let err = Throttler::build("limit", ctx, &rps_params(0)).unwrap_err();
    assert!(matches!(err, CoreError::InvalidParam { .. }));
}

#[tokio::test]
async fn test_within_quota_passes_through() {
    let throttler = new_throttler(1000);
    let (peer, mut received) = collector("peer", Some(Status::Done));
    throttler.connect(1, peer).await.unwrap();
    throttler.start().await.unwrap();

    let msg = Message::new(b"quick");
    throttler.receive(msg.clone()).await.unwrap();
    let got = timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&got.body()[..], b"quick");
    let status = timeout(Duration::from_secs(5), msg.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    throttler.stop().await.unwrap();
}

#[tokio::test]
async fn test_over_quota_completes_throttled() {
    // Burst of one token: the second immediate message must be dropped.
    let throttler = new_throttler(1);
    let (peer, mut received) = collector("peer", Some(Status::Done));
    throttler.connect(1, peer).await.unwrap();
    throttler.start().await.unwrap();

    let first = Message::new(b"first");
    throttler.receive(first.clone()).await.unwrap();
    let status = timeout(Duration::from_secs(5), first.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    let second = Message::new(b"second");
    throttler.receive(second.clone()).await.unwrap();
    let status = timeout(Duration::from_secs(5), second.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Throttled);

    // Only the first made it downstream.
    let got = timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&got.body()[..], b"first");
    assert!(received.try_recv().is_err());

    throttler.stop().await.unwrap();
}
