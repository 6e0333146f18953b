//! Outbound link tests

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use flowd_core::{Actor, CoreError, Message, Status};

use crate::testutil::collector;

use super::*;

#[tokio::test]
async fn test_dispatch_without_peers_is_unroutable() {
    let out = Outbound::new("orphan", 8);
    let msg = Message::new(b"x");

    out.dispatch(msg.clone()).await.unwrap();

    // Completed inline, never blocks.
    assert_eq!(msg.status(), Status::Unroutable);
}

#[tokio::test]
async fn test_single_peer_receives_original() {
    let out = Outbound::new("src", 8);
    let (peer, mut received) = collector("dst", Some(Status::Done));
    out.connect(1, peer);

    let msg = Message::new(b"payload");
    out.dispatch(msg.clone()).await.unwrap();

    let status = timeout(Duration::from_secs(1), msg.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    let delivered = received.recv().await.unwrap();
    assert_eq!(delivered.body().as_ref(), b"payload");
}

#[tokio::test]
async fn test_multi_peer_dispatch_sends_copies() {
    let out = Outbound::new("src", 8);
    let (peer_a, mut recv_a) = collector("a", Some(Status::Done));
    let (peer_b, mut recv_b) = collector("b", Some(Status::Done));
    out.connect(1, peer_a);
    out.connect(1, peer_b);

    let msg = Message::new(b"payload");
    msg.set_meta("sendto", "a");
    out.dispatch(msg.clone()).await.unwrap();

    // All enqueues succeeded, so the original is Done.
    let status = timeout(Duration::from_secs(1), msg.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    // Each peer got its own copy carrying the metadata.
    let copy_a = recv_a.recv().await.unwrap();
    let copy_b = recv_b.recv().await.unwrap();
    assert_eq!(copy_a.meta("sendto").unwrap().as_str(), Some("a"));
    assert_eq!(copy_b.body().as_ref(), b"payload");
}

#[tokio::test]
async fn test_reconnecting_same_peer_reuses_queue() {
    let out = Outbound::new("src", 8);
    let (peer, mut received) = collector("dst", Some(Status::Done));
    out.connect(1, Arc::clone(&peer) as Arc<dyn Actor>);
    out.connect(2, peer);

    assert_eq!(out.len(), 1);

    out.dispatch(Message::new(b"one")).await.unwrap();
    assert!(received.recv().await.is_some());
}

#[tokio::test]
async fn test_send_to_unknown_peer_fails() {
    let out = Outbound::new("src", 8);
    let err = out.send("ghost", Message::new(b"x")).await.unwrap_err();
    assert!(matches!(err, CoreError::QueueClosed { .. }));
}

#[tokio::test]
async fn test_close_drops_links() {
    let out = Outbound::new("src", 8);
    let (peer, _received) = collector("dst", None);
    out.connect(1, peer);
    assert!(!out.is_empty());

    out.close();
    assert!(out.is_empty());
    assert!(out.sender("dst").is_none());
}
