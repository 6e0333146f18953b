use std::time::Duration;

use tokio::time::timeout;

use flowd_core::{Actor, Message, Params, Status};

use crate::testutil::{collector, test_context};

use super::*;

async fn new_fanout() -> std::sync::Arc<dyn Actor> {
    let (ctx, _failures) = test_context(1);
    Fanout::build("fan", ctx, &Params::new()).unwrap()
}

#[tokio::test]
async fn test_copies_to_every_peer() {
    let fanout = new_fanout().await;
    let (left, mut left_rx) = collector("left", Some(Status::Done));
    let (right, mut right_rx) = collector("right", Some(Status::Done));
    fanout.connect(1, left).await.unwrap();
    fanout.connect(1, right).await.unwrap();
    fanout.start().await.unwrap();

    let msg = Message::new(b"broadcast");
    fanout.receive(msg.clone()).await.unwrap();

    let got_left = timeout(Duration::from_secs(5), left_rx.recv())
        .await
        .unwrap()
        .unwrap();
    let got_right = timeout(Duration::from_secs(5), right_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&got_left.body()[..], b"broadcast");
    assert_eq!(&got_right.body()[..], b"broadcast");

    // The original resolves once all copies were queued.
    let status = timeout(Duration::from_secs(5), msg.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    fanout.stop().await.unwrap();
}

#[tokio::test]
async fn test_single_peer_receives_original() {
    let fanout = new_fanout().await;
    let (peer, mut rx) = collector("only", Some(Status::Done));
    fanout.connect(1, peer).await.unwrap();
    fanout.start().await.unwrap();

    let msg = Message::new(b"solo");
    fanout.receive(msg.clone()).await.unwrap();

    timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let status = timeout(Duration::from_secs(5), msg.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Done);

    fanout.stop().await.unwrap();
}

#[tokio::test]
async fn test_no_peers_is_unroutable() {
    let fanout = new_fanout().await;
    fanout.start().await.unwrap();

    let msg = Message::new(b"nowhere");
    fanout.receive(msg.clone()).await.unwrap();
    let status = timeout(Duration::from_secs(5), msg.completed())
        .await
        .unwrap();
    assert_eq!(status, Status::Unroutable);

    fanout.stop().await.unwrap();
}
