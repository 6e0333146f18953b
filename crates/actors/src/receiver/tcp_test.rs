use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

use flowd_core::{Actor, CoreError, Params, Status, Value};

use crate::testutil::{collector, test_context};

use super::*;

fn loopback_params() -> Params {
    let mut params = Params::new();
    params.insert("bind_addr".into(), Value::from("127.0.0.1:0"));
    params
}

#[test]
fn test_build_requires_bind_addr() {
    let (ctx, _failures) = test_context(1);
    let err = TcpReceiver::build("in", ctx, &Params::new()).unwrap_err();
    assert!(matches!(err, CoreError::MissingParam { .. }));
}

#[tokio::test]
async fn test_lines_become_messages() {
    let (ctx, _failures) = test_context(1);
    let receiver = TcpReceiver::new("in", ctx, &loopback_params()).unwrap();
    let (peer, mut received) = collector("peer", Some(Status::Done));
    receiver.connect(1, peer).await.unwrap();
    receiver.start().await.unwrap();
    let addr = receiver.local_addr().unwrap();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(b"first\nsecond\n").await.unwrap();
    conn.flush().await.unwrap();

    let first = timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&first.body()[..], b"first");
    let second = timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&second.body()[..], b"second");

    receiver.stop().await.unwrap();
}

#[tokio::test]
async fn test_empty_lines_are_skipped() {
    let (ctx, _failures) = test_context(1);
    let receiver = TcpReceiver::new("in", ctx, &loopback_params()).unwrap();
    let (peer, mut received) = collector("peer", Some(Status::Done));
    receiver.connect(1, peer).await.unwrap();
    receiver.start().await.unwrap();
    let addr = receiver.local_addr().unwrap();

    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(b"\n\npayload\n").await.unwrap();
    conn.shutdown().await.unwrap();

    let msg = timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&msg.body()[..], b"payload");

    receiver.stop().await.unwrap();
}

#[tokio::test]
async fn test_injected_messages_pass_through() {
    let (ctx, _failures) = test_context(1);
    let receiver = TcpReceiver::new("in", ctx, &loopback_params()).unwrap();
    let (peer, mut received) = collector("peer", Some(Status::Done));
    receiver.connect(1, peer).await.unwrap();
    receiver.start().await.unwrap();

    receiver
        .receive(flowd_core::Message::new(b"direct"))
        .await
        .unwrap();
    let msg = timeout(Duration::from_secs(5), received.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&msg.body()[..], b"direct");

    receiver.stop().await.unwrap();
}

#[tokio::test]
async fn test_lifecycle_policy() {
    let (ctx, _failures) = test_context(1);
    let receiver = TcpReceiver::new("in", ctx, &loopback_params()).unwrap();
    assert!(matches!(
        receiver.stop().await.unwrap_err(),
        CoreError::NotStarted { .. }
    ));
    receiver.start().await.unwrap();
    assert!(matches!(
        receiver.start().await.unwrap_err(),
        CoreError::AlreadyStarted { .. }
    ));
    receiver.stop().await.unwrap();
}
