//! End-to-end smoke test: a raw frame sent to `SERVICE_HELLO`/`HELLO_TEST`
//! comes back with the exact same body bytes and routing fields.

mod common;

use relaysrv::protocol::ids;
use common::{TestClient, TestServer};

#[tokio::test]
async fn hello_echo_roundtrips_the_body_byte_for_byte() {
    let server = TestServer::start().await;
    let mut client = TestClient::connect(server.addr).await;

    let header = client.next_header(ids::SERVICE_HELLO, ids::HELLO_TEST);
    let body = b"the quick brown fox".to_vec();
    client.send(header, &body).await;

    let (reply_header, reply_body) = client.recv().await;
    assert_eq!(reply_header.service_id, ids::SERVICE_HELLO);
    assert_eq!(reply_header.cmd_id, ids::HELLO_TEST);
    assert_eq!(reply_header.seq, header.seq);
    assert_eq!(reply_body, body);
}

#[tokio::test]
async fn hello_echo_roundtrips_an_empty_body() {
    let server = TestServer::start().await;
    let mut client = TestClient::connect(server.addr).await;

    let header = client.next_header(ids::SERVICE_HELLO, ids::HELLO_TEST);
    client.send(header, &[]).await;

    let (reply_header, reply_body) = client.recv().await;
    assert_eq!(reply_header.length, 0);
    assert!(reply_body.is_empty());
}
