//! Named-client registry: register, duplicate-register, cross-session send,
//! and the show-who's-online listing.

mod common;

use relaysrv::protocol::ids;
use serde_json::{json, Value};
use common::{TestClient, TestServer};

async fn register(client: &mut TestClient, name: &str) -> Value {
    let header = client.next_header(ids::SERVICE_COMMUNICATION, ids::COMM_REGISTER);
    let body = json!({ "target": { "name": name, "is_long_conn": false } });
    client.send(header, &serde_json::to_vec(&body).unwrap()).await;
    let (_, reply_body) = client.recv().await;
    serde_json::from_slice(&reply_body).unwrap()
}

#[tokio::test]
async fn register_succeeds_and_reports_status_zero() {
    let server = TestServer::start().await;
    let mut client = TestClient::connect(server.addr).await;

    let reply = register(&mut client, "alice").await;
    assert_eq!(reply["status"]["code"], 0);
}

#[tokio::test]
async fn duplicate_register_gets_business_error_and_stays_open() {
    let server = TestServer::start().await;

    let mut first = TestClient::connect(server.addr).await;
    let mut second = TestClient::connect(server.addr).await;

    let first_reply = register(&mut first, "bob").await;
    assert_eq!(first_reply["status"]["code"], 0);

    let second_reply = register(&mut second, "bob").await;
    assert_eq!(second_reply["status"]["code"], 20001);

    // Neither session was closed by the duplicate: a heartbeat request on
    // the second connection still gets an answer.
    let header = second.next_header(ids::SERVICE_HEART, ids::HEART_RECV);
    second.send(header, &[]).await;
    let (reply_header, _) = second.recv().await;
    assert_eq!(reply_header.cmd_id, ids::HEART_ACK);
}

#[tokio::test]
async fn show_lists_exactly_the_registered_names() {
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(server.addr).await;
    let mut bob = TestClient::connect(server.addr).await;

    register(&mut alice, "alice").await;
    register(&mut bob, "bob").await;

    let header = alice.next_header(ids::SERVICE_COMMUNICATION, ids::COMM_SHOW);
    alice.send(header, &[]).await;
    let (_, reply_body) = alice.recv().await;
    let reply: Value = serde_json::from_slice(&reply_body).unwrap();

    let mut names: Vec<String> = reply["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["alice".to_string(), "bob".to_string()]);
}

#[tokio::test]
async fn cross_session_send_delivers_a_raw_frame_to_the_named_peer() {
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(server.addr).await;
    let mut bob = TestClient::connect(server.addr).await;

    register(&mut alice, "alice").await;
    register(&mut bob, "bob").await;

    let header = alice.next_header(ids::SERVICE_COMMUNICATION, ids::COMM_SEND);
    let body = json!({ "target": { "client": "bob", "message": "hi bob" } });
    alice.send(header, &serde_json::to_vec(&body).unwrap()).await;

    // Bob receives the raw frame first (it's pushed to his send queue
    // independently of alice's own ack).
    let (bob_header, bob_body) = bob.recv().await;
    assert_eq!(bob_header.service_id, ids::SERVICE_COMMUNICATION);
    assert_eq!(bob_header.cmd_id, ids::COMM_SEND);
    assert_eq!(bob_body, b"hi bob");

    let (_, alice_ack_body) = alice.recv().await;
    let ack: Value = serde_json::from_slice(&alice_ack_body).unwrap();
    assert_eq!(ack["status"]["code"], 0);
}

#[tokio::test]
async fn send_to_unknown_client_is_a_business_error() {
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(server.addr).await;
    register(&mut alice, "alice").await;

    let header = alice.next_header(ids::SERVICE_COMMUNICATION, ids::COMM_SEND);
    let body = json!({ "target": { "client": "ghost", "message": "hello?" } });
    alice.send(header, &serde_json::to_vec(&body).unwrap()).await;

    let (_, reply_body) = alice.recv().await;
    let reply: Value = serde_json::from_slice(&reply_body).unwrap();
    assert_eq!(reply["status"]["code"], 20002);
}

#[tokio::test]
async fn close_command_acks_then_drops_the_session() {
    let server = TestServer::start().await;
    let mut client = TestClient::connect(server.addr).await;
    register(&mut client, "carol").await;
    assert_eq!(server.session_registry.len(), 1);

    let header = client.next_header(ids::SERVICE_COMMUNICATION, ids::COMM_CLOSE);
    client.send(header, &[]).await;
    let (_, reply_body) = client.recv().await;
    let reply: Value = serde_json::from_slice(&reply_body).unwrap();
    assert_eq!(reply["status"]["code"], 0);

    // The socket is closed right after: a further read observes EOF.
    client.expect_eof(std::time::Duration::from_secs(2)).await;
}
