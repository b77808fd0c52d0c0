//! `SERVICE_COMMUNICATION`: register/unregister a client name, route a
//! message between two registered sessions, and list who's online.
//!
//! Built directly around the "register duplicate name" and
//! "cross-session send" scenarios: named-client routing over the shared
//! session registry, independent of the wire protocol's own framing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::net::session::{ClientInfo, Session};
use crate::protocol::{envelope, envelope::status_code, ids, Header};
use crate::util::now_millis;

use super::{Handler, Service};

pub struct CommunicationService;

impl Service for CommunicationService {
    fn service_id(&self) -> u16 {
        ids::SERVICE_COMMUNICATION
    }

    fn register_cmds(self: Arc<Self>) -> HashMap<u16, Arc<dyn Handler>> {
        let mut cmds: HashMap<u16, Arc<dyn Handler>> = HashMap::new();
        cmds.insert(ids::COMM_REGISTER, Arc::new(RegisterHandler));
        cmds.insert(ids::COMM_CLOSE, Arc::new(CloseHandler));
        cmds.insert(ids::COMM_SEND, Arc::new(SendHandler));
        cmds.insert(ids::COMM_SHOW, Arc::new(ShowHandler));
        cmds
    }
}

#[derive(Deserialize)]
struct RegisterTarget {
    name: String,
    #[serde(default)]
    is_long_conn: bool,
}

#[derive(Deserialize)]
struct RegisterRequest {
    target: RegisterTarget,
}

struct RegisterHandler;

#[async_trait]
impl Handler for RegisterHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);

        let request: RegisterRequest = match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(err) => {
                let response = envelope::error(&header, status_code::BAD_REQUEST, err.to_string());
                session.send(reply_header, &response);
                return;
            }
        };

        if !session.client_registry_add(&request.target.name) {
            let response = envelope::error(
                &header,
                status_code::DUPLICATE_CLIENT_NAME,
                "client name already exists",
            );
            session.send(reply_header, &response);
            return;
        }

        let info = ClientInfo {
            ip: session.addr.ip().to_string(),
            port: session.addr.port(),
            name: request.target.name,
            is_long_conn: request.target.is_long_conn,
            connect_time: now_millis(),
        };
        session.attach_client_info(info);

        let response = envelope::ok(&header, json!({}));
        session.send(reply_header, &response);
    }
}

struct CloseHandler;

#[async_trait]
impl Handler for CloseHandler {
    /// Client-requested graceful disconnect: ack, then close the session —
    /// the name is dropped as part of `Session::close`, never independently
    /// of the socket.
    async fn handle(&self, session: Arc<Session>, header: Header, _body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);
        let response = envelope::ok(&header, json!({}));
        session.send(reply_header, &response);
        session.close().await;
    }
}

#[derive(Deserialize)]
struct SendTarget {
    client: String,
    message: String,
}

#[derive(Deserialize)]
struct SendRequest {
    target: SendTarget,
}

struct SendHandler;

#[async_trait]
impl Handler for SendHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);

        let request: SendRequest = match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(err) => {
                let response = envelope::error(&header, status_code::BAD_REQUEST, err.to_string());
                session.send(reply_header, &response);
                return;
            }
        };

        let Some(target_id) = session.client_registry_get(&request.target.client) else {
            let response =
                envelope::error(&header, status_code::UNKNOWN_CLIENT, "unknown client");
            session.send(reply_header, &response);
            return;
        };

        // Delivered as a raw frame echoing the sender's own routing fields,
        // per the "Cross-session send" scenario — the receiver
        // sees serviceId/cmdId/seq exactly as the sender sent them.
        session.send_to_other(target_id, header, request.target.message.as_bytes());

        let response = envelope::ok(&header, json!({}));
        session.send(reply_header, &response);
    }
}

struct ShowHandler;

#[async_trait]
impl Handler for ShowHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, _body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);
        let names = session.client_registry_list();
        let response = envelope::ok(&header, json!(names));
        session.send(reply_header, &response);
    }
}
