//! `SERVICE_HEART`: explicit heartbeat frames. Not privileged by the
//! transport — any successful whole-frame read already refreshes
//! `lastActivity` in the session's read loop — this service
//! only supplies the HEART_RECV -> HEART_ACK request/response pair clients
//! may use to probe liveness proactively.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::net::session::Session;
use crate::protocol::{envelope, ids, Header};

use super::{Handler, Service};

pub struct HeartService;

struct RecvHandler;

#[async_trait]
impl Handler for RecvHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, _body: Vec<u8>) {
        let mut reply_header = Header::reply_to(&header, 0);
        reply_header.cmd_id = ids::HEART_ACK;
        // The envelope's own header mirrors the *response* cmdId, not the
        // request's HEART_RECV, since the two are distinct by design here.
        let mut envelope_header = header;
        envelope_header.cmd_id = ids::HEART_ACK;
        let response = envelope::ok(&envelope_header, json!({}));
        session.send(reply_header, &response);
    }
}

impl Service for HeartService {
    fn service_id(&self) -> u16 {
        ids::SERVICE_HEART
    }

    fn register_cmds(self: Arc<Self>) -> HashMap<u16, Arc<dyn Handler>> {
        let mut cmds: HashMap<u16, Arc<dyn Handler>> = HashMap::new();
        cmds.insert(ids::HEART_RECV, Arc::new(RecvHandler));
        cmds
    }
}
