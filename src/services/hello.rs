//! `SERVICE_HELLO`: a single echo command used as the protocol's smoke test.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::net::session::Session;
use crate::protocol::{ids, Header};

use super::{Handler, Service};

pub struct HelloService;

struct TestHandler;

#[async_trait]
impl Handler for TestHandler {
    /// Raw transport-level echo: the response carries the *same* body bytes
    /// as the request, not a JSON envelope — this is the protocol's smoke
    /// test, exercised byte-for-byte.
    async fn handle(&self, session: Arc<Session>, header: Header, body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, body.len() as u32);
        session.send(reply_header, &body);
    }
}

impl Service for HelloService {
    fn service_id(&self) -> u16 {
        ids::SERVICE_HELLO
    }

    fn register_cmds(self: Arc<Self>) -> HashMap<u16, Arc<dyn Handler>> {
        let mut cmds: HashMap<u16, Arc<dyn Handler>> = HashMap::new();
        cmds.insert(ids::HELLO_TEST, Arc::new(TestHandler));
        cmds
    }
}
