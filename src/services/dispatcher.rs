//! Dispatcher (component G). Stateless: decoded frame + session in, handler
//! looked up and invoked. No extra crate needed — a plain async function
//! is enough for one handler per (serviceId, cmdId) pair.

use std::sync::Arc;

use crate::net::session::Session;
use crate::protocol::Header;

use super::ServiceRegistry;

pub struct Dispatcher {
    services: Arc<ServiceRegistry>,
}

impl Dispatcher {
    pub fn new(services: Arc<ServiceRegistry>) -> Self {
        Self { services }
    }

    /// Looks up the service, then the cmd within it, and runs the handler
    /// inline — the caller (the session's read loop) has already spawned
    /// this call as an independent task, so the handler itself does not
    /// need to spawn again. Unknown serviceId/cmdId: log WARN, continue;
    /// this never closes the session.
    pub async fn dispatch(&self, session: Arc<Session>, header: Header, body: Vec<u8>) {
        let Some(descriptor) = self.services.lookup(header.service_id) else {
            tracing::warn!(
                session = %session.id,
                service_id = header.service_id,
                "unknown serviceId, ignoring frame"
            );
            return;
        };

        let Some(handler) = descriptor.lookup(header.cmd_id) else {
            tracing::warn!(
                session = %session.id,
                service_id = header.service_id,
                cmd_id = header.cmd_id,
                "unknown cmdId, ignoring frame"
            );
            return;
        };

        handler.handle(session, header, body).await;
    }
}
