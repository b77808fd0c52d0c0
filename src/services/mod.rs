//! Service registry (component F) and the concrete business services.
//!
//! A `dashmap::DashMap`-backed global
//! maps built on `dashmap`; a `ServiceDescriptor` is immutable once exposed
//! (construction-then-read discipline).

pub mod admin;
pub mod communication;
pub mod db;
pub mod dispatcher;
pub mod heart;
pub mod hello;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::net::session::Session;
use crate::protocol::Header;

pub use dispatcher::Dispatcher;

/// One frame handler: given the session that received the frame and its
/// decoded header/body, does whatever the command implies and, per the
/// dispatcher contract, echoes a response with the same `serviceId`,
/// `cmdId`, and `seq`.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, session: Arc<Session>, header: Header, body: Vec<u8>);
}

/// A logical namespace of command handlers, identified by `serviceId`.
/// Immutable after `Service::register_cmds` runs at startup.
pub struct ServiceDescriptor {
    pub service_id: u16,
    cmds: HashMap<u16, Arc<dyn Handler>>,
}

impl ServiceDescriptor {
    pub fn lookup(&self, cmd_id: u16) -> Option<Arc<dyn Handler>> {
        self.cmds.get(&cmd_id).cloned()
    }
}

/// A business service: owns a `serviceId` and populates its own cmd map.
/// `register_cmds` runs exactly once, during `ServiceRegistry::register`,
/// before the descriptor is inserted — the same "build then freeze" split
/// registers one handler per command id.
pub trait Service {
    fn service_id(&self) -> u16;
    fn register_cmds(self: Arc<Self>) -> HashMap<u16, Arc<dyn Handler>>;
}

/// Process-wide `serviceId -> ServiceDescriptor` map.
#[derive(Default)]
pub struct ServiceRegistry {
    services: DashMap<u16, Arc<ServiceDescriptor>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent on absent keys; rejected (logged) on duplicate keys.
    pub fn register<S: Service + 'static>(&self, service: Arc<S>) {
        let service_id = service.service_id();
        if self.services.contains_key(&service_id) {
            tracing::warn!(service_id, "duplicate service registration, ignoring");
            return;
        }
        let cmds = service.register_cmds();
        self.services.insert(
            service_id,
            Arc::new(ServiceDescriptor { service_id, cmds }),
        );
    }

    pub fn lookup(&self, service_id: u16) -> Option<Arc<ServiceDescriptor>> {
        self.services.get(&service_id).map(|entry| entry.value().clone())
    }
}
