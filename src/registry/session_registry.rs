//! Global session index: UUID -> live session, mutated on accept/close.
//!
//! `dashmap::DashMap`-backed: read-heavy, shared state touched at connect
//! and disconnect time, so a sharded concurrent map beats a single mutex.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::net::session::Session;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<Uuid, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Arc<Session>) {
        self.sessions.insert(session.id, session);
    }

    pub fn get(&self, id: &Uuid) -> Option<Arc<Session>> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, id: &Uuid) {
        self.sessions.remove(id);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc as StdArc;
    use tokio::runtime::Handle;

    fn dummy_dispatcher() -> StdArc<crate::services::Dispatcher> {
        StdArc::new(crate::services::Dispatcher::new(StdArc::new(
            crate::services::ServiceRegistry::new(),
        )))
    }

    #[tokio::test]
    async fn insert_then_get_then_remove() {
        let registry = SessionRegistry::new();
        let client_registry = StdArc::new(crate::registry::ClientRegistry::new());
        let session = Session::new(
            "127.0.0.1:1234".parse::<SocketAddr>().unwrap(),
            Handle::current(),
            StdArc::new(SessionRegistry::new()),
            client_registry,
            dummy_dispatcher(),
        );
        let id = session.id;
        registry.insert(session);
        assert!(registry.get(&id).is_some());
        registry.remove(&id);
        assert!(registry.get(&id).is_none());
    }
}
