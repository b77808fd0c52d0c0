//! Client registry (component H): name -> session UUID, with online/offline
//! transitions tied to session lifetime.
//!
//! `dashmap::DashMap`-backed. `add` enforces the injectivity invariant
//! (one name, one session) using `DashMap::entry` rather than a
//! read-then-write race.

use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct ClientRegistry {
    names: DashMap<String, Uuid>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails (returns `false`) if `name` is already present — one name maps
    /// to at most one session at any instant.
    pub fn add(&self, name: &str, session: Uuid) -> bool {
        use dashmap::mapref::entry::Entry;
        match self.names.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(session);
                true
            }
        }
    }

    /// Succeeds iff `name` was present.
    pub fn remove(&self, name: &str) -> bool {
        self.names.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Uuid> {
        self.names.get(name).map(|entry| *entry.value())
    }

    pub fn list(&self) -> Vec<String> {
        self.names.iter().map(|entry| entry.key().clone()).collect()
    }
}
