//! The global session index (component D's home) and client registry
//! (component H).

pub mod client_registry;
pub mod session_registry;

pub use client_registry::ClientRegistry;
pub use session_registry::SessionRegistry;
