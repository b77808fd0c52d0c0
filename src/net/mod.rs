//! The network I/O engine: reactor pool (component C), session (component
//! D), and acceptor (component E).

pub mod acceptor;
pub mod reactor;
pub mod session;

pub use acceptor::Acceptor;
pub use reactor::ReactorPool;
pub use session::Session;
