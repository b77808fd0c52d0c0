//! Process entry glue: CLI surface, logging init, the signal-driven run
//! loop, and the panic hook.

pub mod args;
pub mod logger;
pub mod panic;
pub mod server;

pub use args::{parse, Args};
pub use logger::init_logging;
pub use panic::install_panic_hook;
pub use server::run;
