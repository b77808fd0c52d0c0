//! Database layer: connection pool (component I) and request executor
//! (component J), plus the `DBKey`/`DBResult` data types they share.

pub mod connection;
pub mod executor;
pub mod key;
pub mod pool;
pub mod result;

pub use executor::{DbCmd, DbExecutor, DbRequest, DEFAULT_TIMEOUT_MS};
pub use key::{DbKey, DbKind};
pub use result::DbResult;
