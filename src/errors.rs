//! Errors.

/// Top-level error type. Most call sites match on a specific variant to
/// decide disposition (close the session, log and continue, reply with a
/// business error), per the error handling design.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the frame codec (component A). A `Frame` error always means
/// the connection is no longer usable and the session must be closed.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("connection closed by peer")]
    Eof,
    #[error("io error while reading frame: {0}")]
    Io(#[source] std::io::Error),
    #[error("bad magic number: expected 0x55AA, got {0:#06x}")]
    BadMagic(u16),
    #[error("body length {0} exceeds maximum {1}")]
    BodyTooLarge(u32, u32),
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            FrameError::Eof
        } else {
            FrameError::Io(err)
        }
    }
}

/// Configuration loading/validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the DB pool and executor (components I, J). Query-level
/// failures (a DB rejecting a statement) are not a `DbError` variant — they
/// surface as a business result (`DbResult { success: false, .. }`) rather
/// than an executor-level error, since the connection itself is fine and is
/// returned to the pool.
#[derive(Debug, thiserror::Error, Clone)]
pub enum DbError {
    #[error("connection pool not found")]
    PoolNotFound,
    #[error("acquire connection timeout")]
    AcquireTimeout,
    #[error("pool is closed")]
    PoolClosed,
    #[error("failed to connect: {0}")]
    ConnectFailed(String),
}
