//! DB request executor. Process-wide; holds a
//! map `DBKey -> DBPool` and serves `DBRequest`s by looking up the matching
//! pool, acquiring a connection from it, running one query, and releasing.
//!
//! The map itself follows the same `dashmap` convention the client
//! registry (component H) and service registry (component F) use for
//! their own process-wide maps.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Deserialize;

use crate::config::database::{DatabaseConfig, DatabaseDescriptor};
use crate::db::connection::{MysqlConnection, SqliteConn};
use crate::db::key::{DbKey, DbKind};
use crate::db::pool::{Connector, DbPool, PoolStats};
use crate::db::result::DbResult;
use crate::errors::DbError;

/// Default acquire/execute deadline when a request doesn't specify one,
/// used when a `DBRequest` omits `timeoutMs`.
pub const DEFAULT_TIMEOUT_MS: u32 = 3000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbCmd {
    Execute,
    Close,
}

/// Decoded `DBRequest`. `key` is constructed by the DB service
/// handler from the request's `target` JSON before reaching the executor.
#[derive(Debug)]
pub struct DbRequest {
    pub key: DbKey,
    pub sql: String,
    pub cmd: DbCmd,
    pub timeout_ms: u32,
}

#[derive(Default)]
pub struct DbExecutor {
    pools: DashMap<DbKey, Arc<DbPool>>,
}

impl DbExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `InitializeFromConfig`: constructs one pool per database descriptor,
    /// keyed by `(type, ident)`. Duplicate keys overwrite the earlier pool's
    /// map entry with the later one.
    pub async fn initialize_from_config(&self, config: &DatabaseConfig) -> Result<(), DbError> {
        for descriptor in &config.databases {
            let key = descriptor.key();
            let size = descriptor.pool_size();
            let connector = make_connector(descriptor);
            let pool = DbPool::initialize(size, connector).await?;
            self.pools.insert(key, pool);
        }
        Ok(())
    }

    /// `ExecuteRequest`: look up the pool, dispatch `execute`/`close`,
    /// always releasing the connection back to its pool on the `execute`
    /// path. Infra-level failures (no such pool, acquire timeout, pool
    /// closed, connect failed) come back as a typed `DbError` so the caller
    /// can map it to a business status code by matching the variant rather
    /// than comparing rendered messages; a query the DB itself rejects is
    /// not a `DbError` — it comes back as `Ok(DbResult { success: false,
    /// .. })` since the connection is still good and goes back to the pool.
    pub async fn execute_request(&self, req: DbRequest) -> Result<DbResult, DbError> {
        let pool = self
            .pools
            .get(&req.key)
            .map(|entry| entry.value().clone())
            .ok_or(DbError::PoolNotFound)?;

        match req.cmd {
            DbCmd::Close => {
                pool.close_all().await;
                self.pools.remove(&req.key);
                return Ok(DbResult::exec_result(0, 0));
            }
            DbCmd::Execute => {}
        }

        let timeout = Duration::from_millis(req.timeout_ms as u64);
        // Returned to the pool regardless of whether execute succeeded; no
        // health probe runs here, `isValid()` is only consulted at
        // pool-growth time (see DESIGN.md).
        let mut conn = pool.acquire(timeout).await?;
        let mut out = DbResult::default();
        conn.execute(&req.sql, &mut out).await;
        pool.release(conn).await;
        Ok(out)
    }

    /// `Shutdown`: closes every pool and clears the map.
    pub async fn shutdown(&self) {
        for entry in self.pools.iter() {
            entry.value().close_all().await;
        }
        self.pools.clear();
    }

    pub async fn pool_stats(&self) -> Vec<(DbKey, PoolStats)> {
        let mut out = Vec::with_capacity(self.pools.len());
        for entry in self.pools.iter() {
            out.push((entry.key().clone(), entry.value().stats().await));
        }
        out
    }
}

fn make_connector(descriptor: &DatabaseDescriptor) -> Connector {
    match descriptor.kind {
        DbKind::Mysql => {
            let url = format!(
                "mysql://{user}:{password}@{host}:{port}/{database}",
                user = descriptor.user,
                password = descriptor.password,
                host = descriptor.host,
                port = descriptor.port,
                database = descriptor.database,
            );
            Arc::new(move || {
                let url = url.clone();
                Box::pin(async move {
                    MysqlConnection::connect(&url)
                        .await
                        .map(|conn| Box::new(conn) as Box<dyn crate::db::connection::DbConnection>)
                        .map_err(|err| DbError::ConnectFailed(err.to_string()))
                })
            })
        }
        DbKind::Sqlite => {
            let url = format!("sqlite://{}", descriptor.path);
            Arc::new(move || {
                let url = url.clone();
                Box::pin(async move {
                    SqliteConn::connect(&url)
                        .await
                        .map(|conn| Box::new(conn) as Box<dyn crate::db::connection::DbConnection>)
                        .map_err(|err| DbError::ConnectFailed(err.to_string()))
                })
            })
        }
    }
}
