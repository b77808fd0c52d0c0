//! Admin/introspection surface: a handful of global counters
//! plus a point-in-time snapshot renderable as JSON or logged at `info`.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use serde::Serialize;
use serde_json::json;

use crate::db::DbExecutor;

/// Clients currently holding an open session. Incremented on accept,
/// decremented on close.
pub static CURRENT_CLIENT_COUNT: AtomicI64 = AtomicI64::new(0);

/// Monotonic count of every connection ever accepted. Never decremented.
pub static TOTAL_CONNECTIONS: AtomicU64 = AtomicU64::new(0);

pub fn record_connect() {
    CURRENT_CLIENT_COUNT.fetch_add(1, Ordering::Relaxed);
    TOTAL_CONNECTIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn record_disconnect() {
    CURRENT_CLIENT_COUNT.fetch_sub(1, Ordering::Relaxed);
}

#[derive(Debug, Serialize)]
pub struct PoolSnapshot {
    pub key: String,
    pub created: usize,
    pub idle: usize,
    pub max: usize,
}

#[derive(Debug, Serialize)]
pub struct Snapshot {
    pub current_client_count: i64,
    pub total_connections: u64,
    pub pools: Vec<PoolSnapshot>,
}

impl Snapshot {
    pub async fn capture(executor: &DbExecutor) -> Self {
        let pools = executor
            .pool_stats()
            .await
            .into_iter()
            .map(|(key, stats)| PoolSnapshot {
                key: key.to_string(),
                created: stats.created,
                idle: stats.idle,
                max: stats.max,
            })
            .collect();

        Self {
            current_client_count: CURRENT_CLIENT_COUNT.load(Ordering::Relaxed),
            total_connections: TOTAL_CONNECTIONS.load(Ordering::Relaxed),
            pools,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "currentClientCount": self.current_client_count,
            "totalConnections": self.total_connections,
            "pools": self.pools.iter().map(|p| json!({
                "key": p.key,
                "created": p.created,
                "idle": p.idle,
                "max": p.max,
            })).collect::<Vec<_>>(),
        })
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "clients={} total_connections={} pools={}",
            self.current_client_count,
            self.total_connections,
            self.pools.len()
        )
    }
}
