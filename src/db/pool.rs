//! `DBPool`: a bounded, lazily-grown pool of
//! connections for one backend endpoint.
//!
//! Slots plus a blocking-acquire
//! primitive, release-to-idle, a `closed` flag that releases every waiter,
//! generalized here to explicit `max`/`created`/`idle` bookkeeping with
//! `tokio::sync::{Mutex, Notify}` standing in for a native mutex + condvar —
//! the same substitution the session send queue makes for its own
//! backpressure primitive.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::db::connection::DbConnection;
use crate::errors::DbError;

/// Async factory that produces one fresh connection. Boxed so `DbPool` does
/// not need to be generic over the backend — a MySQL pool and a SQLite pool
/// are both just `DbPool` with a different connector.
pub type Connector =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<Box<dyn DbConnection>, DbError>> + Send>> + Send + Sync>;

struct State {
    created: usize,
    idle: VecDeque<Box<dyn DbConnection>>,
    closed: bool,
}

/// A point-in-time view of pool occupancy, rendered by the admin surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub max: usize,
    pub created: usize,
    pub idle: usize,
}

pub struct DbPool {
    max: usize,
    connector: Connector,
    state: Mutex<State>,
    notify: Notify,
}

impl DbPool {
    /// Pre-creates `ceil(max/2)` connections; fails the whole construction
    /// if any of them doesn't pass `isValid()`.
    /// "Initialize".
    pub async fn initialize(max: usize, connector: Connector) -> Result<Arc<Self>, DbError> {
        let pool = Arc::new(Self {
            max: max.max(1),
            connector,
            state: Mutex::new(State {
                created: 0,
                idle: VecDeque::new(),
                closed: false,
            }),
            notify: Notify::new(),
        });

        let warm = max.div_ceil(2).max(1);
        let mut state = pool.state.lock().await;
        for _ in 0..warm {
            let mut conn = (pool.connector)()
                .await
                .map_err(|err| DbError::ConnectFailed(err.to_string()))?;
            if !conn.is_valid().await {
                return Err(DbError::ConnectFailed(
                    "connection failed validity check during pool warmup".to_string(),
                ));
            }
            state.idle.push_back(conn);
            state.created += 1;
        }
        drop(state);
        Ok(pool)
    }

    /// `Acquire(timeout)`: pop an idle connection if one
    /// exists; else grow up to `max`; else wait on the condition variable
    /// until released or the deadline passes.
    pub async fn acquire(&self, timeout: Duration) -> Result<Box<dyn DbConnection>, DbError> {
        let deadline = Instant::now() + timeout;
        loop {
            // Register interest in a wakeup *before* inspecting state, so a
            // release racing with us between the check and the wait below
            // is never missed.
            let notified = self.notify.notified();

            {
                let mut state = self.state.lock().await;
                if state.closed {
                    return Err(DbError::PoolClosed);
                }
                if let Some(conn) = state.idle.pop_front() {
                    return Ok(conn);
                }
                if state.created < self.max {
                    state.created += 1;
                    drop(state);
                    return match (self.connector)().await {
                        Ok(conn) => Ok(conn),
                        Err(err) => {
                            let mut state = self.state.lock().await;
                            state.created -= 1;
                            drop(state);
                            self.notify.notify_one();
                            log::warn!("failed to grow pool: {err}");
                            Err(DbError::ConnectFailed(err.to_string()))
                        }
                    };
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || tokio::time::timeout(remaining, notified).await.is_err() {
                return Err(DbError::AcquireTimeout);
            }
        }
    }

    /// `Release(conn)`: push to idle and notify one waiter; discards the
    /// connection instead if the pool has since been closed.
    pub async fn release(&self, conn: Box<dyn DbConnection>) {
        let mut state = self.state.lock().await;
        if state.closed {
            state.created = state.created.saturating_sub(1);
            drop(state);
            return;
        }
        state.idle.push_back(conn);
        drop(state);
        self.notify.notify_one();
    }

    /// `CloseAll`: one-way transition. Drops every idle connection and
    /// releases every current and future waiter with failure.
    pub async fn close_all(&self) {
        let mut state = self.state.lock().await;
        state.closed = true;
        state.idle.clear();
        state.created = 0;
        drop(state);
        self.notify.notify_waiters();
    }

    pub async fn stats(&self) -> PoolStats {
        let state = self.state.lock().await;
        PoolStats {
            max: self.max,
            created: state.created,
            idle: state.idle.len(),
        }
    }
}
