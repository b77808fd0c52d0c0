//! `SERVICE_DB`: `DB_EXECUTE` runs one SQL statement against a
//! preconfigured pool; `DB_CLOSE` tears that pool down. Thin JSON-request
//! adapter in front of the DB request executor (component J).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::db::{DbCmd, DbExecutor, DbKey, DbKind, DbRequest, DEFAULT_TIMEOUT_MS};
use crate::errors::DbError;
use crate::net::session::Session;
use crate::protocol::{envelope, envelope::status_code, ids, Header};

use super::{Handler, Service};

pub struct DbService {
    executor: Arc<DbExecutor>,
}

impl DbService {
    pub fn new(executor: Arc<DbExecutor>) -> Self {
        Self { executor }
    }
}

impl Service for DbService {
    fn service_id(&self) -> u16 {
        ids::SERVICE_DB
    }

    fn register_cmds(self: Arc<Self>) -> HashMap<u16, Arc<dyn Handler>> {
        let mut cmds: HashMap<u16, Arc<dyn Handler>> = HashMap::new();
        cmds.insert(
            ids::DB_EXECUTE,
            Arc::new(ExecuteHandler {
                executor: self.executor.clone(),
            }),
        );
        cmds.insert(
            ids::DB_CLOSE,
            Arc::new(CloseHandler {
                executor: self.executor.clone(),
            }),
        );
        cmds
    }
}

#[derive(Deserialize, Default)]
struct ConnInfo {
    #[serde(default)]
    host: String,
    #[serde(default)]
    port: u16,
    #[serde(default)]
    database: String,
    #[serde(default)]
    path: String,
}

#[derive(Deserialize)]
struct DbTarget {
    #[serde(rename = "type")]
    kind: DbKind,
    #[serde(rename = "connInfo", default)]
    conn_info: ConnInfo,
}

impl DbTarget {
    fn key(&self) -> DbKey {
        match self.kind {
            DbKind::Mysql => DbKey::mysql(&self.conn_info.host, self.conn_info.port, &self.conn_info.database),
            DbKind::Sqlite => DbKey::sqlite(&self.conn_info.path),
        }
    }
}

#[derive(Deserialize)]
struct DbAction {
    sql: String,
}

#[derive(Deserialize)]
struct ExecuteRequest {
    target: DbTarget,
    action: DbAction,
    #[serde(rename = "timeoutMs", default = "default_timeout_ms")]
    timeout_ms: u32,
}

#[derive(Deserialize)]
struct CloseRequest {
    target: DbTarget,
}

fn default_timeout_ms() -> u32 {
    DEFAULT_TIMEOUT_MS
}

/// Maps an executor-level `DbError` to one of the business-level status
/// codes the envelope convention names. An exhaustive match on the typed
/// variant, not a comparison against its rendered message.
fn status_code_for_error(err: &DbError) -> i32 {
    match err {
        DbError::PoolNotFound => status_code::DB_POOL_NOT_FOUND,
        DbError::AcquireTimeout => status_code::DB_ACQUIRE_TIMEOUT,
        DbError::PoolClosed => status_code::DB_POOL_NOT_FOUND,
        DbError::ConnectFailed(_) => status_code::DB_QUERY_FAILED,
    }
}

struct ExecuteHandler {
    executor: Arc<DbExecutor>,
}

#[async_trait]
impl Handler for ExecuteHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);

        let request: ExecuteRequest = match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(err) => {
                let response = envelope::error(&header, status_code::BAD_REQUEST, err.to_string());
                session.send(reply_header, &response);
                return;
            }
        };

        let db_request = DbRequest {
            key: request.target.key(),
            sql: request.action.sql,
            cmd: DbCmd::Execute,
            timeout_ms: request.timeout_ms,
        };

        let response = match self.executor.execute_request(db_request).await {
            Ok(result) if result.success => {
                envelope::ok(&header, json!({ "result": result.to_json() }))
            }
            Ok(result) => envelope::error(&header, status_code::DB_QUERY_FAILED, result.error_msg),
            Err(err) => envelope::error(&header, status_code_for_error(&err), err.to_string()),
        };
        session.send(reply_header, &response);
    }
}

struct CloseHandler {
    executor: Arc<DbExecutor>,
}

#[async_trait]
impl Handler for CloseHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);

        let request: CloseRequest = match serde_json::from_slice(&body) {
            Ok(req) => req,
            Err(err) => {
                let response = envelope::error(&header, status_code::BAD_REQUEST, err.to_string());
                session.send(reply_header, &response);
                return;
            }
        };

        let db_request = DbRequest {
            key: request.target.key(),
            sql: String::new(),
            cmd: DbCmd::Close,
            timeout_ms: default_timeout_ms(),
        };
        let response = match self.executor.execute_request(db_request).await {
            Ok(_) => envelope::ok(&header, json!({})),
            Err(err) => envelope::error(&header, status_code_for_error(&err), err.to_string()),
        };
        session.send(reply_header, &response);
    }
}
