//! `DBConnection`: an opaque per-backend handle behind one
//! trait, with `isValid()` and a cooperative `execute()`. Two backends are
//! supported behind it, each wrapping a raw `sqlx` connection rather than a
//! hand-rolled wire client, since this server talks to real MySQL/SQLite
//! backends rather than re-implementing their wire protocols.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use sqlx::mysql::MySqlConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::{Column, Connection, Either, Row};

use crate::db::result::DbResult;

/// Backend-agnostic handle the pool lends out. `execute` never panics on a
/// bad query; it reports failure through the `bool` return and leaves the
/// human-readable reason in `out.error_msg`, matching the `DBConnection`
/// contract.
#[async_trait]
pub trait DbConnection: Send {
    async fn is_valid(&mut self) -> bool;
    async fn execute(&mut self, sql: &str, out: &mut DbResult) -> bool;
}

pub struct MysqlConnection {
    inner: MySqlConnection,
}

impl MysqlConnection {
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        Ok(Self {
            inner: MySqlConnection::connect(url).await?,
        })
    }
}

#[async_trait]
impl DbConnection for MysqlConnection {
    async fn is_valid(&mut self) -> bool {
        self.inner.ping().await.is_ok()
    }

    async fn execute(&mut self, sql: &str, out: &mut DbResult) -> bool {
        // `fetch_many` yields both decoded rows and, once the statement is
        // done, the driver's `QueryResult` (rows_affected/last_insert_id) in
        // one round trip — a plain `fetch_all` would discard that metadata
        // for INSERT/UPDATE/DELETE statements that return no rows.
        let mut stream = sqlx::query(sql).fetch_many(&mut self.inner);
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut affected_rows = 0u64;
        let mut last_insert_id = 0i64;
        loop {
            match stream.try_next().await {
                Ok(Some(Either::Left(summary))) => {
                    affected_rows = summary.rows_affected();
                    last_insert_id = summary.last_insert_id() as i64;
                }
                Ok(Some(Either::Right(row))) => {
                    if columns.is_empty() {
                        columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                    }
                    rows.push(stringify_mysql_row(&row));
                }
                Ok(None) => break,
                Err(err) => {
                    *out = DbResult::failure(0, err.to_string());
                    return false;
                }
            }
        }
        *out = if rows.is_empty() {
            DbResult::exec_result(affected_rows, last_insert_id)
        } else {
            DbResult::result_set(columns, rows)
        };
        true
    }
}

pub struct SqliteConn {
    inner: SqliteConnection,
}

impl SqliteConn {
    pub async fn connect(path: &str) -> Result<Self, sqlx::Error> {
        Ok(Self {
            inner: SqliteConnection::connect(path).await?,
        })
    }
}

#[async_trait]
impl DbConnection for SqliteConn {
    async fn is_valid(&mut self) -> bool {
        self.inner.ping().await.is_ok()
    }

    async fn execute(&mut self, sql: &str, out: &mut DbResult) -> bool {
        let mut stream = sqlx::query(sql).fetch_many(&mut self.inner);
        let mut columns: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut affected_rows = 0u64;
        let mut last_insert_id = 0i64;
        loop {
            match stream.try_next().await {
                Ok(Some(Either::Left(summary))) => {
                    affected_rows = summary.rows_affected();
                    last_insert_id = summary.last_insert_rowid();
                }
                Ok(Some(Either::Right(row))) => {
                    if columns.is_empty() {
                        columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                    }
                    rows.push(stringify_sqlite_row(&row));
                }
                Ok(None) => break,
                Err(err) => {
                    *out = DbResult::failure(0, err.to_string());
                    return false;
                }
            }
        }
        *out = if rows.is_empty() {
            DbResult::exec_result(affected_rows, last_insert_id)
        } else {
            DbResult::result_set(columns, rows)
        };
        true
    }
}

/// Best-effort decode of one MySQL row into `Vec<String>`, NULLs becoming
/// `""`. `sqlx` requires a concrete decode type per column, so we probe the
/// common scalar types in order and fall back to raw bytes.
fn stringify_mysql_row(row: &sqlx::mysql::MySqlRow) -> Vec<String> {
    (0..row.columns().len())
        .map(|idx| {
            if let Ok(v) = row.try_get::<i64, _>(idx) {
                return v.to_string();
            }
            if let Ok(v) = row.try_get::<f64, _>(idx) {
                return v.to_string();
            }
            if let Ok(v) = row.try_get::<bool, _>(idx) {
                return v.to_string();
            }
            if let Ok(v) = row.try_get::<String, _>(idx) {
                return v;
            }
            if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
                return String::from_utf8_lossy(&v).into_owned();
            }
            if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
                return v.to_string();
            }
            // NULL, or a type we don't probe for, renders as "".
            String::new()
        })
        .collect()
}

fn stringify_sqlite_row(row: &sqlx::sqlite::SqliteRow) -> Vec<String> {
    (0..row.columns().len())
        .map(|idx| {
            if let Ok(v) = row.try_get::<i64, _>(idx) {
                return v.to_string();
            }
            if let Ok(v) = row.try_get::<f64, _>(idx) {
                return v.to_string();
            }
            if let Ok(v) = row.try_get::<bool, _>(idx) {
                return v.to_string();
            }
            if let Ok(v) = row.try_get::<String, _>(idx) {
                return v;
            }
            if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
                return String::from_utf8_lossy(&v).into_owned();
            }
            if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
                return v.to_string();
            }
            String::new()
        })
        .collect()
}
