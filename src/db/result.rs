//! `DBResult` and the three-shape JSON rendering
//! `MakeResultJson()` describes — this is the stable shape the DB service
//! embeds in its response envelope's `data.result`.

use serde_json::{json, Value};

/// Which of the two normalized result shapes a query produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    None,
    ResultSet,
    ExecResult,
}

/// Normalized outcome of one `execute()` call. NULLs are already flattened
/// to `""` by the caller before a `DbResult` is constructed.
#[derive(Debug, Clone, Default)]
pub struct DbResult {
    pub success: bool,
    pub error_code: i32,
    pub error_msg: String,
    pub kind: Option<ResultKind>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub affected_rows: u64,
    pub last_insert_id: i64,
}

impl DbResult {
    pub fn result_set(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            success: true,
            kind: Some(ResultKind::ResultSet),
            columns,
            rows,
            ..Default::default()
        }
    }

    pub fn exec_result(affected_rows: u64, last_insert_id: i64) -> Self {
        Self {
            success: true,
            kind: Some(ResultKind::ExecResult),
            affected_rows,
            last_insert_id,
            ..Default::default()
        }
    }

    pub fn failure(error_code: i32, error_msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error_code,
            error_msg: error_msg.into(),
            ..Default::default()
        }
    }

    /// Renders the three cases `MakeResultJson()` describes: `result_set`
    /// (with `rowCount`), `exec_result`, or plain `ok` when the driver gave
    /// back neither (e.g. a DDL statement with no row metadata).
    pub fn to_json(&self) -> Value {
        match self.kind {
            Some(ResultKind::ResultSet) => json!({
                "type": "result_set",
                "columns": self.columns,
                "rows": self.rows,
                "rowCount": self.rows.len(),
            }),
            Some(ResultKind::ExecResult) => json!({
                "type": "exec_result",
                "affectedRows": self.affected_rows,
                "lastInsertId": self.last_insert_id,
            }),
            None => json!({ "type": "ok" }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_set_renders_row_count() {
        let result = DbResult::result_set(
            vec!["1".to_string()],
            vec![vec!["1".to_string()]],
        );
        let json = result.to_json();
        assert_eq!(json["type"], "result_set");
        assert_eq!(json["rowCount"], 1);
        assert_eq!(json["rows"][0][0], "1");
    }

    #[test]
    fn exec_result_renders_affected_rows() {
        let result = DbResult::exec_result(3, 42);
        let json = result.to_json();
        assert_eq!(json["type"], "exec_result");
        assert_eq!(json["affectedRows"], 3);
        assert_eq!(json["lastInsertId"], 42);
    }

    #[test]
    fn default_kind_renders_ok() {
        let result = DbResult::failure(0, "");
        // Bare ok shape is used when a statement produced neither a
        // result set nor affected-rows metadata; failures render through
        // the envelope's status instead, not through `to_json`.
        let mut ok_result = result;
        ok_result.kind = None;
        assert_eq!(ok_result.to_json(), json!({"type": "ok"}));
    }
}
