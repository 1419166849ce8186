//! Statement execution on a single rusqlite connection.

use anydb_core::{AnydbError, QueryResult, Result, Row, Value};
use rusqlite::{Connection, params_from_iter};

/// SQLite transaction types
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SQLiteTransactionType {
    #[default]
    /// A deferred transaction is the default - it does not acquire locks until needed
    Deferred,
    /// An immediate transaction acquires a RESERVED lock immediately
    Immediate,
    /// An exclusive transaction acquires an EXCLUSIVE lock immediately
    Exclusive,
}

impl SQLiteTransactionType {
    pub(crate) fn begin_sql(self) -> &'static str {
        match self {
            SQLiteTransactionType::Deferred => "BEGIN DEFERRED",
            SQLiteTransactionType::Immediate => "BEGIN IMMEDIATE",
            SQLiteTransactionType::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

impl From<SQLiteTransactionType> for rusqlite::TransactionBehavior {
    fn from(tx_type: SQLiteTransactionType) -> Self {
        match tx_type {
            SQLiteTransactionType::Deferred => rusqlite::TransactionBehavior::Deferred,
            SQLiteTransactionType::Immediate => rusqlite::TransactionBehavior::Immediate,
            SQLiteTransactionType::Exclusive => rusqlite::TransactionBehavior::Exclusive,
        }
    }
}

impl From<rusqlite::TransactionBehavior> for SQLiteTransactionType {
    fn from(behavior: rusqlite::TransactionBehavior) -> Self {
        match behavior {
            rusqlite::TransactionBehavior::Immediate => SQLiteTransactionType::Immediate,
            rusqlite::TransactionBehavior::Exclusive => SQLiteTransactionType::Exclusive,
            _ => SQLiteTransactionType::Deferred,
        }
    }
}

/// Runs one statement. Statements that report result columns are read row
/// by row; everything else is executed for its change count.
pub(crate) fn execute(conn: &Connection, sql: &str, params: &[Value]) -> Result<QueryResult> {
    let mut stmt = conn.prepare(sql).map_err(AnydbError::execution)?;
    let readonly = stmt.readonly();
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    if names.is_empty() {
        let changed = stmt
            .execute(params_from_iter(params))
            .map_err(AnydbError::execution)?;
        return Ok(QueryResult {
            rows: Vec::new(),
            rows_affected: changed as u64,
            last_insert_id: (!readonly).then(|| conn.last_insert_rowid()),
        });
    }

    let mut rows = stmt
        .query(params_from_iter(params))
        .map_err(AnydbError::execution)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(AnydbError::execution)? {
        let mut record = Row::new();
        for (index, name) in names.iter().enumerate() {
            let value = row.get_ref(index).map_err(AnydbError::execution)?;
            record.insert(name.clone(), Value::from(value).into_json());
        }
        out.push(record);
    }
    drop(rows);

    if readonly {
        return Ok(QueryResult::from_rows(out));
    }
    Ok(QueryResult {
        rows: out,
        rows_affected: conn.changes(),
        last_insert_id: Some(conn.last_insert_rowid()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, score REAL)")
            .unwrap();
        conn
    }

    #[test]
    fn writes_report_changes_and_rowid() {
        let conn = conn();
        let result = execute(
            &conn,
            "INSERT INTO users (name, score) VALUES (?, ?), (?, ?)",
            &[Value::from("a"), Value::from(1.5), Value::from("b"), Value::Null],
        )
        .unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.rows_affected, 2);
        assert_eq!(result.last_insert_id, Some(2));
    }

    #[test]
    fn reads_keep_column_order_and_types() {
        let conn = conn();
        execute(&conn, "INSERT INTO users (name, score) VALUES ('a', 2.5)", &[]).unwrap();

        let result = execute(&conn, "SELECT score, name, id FROM users WHERE id = ?", &[Value::from(1)])
            .unwrap();
        assert_eq!(result.rows.len(), 1);
        let keys: Vec<_> = result.rows[0].keys().cloned().collect();
        assert_eq!(keys, ["score", "name", "id"]);
        assert_eq!(
            serde_json::Value::Object(result.rows[0].clone()),
            json!({"score": 2.5, "name": "a", "id": 1})
        );
        assert_eq!(result.last_insert_id, None);
    }

    #[test]
    fn returning_yields_rows() {
        let conn = conn();
        let result = execute(&conn, "INSERT INTO users (name) VALUES (?) RETURNING id", &[Value::from("x")])
            .unwrap();
        assert_eq!(serde_json::Value::Object(result.rows[0].clone()), json!({"id": 1}));
        assert_eq!(result.rows_affected, 1);
    }

    #[test]
    fn driver_errors_are_execution_errors() {
        let conn = conn();
        let err = execute(&conn, "SELECT * FROM missing", &[]).unwrap_err();
        assert!(matches!(err, AnydbError::Execution(_)));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn begin_statements() {
        assert_eq!(SQLiteTransactionType::default().begin_sql(), "BEGIN DEFERRED");
        assert_eq!(
            SQLiteTransactionType::from(rusqlite::TransactionBehavior::Immediate),
            SQLiteTransactionType::Immediate
        );
    }
}
