//! The execution contract shared by pools, connections and transactions.

use std::sync::Arc;
use std::time::Duration;

use anydb_types::Value;
use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::row::Row;

/// What a driver hands back for one statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Raw rows, keyed by the column names the driver reported
    pub rows: Vec<Row>,
    pub rows_affected: u64,
    /// Row id of the last insert, where the driver reports one
    pub last_insert_id: Option<i64>,
}

impl QueryResult {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows_affected: rows.len() as u64,
            rows,
            last_insert_id: None,
        }
    }
}

/// Something statements can be sent through: a pool, a connection or a
/// transaction.
pub trait ConnectionContext: Send + Sync {
    /// Executes `sql` with positional `params`.
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>>;
}

/// A transaction holding one connection until it is committed or rolled back.
///
/// Dropping a transaction without finishing it rolls it back.
pub trait TransactionContext: ConnectionContext {
    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<()>>;

    fn rollback(self: Box<Self>) -> BoxFuture<'static, Result<()>>;
}

/// A connection pool. Queries sent to the pool itself run on any free
/// connection.
pub trait Pool: ConnectionContext {
    /// Checks out a connection and starts a transaction on it.
    fn begin(&self) -> BoxFuture<'_, Result<Box<dyn TransactionContext>>>;

    /// Closes idle connections and rejects further work.
    fn close(&self) -> BoxFuture<'_, Result<()>>;

    fn is_closed(&self) -> bool;

    /// Short driver label used in log events, e.g. `sqlite.rusqlite`.
    fn driver(&self) -> &'static str;
}

impl<T: ConnectionContext + ?Sized> ConnectionContext for Arc<T> {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>> {
        (**self).query(sql, params)
    }
}

impl<T: ConnectionContext + ?Sized> ConnectionContext for Box<T> {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>> {
        (**self).query(sql, params)
    }
}

/// Pool sizing, as in `connections = { min = 1, max = 10 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolConfig {
    /// Connections opened up front
    pub min: u32,
    /// Upper bound on open connections
    pub max: u32,
    /// How long a query waits for a free connection before failing
    pub acquire_timeout_ms: u64,
}

const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 30_000;

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min: 0,
            max: 10,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
        }
    }
}

impl PoolConfig {
    pub fn new(min: u32, max: u32) -> Self {
        Self {
            min,
            max: max.max(1),
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
        }
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// `max`, never less than one.
    pub fn max_connections(&self) -> usize {
        self.max.max(1) as usize
    }

    /// `min`, clamped to `max_connections`.
    pub fn min_connections(&self) -> usize {
        (self.min as usize).min(self.max_connections())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }
}
