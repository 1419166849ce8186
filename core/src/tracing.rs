//! Tracing utilities for anydb query, transaction and pool observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.
//!
//! The `cfg` is evaluated in the crate that expands the macro, so every crate
//! using them declares its own `tracing` feature.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// anydb_trace_query!(&statement.text, statement.params.len());
/// ```
#[macro_export]
macro_rules! anydb_trace_query {
    ($sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(sql = %$sql, params = $param_count, "anydb.query");
    };
}

/// Emit an info-level tracing event for transaction lifecycle (begin, commit, rollback).
///
/// ```ignore
/// anydb_trace_tx!("begin", "sqlite.rusqlite");
/// anydb_trace_tx!("commit", "postgres.tokio");
/// ```
#[macro_export]
macro_rules! anydb_trace_tx {
    ($event:literal, $driver:literal) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event, driver = $driver, "anydb.transaction");
    };
}

/// Emit an info-level tracing event for pool lifecycle (open, close).
///
/// ```ignore
/// anydb_trace_pool!("open", "sqlite.rusqlite");
/// ```
#[macro_export]
macro_rules! anydb_trace_pool {
    ($event:literal, $driver:expr) => {
        #[cfg(feature = "tracing")]
        tracing::info!(event = $event, driver = %$driver, "anydb.pool");
    };
}
