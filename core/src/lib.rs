//! Core building blocks shared by the anydb crates: the runtime statement
//! builder, the execution contract drivers implement, connection slots, row
//! normalization and the error type.

pub mod builder;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expressions;
pub mod pool;
pub mod row;
pub mod schema;
pub mod sql;
pub mod tracing;

// Re-export key types and traits
pub use anydb_types::Value;
pub use builder::{IndexDef, IntoSelectList, Query, Values};
pub use context::{ConnectionContext, Pool, PoolConfig, QueryResult, TransactionContext};
pub use dialect::{Dialect, DialectExt, dialect_name};
pub use error::{AnydbError, Result};
pub use expressions::{Condition, IntoOperand};
pub use row::{Row, normalize};
pub use schema::{AsTable, Column, ColumnDef, ColumnType, JoinBuilder, OrderBy, Source, TableDef};
pub use sql::{Sql, SqlChunk, Statement, Token, params_json};

/// Futures returned by the execution traits.
pub use futures_util::future::BoxFuture;
