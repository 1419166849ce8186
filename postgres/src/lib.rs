//! PostgreSQL pool for anydb, backed by tokio-postgres.
//!
//! ```no_run
//! # async fn run() -> anydb_core::Result<()> {
//! use anydb_core::{ConnectionContext, PoolConfig, Value};
//! use anydb_postgres::PgPool;
//!
//! let pool = PgPool::open("postgres://postgres@localhost/app", PoolConfig::new(1, 10))?;
//! let result = pool.query("SELECT $1::int4 AS n", &[Value::Integer(7)]).await?;
//! assert_eq!(result.rows[0]["n"], 7);
//! # Ok(())
//! # }
//! ```

mod common;
mod pool;
mod rows;
mod transaction;

pub use common::PostgresTransactionType;
pub use pool::PgPool;
pub use transaction::PgTransaction;
