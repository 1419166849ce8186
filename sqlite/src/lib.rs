//! SQLite pool for anydb, backed by rusqlite.
//!
//! ```no_run
//! # async fn run() -> anydb_core::Result<()> {
//! use anydb_core::{ConnectionContext, PoolConfig};
//! use anydb_sqlite::SqlitePool;
//!
//! let pool = SqlitePool::open("sqlite3:///tmp/app.db", PoolConfig::default())?;
//! let result = pool.query("SELECT 1 AS one", &[]).await?;
//! assert_eq!(result.rows.len(), 1);
//! # Ok(())
//! # }
//! ```

mod connection;
mod pool;
mod transaction;
mod url;

pub use connection::SQLiteTransactionType;
pub use pool::SqlitePool;
pub use transaction::SqliteTransaction;
pub use url::SqliteTarget;
