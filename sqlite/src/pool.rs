use std::sync::Arc;

use anydb_core::pool::{ConnectionSlots, Lease};
use anydb_core::{
    AnydbError, BoxFuture, ConnectionContext, Pool, PoolConfig, QueryResult, Result,
    TransactionContext, Value,
};
use rusqlite::Connection;

use crate::connection::{self, SQLiteTransactionType};
use crate::transaction::SqliteTransaction;
use crate::url::SqliteTarget;

pub(crate) const DRIVER: &str = "sqlite.rusqlite";

/// A pool of rusqlite connections.
///
/// Statements run on tokio's blocking thread pool. An in-memory database
/// lives only as long as its connection, so a memory pool holds exactly one.
pub struct SqlitePool {
    target: SqliteTarget,
    slots: Arc<ConnectionSlots<Connection>>,
    transaction_type: SQLiteTransactionType,
}

impl std::fmt::Debug for SqlitePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlitePool")
            .field("target", &self.target)
            .field("idle", &self.slots.idle_count())
            .field("closed", &self.slots.is_closed())
            .finish()
    }
}

impl SqlitePool {
    /// Opens the pool described by `url`.
    ///
    /// At least one connection is opened right away, so a bad path fails
    /// here rather than on the first query.
    pub fn open(url: &str, config: PoolConfig) -> Result<Self> {
        let target = SqliteTarget::parse(url)?;
        let max = if target.is_memory() {
            1
        } else {
            config.max_connections()
        };
        let min = config.min_connections().clamp(1, max);

        let initial = (0..min)
            .map(|_| target.connect())
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|err| AnydbError::Initialization(err.to_string()))?;

        anydb_core::anydb_trace_pool!("open", DRIVER);
        Ok(Self {
            target,
            slots: ConnectionSlots::new(max, config.acquire_timeout(), initial),
            transaction_type: SQLiteTransactionType::default(),
        })
    }

    /// Sets the locking mode used by [`Pool::begin`].
    pub fn with_transaction_type(mut self, transaction_type: SQLiteTransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn target(&self) -> &SqliteTarget {
        &self.target
    }

    async fn lease(&self) -> Result<Lease<Connection>> {
        let target = self.target.clone();
        self.slots
            .acquire(|| async move {
                tokio::task::spawn_blocking(move || target.connect())
                    .await
                    .map_err(AnydbError::execution)?
                    .map_err(AnydbError::execution)
            })
            .await
    }
}

impl ConnectionContext for SqlitePool {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>> {
        Box::pin(async move {
            anydb_core::anydb_trace_query!(sql, params.len());
            let lease = self.lease().await?;
            let sql = sql.to_owned();
            let params = params.to_vec();
            tokio::task::spawn_blocking(move || connection::execute(&lease, &sql, &params))
                .await
                .map_err(AnydbError::execution)?
        })
    }
}

impl Pool for SqlitePool {
    fn begin(&self) -> BoxFuture<'_, Result<Box<dyn TransactionContext>>> {
        Box::pin(async move {
            let lease = self.lease().await?;
            let tx = SqliteTransaction::begin(lease, self.transaction_type).await?;
            Ok(Box::new(tx) as Box<dyn TransactionContext>)
        })
    }

    fn close(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            self.slots.close();
            anydb_core::anydb_trace_pool!("close", DRIVER);
            Ok(())
        })
    }

    fn is_closed(&self) -> bool {
        self.slots.is_closed()
    }

    fn driver(&self) -> &'static str {
        DRIVER
    }
}
