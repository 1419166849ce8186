use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anydb_core::pool::Lease;
use anydb_core::{
    AnydbError, BoxFuture, ConnectionContext, QueryResult, Result, TransactionContext, Value,
};
use rusqlite::Connection;

use crate::connection::{self, SQLiteTransactionType};

type Slot = Arc<Mutex<Option<Lease<Connection>>>>;

/// A transaction pinned to one pooled connection.
///
/// The connection goes back to the pool on commit or rollback. Dropping an
/// unfinished transaction rolls it back.
pub struct SqliteTransaction {
    conn: Slot,
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<Lease<Connection>>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn finished() -> AnydbError {
    AnydbError::Transaction("transaction already finished".into())
}

impl SqliteTransaction {
    pub(crate) async fn begin(
        lease: Lease<Connection>,
        transaction_type: SQLiteTransactionType,
    ) -> Result<Self> {
        let lease = tokio::task::spawn_blocking(move || {
            lease
                .execute_batch(transaction_type.begin_sql())
                .map(|()| lease)
                .map_err(AnydbError::execution)
        })
        .await
        .map_err(AnydbError::execution)??;

        anydb_core::anydb_trace_tx!("begin", "sqlite.rusqlite");
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(lease))),
        })
    }

    /// Ends the transaction, releasing the connection either way. Committing
    /// on a closed pool rolls back and reports [`AnydbError::Closed`].
    async fn finish(&self, commit: bool) -> Result<()> {
        let slot = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let lease = lock(&slot).take().ok_or_else(finished)?;
            if commit && lease.pool_closed() {
                let _ = lease.execute_batch("ROLLBACK");
                return Err(AnydbError::Closed);
            }
            let sql = if commit { "COMMIT" } else { "ROLLBACK" };
            if let Err(err) = lease.execute_batch(sql) {
                // a failed COMMIT can leave the transaction open
                if !lease.is_autocommit() {
                    let _ = lease.execute_batch("ROLLBACK");
                }
                return Err(AnydbError::execution(err));
            }
            Ok(())
        })
        .await
        .map_err(AnydbError::execution)?
    }
}

impl ConnectionContext for SqliteTransaction {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>> {
        Box::pin(async move {
            anydb_core::anydb_trace_query!(sql, params.len());
            let slot = Arc::clone(&self.conn);
            let sql = sql.to_owned();
            let params = params.to_vec();
            tokio::task::spawn_blocking(move || {
                let guard = lock(&slot);
                let lease = guard.as_ref().ok_or_else(finished)?;
                if lease.pool_closed() {
                    return Err(AnydbError::Closed);
                }
                connection::execute(lease, &sql, &params)
            })
            .await
            .map_err(AnydbError::execution)?
        })
    }
}

impl TransactionContext for SqliteTransaction {
    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            self.finish(true).await?;
            anydb_core::anydb_trace_tx!("commit", "sqlite.rusqlite");
            Ok(())
        })
    }

    fn rollback(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            self.finish(false).await?;
            anydb_core::anydb_trace_tx!("rollback", "sqlite.rusqlite");
            Ok(())
        })
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if lock(&self.conn).is_none() {
            return;
        }
        let slot = Arc::clone(&self.conn);
        let rollback = move || {
            if let Some(lease) = lock(&slot).take() {
                // nobody is left to report a failure to
                let _ = lease.execute_batch("ROLLBACK");
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(rollback);
            }
            Err(_) => rollback(),
        }
        anydb_core::anydb_trace_tx!("rollback", "sqlite.rusqlite");
    }
}
