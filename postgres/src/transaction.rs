use anydb_core::pool::Lease;
use anydb_core::{
    AnydbError, BoxFuture, ConnectionContext, QueryResult, Result, TransactionContext, Value,
};
use tokio::sync::Mutex;
use tokio_postgres::Client;

use crate::common::PostgresTransactionType;
use crate::pool::release;
use crate::rows;

/// A transaction pinned to one pooled client.
///
/// Dropping an unfinished transaction rolls it back in the background
/// before the client is reused.
pub struct PgTransaction {
    client: Mutex<Option<Lease<Client>>>,
}

fn finished() -> AnydbError {
    AnydbError::Transaction("transaction already finished".into())
}

impl PgTransaction {
    pub(crate) async fn begin(
        lease: Lease<Client>,
        transaction_type: PostgresTransactionType,
    ) -> Result<Self> {
        if let Err(err) = lease.batch_execute(&transaction_type.begin_sql()).await {
            release(lease);
            return Err(AnydbError::execution(err));
        }
        anydb_core::anydb_trace_tx!("begin", "postgres.tokio");
        Ok(Self {
            client: Mutex::new(Some(lease)),
        })
    }

    /// Ends the transaction. Committing on a closed pool rolls back and
    /// reports [`AnydbError::Closed`].
    async fn finish(&self, commit: bool) -> Result<()> {
        let lease = self.client.lock().await.take().ok_or_else(finished)?;
        if commit && lease.pool_closed() {
            let _ = lease.batch_execute("ROLLBACK").await;
            return Err(AnydbError::Closed);
        }
        let sql = if commit { "COMMIT" } else { "ROLLBACK" };
        let result = lease.batch_execute(sql).await;
        release(lease);
        result.map_err(AnydbError::execution)
    }
}

impl ConnectionContext for PgTransaction {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>> {
        Box::pin(async move {
            anydb_core::anydb_trace_query!(sql, params.len());
            let guard = self.client.lock().await;
            let lease = guard.as_ref().ok_or_else(finished)?;
            if lease.pool_closed() {
                return Err(AnydbError::Closed);
            }
            rows::execute(lease, sql, params).await
        })
    }
}

impl TransactionContext for PgTransaction {
    fn commit(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            self.finish(true).await?;
            anydb_core::anydb_trace_tx!("commit", "postgres.tokio");
            Ok(())
        })
    }

    fn rollback(self: Box<Self>) -> BoxFuture<'static, Result<()>> {
        Box::pin(async move {
            self.finish(false).await?;
            anydb_core::anydb_trace_tx!("rollback", "postgres.tokio");
            Ok(())
        })
    }
}

impl Drop for PgTransaction {
    fn drop(&mut self) {
        let Some(lease) = self.client.get_mut().take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if lease.batch_execute("ROLLBACK").await.is_err() {
                        lease.discard();
                    } else {
                        release(lease);
                    }
                });
            }
            // without a runtime the client cannot be cleaned, so it is not reused
            Err(_) => lease.discard(),
        }
        anydb_core::anydb_trace_tx!("rollback", "postgres.tokio");
    }
}
