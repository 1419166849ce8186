use anydb_core::{BoxFuture, ConnectionContext, QueryResult, Result, TransactionContext, Value};

/// A transaction started by [`Database::begin`](crate::Database::begin).
///
/// Pass it to [`ExtQuery::exec_within`](crate::ExtQuery::exec_within) to run
/// extended queries inside it. Dropping it without [`commit`](Self::commit)
/// rolls it back.
pub struct Transaction {
    inner: Box<dyn TransactionContext>,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction").finish_non_exhaustive()
    }
}

impl Transaction {
    pub(crate) fn new(inner: Box<dyn TransactionContext>) -> Self {
        Self { inner }
    }

    /// Raw passthrough to the transaction's connection.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.inner.query(sql, params).await
    }

    pub async fn commit(self) -> Result<()> {
        self.inner.commit().await
    }

    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await
    }
}

impl ConnectionContext for Transaction {
    fn query<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Result<QueryResult>> {
        self.inner.query(sql, params)
    }
}
