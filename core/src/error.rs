use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum AnydbError {
    /// The pool or its driver could not be loaded
    #[error("{0}")]
    Initialization(String),

    /// A relation's target model was not registered when first accessed
    #[error("Reference not found: relation `{relation}` of `{model}` targets an undefined model")]
    ReferenceNotFound { model: String, relation: String },

    /// Execution failure annotated with the statement that caused it
    #[error("{source} in query `{sql}` with params {params}")]
    Query {
        #[source]
        source: Box<AnydbError>,
        sql: String,
        /// JSON-encoded parameter list
        params: String,
    },

    /// The relation name was never declared on the model
    #[error("Unknown relation `{relation}` on `{model}`")]
    UnknownRelation { model: String, relation: String },

    /// No model was defined under that name
    #[error("Unknown model `{0}`")]
    UnknownModel(String),

    /// Projection argument is neither a model nor an aggregate column
    #[error("Unsupported projection: {0}")]
    UnsupportedProjection(String),

    /// Error in statement
    #[error("Statement error: {0}")]
    Statement(String),

    /// The database handle or pool has been closed
    #[error("Database is closed")]
    Closed,

    /// No pooled connection became free in time
    #[error("Timed out after {0:?} waiting for a pooled connection")]
    PoolTimeout(std::time::Duration),

    /// Error executing a query
    #[error("Execution error: {0}")]
    Execution(#[source] BoxError),

    /// Error with transaction
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),
}

impl AnydbError {
    /// Wraps any driver error as an execution failure.
    pub fn execution<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        AnydbError::Execution(err.into())
    }

    /// Annotates an execution failure with the statement text and parameters.
    pub fn in_query(self, sql: impl Into<String>, params: impl Into<String>) -> Self {
        AnydbError::Query {
            source: Box::new(self),
            sql: sql.into(),
            params: params.into(),
        }
    }

    /// Returns true if this error (or the error it annotates) reports a closed
    /// database.
    pub fn is_closed(&self) -> bool {
        match self {
            AnydbError::Closed => true,
            AnydbError::Query { source, .. } => source.is_closed(),
            _ => false,
        }
    }

    pub fn is_pool_timeout(&self) -> bool {
        match self {
            AnydbError::PoolTimeout(_) => true,
            AnydbError::Query { source, .. } => source.is_pool_timeout(),
            _ => false,
        }
    }
}

/// Result type for database operations
pub type Result<T> = std::result::Result<T, AnydbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_error_message_carries_statement_and_params() {
        let err = AnydbError::execution("no such table: users")
            .in_query("SELECT * FROM \"users\"", r#"[1,"a"]"#);
        assert_eq!(
            err.to_string(),
            "Execution error: no such table: users in query `SELECT * FROM \"users\"` with params [1,\"a\"]"
        );
    }

    #[test]
    fn closed_is_seen_through_query_wrapper() {
        assert!(AnydbError::Closed.in_query("SELECT 1", "[]").is_closed());
        assert!(!AnydbError::Statement("x".into()).is_closed());
    }

    #[test]
    fn pool_timeout_is_seen_through_query_wrapper() {
        let err = AnydbError::PoolTimeout(std::time::Duration::from_millis(50))
            .in_query("SELECT 1", "[]");
        assert!(err.is_pool_timeout());
        assert!(!err.is_closed());
    }
}
