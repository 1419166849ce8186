use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anydb_core::{
    AnydbError, Column, ConnectionContext, Dialect, Pool, PoolConfig, QueryResult, Result,
    TableDef, Value, dialect_name,
};

use crate::config::Config;
use crate::model::{Model, ModelConfig};
use crate::naming::{self, Projection};
use crate::transaction::Transaction;

/// A handle to one database: its pool and its model registry.
///
/// Cloning is cheap; clones share the pool and the models. Models and
/// queries keep only a weak reference back, so dropping the last handle
/// releases the pool.
#[derive(Clone)]
pub struct Database {
    shared: Arc<Shared>,
}

pub(crate) struct Shared {
    config: Config,
    dialect: Dialect,
    pool: RwLock<Option<Arc<dyn Pool>>>,
    models: RwLock<HashMap<String, Model>>,
}

impl Shared {
    pub(crate) fn pool(&self) -> Result<Arc<dyn Pool>> {
        self.pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(AnydbError::Closed)
    }

    pub(crate) fn model(&self, name: &str) -> Option<Model> {
        self.models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.shared.dialect)
            .field("open", &self.is_open())
            .finish()
    }
}

/// The dialect a connection url selects.
///
/// The url scheme names the dialect; `sqlite3` is accepted for SQLite.
pub fn extract_dialect(url: &str) -> Result<Dialect> {
    let name = dialect_name(url)
        .ok_or_else(|| AnydbError::Initialization(format!("url has no scheme: {url}")))?;
    Dialect::parse(name)
        .ok_or_else(|| AnydbError::Initialization(format!("unsupported dialect `{name}`")))
}

fn open_pool(dialect: Dialect, url: &str, connections: PoolConfig) -> Result<Arc<dyn Pool>> {
    match dialect {
        Dialect::SQLite => open_sqlite(url, connections).map_err(|err| {
            AnydbError::Initialization(format!("Unable to load sqlite pool: {err}"))
        }),
        Dialect::PostgreSQL => open_postgres(url, connections),
        Dialect::MySQL => Err(AnydbError::Initialization(format!(
            "no pool available for {dialect} urls"
        ))),
    }
}

#[cfg(feature = "sqlite")]
fn open_sqlite(url: &str, connections: PoolConfig) -> Result<Arc<dyn Pool>> {
    Ok(Arc::new(anydb_sqlite::SqlitePool::open(url, connections)?))
}

#[cfg(not(feature = "sqlite"))]
fn open_sqlite(_url: &str, _connections: PoolConfig) -> Result<Arc<dyn Pool>> {
    Err(AnydbError::Initialization(
        "anydb was built without the `sqlite` feature".into(),
    ))
}

#[cfg(feature = "postgres")]
fn open_postgres(url: &str, connections: PoolConfig) -> Result<Arc<dyn Pool>> {
    Ok(Arc::new(anydb_postgres::PgPool::open(url, connections)?))
}

#[cfg(not(feature = "postgres"))]
fn open_postgres(_url: &str, _connections: PoolConfig) -> Result<Arc<dyn Pool>> {
    Err(AnydbError::Initialization(
        "anydb was built without the `postgres` feature".into(),
    ))
}

impl Database {
    /// Picks the dialect from the url and opens the pool.
    pub fn new(config: Config) -> Result<Self> {
        let dialect = extract_dialect(&config.url)?;
        let db = Self {
            shared: Arc::new(Shared {
                config,
                dialect,
                pool: RwLock::new(None),
                models: RwLock::new(HashMap::new()),
            }),
        };
        db.open()?;
        Ok(db)
    }

    /// Shorthand for `Database::new(Config::new(url))`.
    pub fn connect(url: &str) -> Result<Self> {
        Self::new(Config::new(url))
    }

    /// Opens the pool if it is not open. Calling it on an open database does
    /// nothing; after [`close`](Self::close) it opens a fresh pool.
    pub fn open(&self) -> Result<()> {
        let mut slot = self
            .shared
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            let config = &self.shared.config;
            *slot = Some(open_pool(self.shared.dialect, &config.url, config.connections)?);
        }
        Ok(())
    }

    /// Closes the pool. Later queries fail with [`AnydbError::Closed`] until
    /// [`open`](Self::open) is called again.
    pub async fn close(&self) -> Result<()> {
        let pool = self
            .shared
            .pool
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match pool {
            Some(pool) => pool.close().await,
            None => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.shared
            .pool
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.shared.dialect
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    /// The open pool, or [`AnydbError::Closed`].
    pub fn pool(&self) -> Result<Arc<dyn Pool>> {
        self.shared.pool()
    }

    /// Raw passthrough to the pool.
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let pool = self.pool()?;
        pool.query(sql, params).await
    }

    /// Starts a transaction on a pooled connection.
    pub async fn begin(&self) -> Result<Transaction> {
        let pool = self.pool()?;
        let tx = pool.begin().await?;
        Ok(Transaction::new(tx))
    }

    /// Runs `f` in a transaction, committing when it returns `Ok` and
    /// rolling back when it returns `Err`.
    pub async fn transaction<F, R>(&self, f: F) -> Result<R>
    where
        F: AsyncFnOnce(&Transaction) -> Result<R>,
    {
        let tx = self.begin().await?;
        match f(&tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                // the caller's error wins over a failed rollback
                let _ = tx.rollback().await;
                Err(err)
            }
        }
    }

    /// Defines a model and registers it under its name, replacing any model
    /// registered under that name before.
    pub fn define(&self, config: ModelConfig) -> Model {
        let table = TableDef::new(self.shared.dialect, config.name.clone(), config.columns);
        let model = Model::new(table, Arc::from(config.has), Arc::downgrade(&self.shared));
        self.shared
            .models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(config.name, model.clone());
        model
    }

    /// Looks up a defined model.
    pub fn model(&self, name: &str) -> Result<Model> {
        self.shared
            .model(name)
            .ok_or_else(|| AnydbError::UnknownModel(name.to_owned()))
    }

    /// See [`naming::all_of`].
    pub fn all_of<I>(&self, items: I) -> Result<Vec<Column>>
    where
        I: IntoIterator,
        I::Item: Into<Projection>,
    {
        naming::all_of(items)
    }
}
