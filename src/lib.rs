//! # anydb
//!
//! Relation-aware queries with pooled execution, for SQLite and PostgreSQL.
//!
//! A [`Database`] picks its SQL dialect from the connection url and opens a
//! pool for it. Tables are defined as [`Model`]s, which can declare has-one
//! and has-many relations to other models by name. Builder operations on a
//! model return [`ExtQuery`]s that render and execute themselves, and shape
//! their rows into keyed maps on request.
//!
//! ## Quick Start
//!
//! ```no_run
//! use anydb::prelude::*;
//!
//! # async fn run() -> anydb::Result<()> {
//! let db = Database::connect("sqlite3://:memory:")?;
//!
//! let users = db.define(
//!     ModelConfig::new("users")
//!         .column(ColumnDef::new("id", "integer").primary_key())
//!         .column(ColumnDef::new("name", "text"))
//!         .has_many("posts", "posts"),
//! );
//! let posts = db.define(
//!     ModelConfig::new("posts")
//!         .column(ColumnDef::new("id", "integer").primary_key())
//!         .column(ColumnDef::new("user_id", "integer"))
//!         .column(ColumnDef::new("title", "text")),
//! );
//! users.create().exec().await?;
//! posts.create().exec().await?;
//!
//! // users.posts[] resolves lazily, by name
//! let user_posts = users.relation("posts")?;
//! let id = users.column("id").unwrap();
//! let user_id = user_posts.column("user_id").unwrap();
//! let rows = users
//!     .from(users.left_join(&user_posts).on(user_id.eq(&id)))
//!     .select_deep([&users, &user_posts])?
//!     .all()
//!     .await?;
//! // [{"users": {"id": 1, "name": "alice", "posts": [{"id": 7, ...}]}}]
//! # let _ = rows;
//!
//! let names = users.select(users.columns()).all_object("id", Mapper::Default).await?;
//! // {"1": "alice"}
//! # let _ = names;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature    | Pool                          |
//! |------------|-------------------------------|
//! | `sqlite`   | rusqlite, `sqlite3://` urls   |
//! | `postgres` | tokio-postgres, `postgres://` |
//! | `tracing`  | query, transaction and pool events via `tracing` |

mod config;
mod database;
mod model;
mod naming;
mod query;
mod shape;
mod transaction;

pub use config::{CONFIG_FILE, Config, ConfigError, URL_ENV};
pub use database::{Database, extract_dialect};
pub use model::{Model, ModelConfig, ModelEvent, RelationSpec, RelationTarget};
pub use naming::{Projection, all_of, column_name};
pub use query::{ExtQuery, IntoExtQuery};
pub use shape::{Mapper, key_string, shape_rows};
pub use transaction::Transaction;

pub use anydb_core::{
    AnydbError, BoxFuture, Column, ColumnDef, ColumnType, Condition, ConnectionContext, Dialect,
    IndexDef, OrderBy, Pool, PoolConfig, Query, QueryResult, Result, Row, Statement, TableDef,
    TransactionContext, Value, Values, expressions, normalize,
};

#[cfg(feature = "sqlite")]
pub use anydb_sqlite as sqlite;

#[cfg(feature = "postgres")]
pub use anydb_postgres as postgres;

/// Everything needed to define models and run queries.
pub mod prelude {
    pub use crate::{
        AnydbError, Column, ColumnDef, Condition, Config, ConnectionContext, Database, ExtQuery,
        IndexDef, Mapper, Model, ModelConfig, Projection, Result, Row, Transaction, Value, Values,
    };
    pub use anydb_core::expressions::{and, not, or};
}
