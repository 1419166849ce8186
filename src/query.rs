//! Queries extended with execution and result shaping.

use std::sync::{Arc, Weak};

use anydb_core::{
    AnydbError, ColumnDef, Condition, ConnectionContext, IndexDef, IntoSelectList, OrderBy, Pool,
    Query, QueryResult, Result, Row, Source, Statement, Values, normalize,
};
use serde_json::{Map, Value as JsonValue};

use crate::database::Shared;
use crate::naming::{self, Projection};
use crate::shape::{self, Mapper};

/// A builder query bound to the database it came from.
///
/// Builder calls return new queries and never touch the receiver. Every
/// execution renders the statement again and sends it afresh; nothing is
/// cached between runs.
#[derive(Debug, Clone)]
pub struct ExtQuery {
    query: Query,
    db: Weak<Shared>,
}

/// Conversion into an [`ExtQuery`], leaving an existing one untouched.
pub trait IntoExtQuery {
    /// Wraps `self`, borrowing the database binding from `owner`.
    fn into_ext_query(self, owner: &ExtQuery) -> ExtQuery;
}

impl IntoExtQuery for Query {
    fn into_ext_query(self, owner: &ExtQuery) -> ExtQuery {
        ExtQuery::new(self, owner.db.clone())
    }
}

impl IntoExtQuery for ExtQuery {
    fn into_ext_query(self, _owner: &ExtQuery) -> ExtQuery {
        self
    }
}

impl ExtQuery {
    pub(crate) fn new(query: Query, db: Weak<Shared>) -> Self {
        Self { query, db }
    }

    /// The underlying builder node.
    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn into_query(self) -> Query {
        self.query
    }

    pub fn to_statement(&self) -> Result<Statement> {
        self.query.to_statement()
    }

    fn wrap(&self, next: impl IntoExtQuery) -> ExtQuery {
        next.into_ext_query(self)
    }

    fn pool(&self) -> Result<Arc<dyn Pool>> {
        self.db.upgrade().ok_or(AnydbError::Closed)?.pool()
    }

    // ==================== execution ====================

    /// Runs the statement through `ctx` and returns the context's result
    /// untouched. Failures carry the statement text and parameters.
    pub async fn exec_raw<C>(&self, ctx: &C) -> Result<QueryResult>
    where
        C: ConnectionContext + ?Sized,
    {
        let statement = self.to_statement()?;
        ctx.query(&statement.text, &statement.params)
            .await
            .map_err(|err| err.in_query(&statement.text, statement.params_json()))
    }

    /// Runs the statement through `ctx`, returning normalized rows.
    pub async fn exec_within<C>(&self, ctx: &C) -> Result<Vec<Row>>
    where
        C: ConnectionContext + ?Sized,
    {
        let result = self.exec_raw(ctx).await?;
        Ok(result.rows.into_iter().map(normalize).collect())
    }

    /// Runs the statement on the database's pool.
    pub async fn exec(&self) -> Result<Vec<Row>> {
        let pool = self.pool()?;
        self.exec_within(pool.as_ref()).await
    }

    pub async fn all(&self) -> Result<Vec<Row>> {
        self.exec().await
    }

    /// The first row, or `None` when there are no rows.
    pub async fn get(&self) -> Result<Option<Row>> {
        Ok(self.exec().await?.into_iter().next())
    }

    /// Rows keyed by the string form of `key_column`, shaped by `mapper`.
    pub async fn all_object(
        &self,
        key_column: &str,
        mapper: impl Into<Mapper>,
    ) -> Result<Map<String, JsonValue>> {
        self.all_object_filtered(key_column, mapper, |_| true).await
    }

    /// Like [`all_object`](Self::all_object), skipping rows `filter` rejects.
    pub async fn all_object_filtered<F>(
        &self,
        key_column: &str,
        mapper: impl Into<Mapper>,
        filter: F,
    ) -> Result<Map<String, JsonValue>>
    where
        F: Fn(&Row) -> bool,
    {
        let mapper = mapper.into();
        let rows = self.exec().await?;
        Ok(shape::shape_rows(&rows, key_column, &mapper, filter))
    }

    // ==================== builder operations ====================

    pub fn select(&self, columns: impl IntoSelectList) -> ExtQuery {
        self.wrap(self.query.select(columns))
    }

    /// `select(all_of(items))`
    pub fn select_deep<I>(&self, items: I) -> Result<ExtQuery>
    where
        I: IntoIterator,
        I::Item: Into<Projection>,
    {
        Ok(self.select(naming::all_of(items)?))
    }

    pub fn from(&self, source: impl Into<Source>) -> ExtQuery {
        self.wrap(self.query.from(source))
    }

    pub fn distinct(&self) -> ExtQuery {
        self.wrap(self.query.distinct())
    }

    pub fn where_(&self, condition: Condition) -> ExtQuery {
        self.wrap(self.query.where_(condition))
    }

    pub fn order_by(&self, order: impl Into<OrderBy>) -> ExtQuery {
        self.wrap(self.query.order_by(order))
    }

    pub fn group_by(&self, columns: impl IntoSelectList) -> ExtQuery {
        self.wrap(self.query.group_by(columns))
    }

    pub fn limit(&self, limit: i64) -> ExtQuery {
        self.wrap(self.query.limit(limit))
    }

    pub fn offset(&self, offset: i64) -> ExtQuery {
        self.wrap(self.query.offset(offset))
    }

    pub fn insert(&self, values: impl Into<Values>) -> ExtQuery {
        self.wrap(self.query.insert(values))
    }

    pub fn values(&self, values: impl Into<Values>) -> ExtQuery {
        self.wrap(self.query.values(values))
    }

    pub fn update(&self, values: impl Into<Values>) -> ExtQuery {
        self.wrap(self.query.update(values))
    }

    pub fn delete(&self) -> ExtQuery {
        self.wrap(self.query.delete())
    }

    pub fn returning(&self, columns: impl IntoSelectList) -> ExtQuery {
        self.wrap(self.query.returning(columns))
    }

    pub fn create(&self) -> ExtQuery {
        self.wrap(self.query.create())
    }

    pub fn drop(&self) -> ExtQuery {
        self.wrap(self.query.drop())
    }

    pub fn if_not_exists(&self) -> ExtQuery {
        self.wrap(self.query.if_not_exists())
    }

    pub fn if_exists(&self) -> ExtQuery {
        self.wrap(self.query.if_exists())
    }

    pub fn alter(&self) -> ExtQuery {
        self.wrap(self.query.alter())
    }

    pub fn add_column(&self, column: ColumnDef) -> ExtQuery {
        self.wrap(self.query.add_column(column))
    }

    pub fn drop_column(&self, name: impl Into<String>) -> ExtQuery {
        self.wrap(self.query.drop_column(name))
    }

    pub fn rename(&self, new_name: impl Into<String>) -> ExtQuery {
        self.wrap(self.query.rename(new_name))
    }

    pub fn rename_column(&self, from: impl Into<String>, to: impl Into<String>) -> ExtQuery {
        self.wrap(self.query.rename_column(from, to))
    }

    pub fn indexes(&self) -> ExtQuery {
        self.wrap(self.query.indexes())
    }

    pub fn create_index(&self, index: IndexDef) -> ExtQuery {
        self.wrap(self.query.create_index(index))
    }

    pub fn drop_index(&self, name: impl Into<String>) -> ExtQuery {
        self.wrap(self.query.drop_index(name))
    }
}
