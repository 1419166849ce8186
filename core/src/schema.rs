//! Runtime table and column descriptors.
//!
//! A [`TableDef`] is cheap to clone: the column definitions live behind an
//! `Arc` and only the alias differs between a table and its `as_` copies.

use std::sync::Arc;

use anydb_types::Value;

use crate::builder::{IntoSelectList, Query, Values};
use crate::dialect::Dialect;
use crate::expressions::{self, Condition, IntoOperand};
use crate::sql::{Sql, SqlChunk, Token};

/// Column storage type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
    Blob,
    Boolean,
    Timestamp,
    /// Emitted verbatim
    Custom(String),
}

impl ColumnType {
    /// The type name used in CREATE TABLE / ADD COLUMN for `dialect`.
    pub fn sql_name(&self, dialect: Dialect) -> &str {
        match (self, dialect) {
            (ColumnType::Integer, Dialect::MySQL) => "INT",
            (ColumnType::Integer, _) => "INTEGER",
            (ColumnType::Real, Dialect::SQLite) => "REAL",
            (ColumnType::Real, Dialect::PostgreSQL) => "DOUBLE PRECISION",
            (ColumnType::Real, Dialect::MySQL) => "DOUBLE",
            (ColumnType::Text, _) => "TEXT",
            (ColumnType::Blob, Dialect::PostgreSQL) => "BYTEA",
            (ColumnType::Blob, _) => "BLOB",
            (ColumnType::Boolean, _) => "BOOLEAN",
            (ColumnType::Timestamp, Dialect::PostgreSQL) => "TIMESTAMP",
            (ColumnType::Timestamp, _) => "DATETIME",
            (ColumnType::Custom(name), _) => name,
        }
    }
}

impl From<&str> for ColumnType {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "int" | "integer" | "bigint" | "smallint" => ColumnType::Integer,
            "real" | "float" | "double" | "double precision" => ColumnType::Real,
            "text" | "string" | "varchar" => ColumnType::Text,
            "blob" | "bytea" => ColumnType::Blob,
            "bool" | "boolean" => ColumnType::Boolean,
            "timestamp" | "datetime" => ColumnType::Timestamp,
            _ => ColumnType::Custom(value.to_owned()),
        }
    }
}

/// Column definition as declared on a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: ColumnType,
    pub primary_key: bool,
    pub not_null: bool,
    pub unique: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, data_type: impl Into<ColumnType>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary_key: false,
            not_null: false,
            unique: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// `"name" TYPE [PRIMARY KEY] [NOT NULL] [UNIQUE]`
    pub(crate) fn to_sql(&self, dialect: Dialect, inline_pk: bool) -> Sql {
        let mut sql = Sql::ident(&self.name).push(SqlChunk::raw(self.data_type.sql_name(dialect)));
        if self.primary_key && inline_pk {
            sql = sql.push(Token::PRIMARY).push(Token::KEY);
        }
        if self.not_null {
            sql = sql.push(Token::NOT).push(Token::NULL);
        }
        if self.unique {
            sql = sql.push(Token::UNIQUE);
        }
        sql
    }
}

#[derive(Debug)]
struct TableInner {
    name: String,
    columns: Vec<ColumnDef>,
    dialect: Dialect,
}

/// A table descriptor, optionally aliased.
#[derive(Debug, Clone)]
pub struct TableDef {
    inner: Arc<TableInner>,
    alias: Option<String>,
}

impl TableDef {
    pub fn new(dialect: Dialect, name: impl Into<String>, columns: Vec<ColumnDef>) -> Self {
        Self {
            inner: Arc::new(TableInner {
                name: name.into(),
                columns,
                dialect,
            }),
            alias: None,
        }
    }

    /// Returns a copy of this table under `alias`, sharing the column definitions.
    pub fn as_(&self, alias: impl Into<String>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            alias: Some(alias.into()),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The alias if set, otherwise the table name.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.inner.name)
    }

    #[inline]
    pub fn dialect(&self) -> Dialect {
        self.inner.dialect
    }

    #[inline]
    pub fn column_defs(&self) -> &[ColumnDef] {
        &self.inner.columns
    }

    /// True when both descriptors share the same underlying definition,
    /// regardless of alias.
    pub fn same_table(&self, other: &TableDef) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Looks up a declared column, bound to this table (and its alias).
    pub fn column(&self, name: &str) -> Option<Column> {
        self.inner
            .columns
            .iter()
            .find(|c| c.name == name)
            .map(|def| Column::plain(self, def))
    }

    /// All declared columns in declaration order.
    pub fn columns(&self) -> Vec<Column> {
        self.inner
            .columns
            .iter()
            .map(|def| Column::plain(self, def))
            .collect()
    }

    /// `"table".*`
    pub fn star(&self) -> Column {
        Column {
            table: self.clone(),
            name: String::from("*"),
            primary_key: false,
            alias: None,
            expr: ColumnExpr::Star,
        }
    }

    /// `COUNT(*)`, aliased `<table>_count`
    pub fn count_star(&self) -> Column {
        Column {
            table: self.clone(),
            name: String::from("count"),
            primary_key: false,
            alias: Some(format!("{}_count", self.display_name())),
            expr: ColumnExpr::CountStar,
        }
    }

    /// `"name"` or `"name" AS "alias"` as it appears in FROM / JOIN.
    pub(crate) fn reference(&self) -> Sql {
        let sql = Sql::ident(self.name());
        match &self.alias {
            Some(alias) => sql.alias(alias),
            None => sql,
        }
    }

    // ==================== query starters ====================

    pub fn select(&self, columns: impl IntoSelectList) -> Query {
        Query::new(self.clone()).select(columns)
    }

    pub fn from(&self, source: impl Into<Source>) -> Query {
        Query::new(self.clone()).from(source)
    }

    pub fn where_(&self, condition: Condition) -> Query {
        Query::new(self.clone()).where_(condition)
    }

    pub fn insert(&self, values: impl Into<Values>) -> Query {
        Query::new(self.clone()).insert(values)
    }

    pub fn update(&self, values: impl Into<Values>) -> Query {
        Query::new(self.clone()).update(values)
    }

    pub fn delete(&self) -> Query {
        Query::new(self.clone()).delete()
    }

    pub fn create(&self) -> Query {
        Query::new(self.clone()).create()
    }

    pub fn drop(&self) -> Query {
        Query::new(self.clone()).drop()
    }

    pub fn alter(&self) -> Query {
        Query::new(self.clone()).alter()
    }

    pub fn indexes(&self) -> Query {
        Query::new(self.clone()).indexes()
    }

    // ==================== joins ====================

    pub fn join(&self, other: &impl AsTable) -> JoinBuilder {
        Source::from(self).join(other)
    }

    pub fn left_join(&self, other: &impl AsTable) -> JoinBuilder {
        Source::from(self).left_join(other)
    }
}

/// Anything that wraps a table descriptor.
pub trait AsTable {
    fn as_table(&self) -> &TableDef;
}

impl AsTable for TableDef {
    fn as_table(&self) -> &TableDef {
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ColumnExpr {
    Plain,
    Aggregate(&'static str),
    CountStar,
    Star,
}

/// A column bound to a (possibly aliased) table.
#[derive(Debug, Clone)]
pub struct Column {
    table: TableDef,
    name: String,
    primary_key: bool,
    alias: Option<String>,
    expr: ColumnExpr,
}

impl Column {
    fn plain(table: &TableDef, def: &ColumnDef) -> Self {
        Self {
            table: table.clone(),
            name: def.name.clone(),
            primary_key: def.primary_key,
            alias: None,
            expr: ColumnExpr::Plain,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The alias if set, otherwise the column name.
    #[inline]
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    #[inline]
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Aggregates and `COUNT(*)` count as computed columns.
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        matches!(self.expr, ColumnExpr::Aggregate(_) | ColumnExpr::CountStar)
    }

    #[inline]
    pub fn table(&self) -> &TableDef {
        &self.table
    }

    /// Returns this column projected under `alias`.
    pub fn as_(&self, alias: impl Into<String>) -> Column {
        Column {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    /// The column expression, without its alias.
    pub fn expr(&self) -> Sql {
        let qualified = || Sql::qualified(self.table.display_name(), &self.name);
        match self.expr {
            ColumnExpr::Plain => qualified(),
            ColumnExpr::Aggregate(func) => Sql::func(func, qualified()),
            ColumnExpr::CountStar => Sql::func("COUNT", Sql::token(Token::STAR)),
            ColumnExpr::Star => Sql::ident(self.table.display_name())
                .push(Token::DOT)
                .push(Token::STAR),
        }
    }

    /// The expression with an unqualified column name, as RETURNING wants it.
    pub(crate) fn bare(&self) -> Sql {
        match self.expr {
            ColumnExpr::Plain => Sql::ident(&self.name),
            ColumnExpr::Aggregate(func) => Sql::func(func, Sql::ident(&self.name)),
            ColumnExpr::CountStar => Sql::func("COUNT", Sql::token(Token::STAR)),
            ColumnExpr::Star => Sql::token(Token::STAR),
        }
    }

    /// The column as it appears in a select list.
    pub fn projection(&self) -> Sql {
        match &self.alias {
            Some(alias) => self.expr().alias(alias),
            None => self.expr(),
        }
    }

    // ==================== aggregates ====================

    fn aggregate(&self, func: &'static str, suffix: &str) -> Column {
        Column {
            table: self.table.clone(),
            name: self.name.clone(),
            primary_key: false,
            alias: Some(format!("{}_{}", self.name, suffix)),
            expr: ColumnExpr::Aggregate(func),
        }
    }

    pub fn count(&self) -> Column {
        self.aggregate("COUNT", "count")
    }

    pub fn sum(&self) -> Column {
        self.aggregate("SUM", "sum")
    }

    pub fn avg(&self) -> Column {
        self.aggregate("AVG", "avg")
    }

    pub fn min(&self) -> Column {
        self.aggregate("MIN", "min")
    }

    pub fn max(&self) -> Column {
        self.aggregate("MAX", "max")
    }

    // ==================== conditions ====================

    pub fn eq(&self, other: impl IntoOperand) -> Condition {
        expressions::eq(self, other)
    }

    pub fn ne(&self, other: impl IntoOperand) -> Condition {
        expressions::neq(self, other)
    }

    pub fn gt(&self, other: impl IntoOperand) -> Condition {
        expressions::gt(self, other)
    }

    pub fn gte(&self, other: impl IntoOperand) -> Condition {
        expressions::gte(self, other)
    }

    pub fn lt(&self, other: impl IntoOperand) -> Condition {
        expressions::lt(self, other)
    }

    pub fn lte(&self, other: impl IntoOperand) -> Condition {
        expressions::lte(self, other)
    }

    pub fn like(&self, pattern: impl Into<Value>) -> Condition {
        expressions::like(self, pattern)
    }

    pub fn is_null(&self) -> Condition {
        expressions::is_null(self)
    }

    pub fn is_not_null(&self) -> Condition {
        expressions::is_not_null(self)
    }

    pub fn in_list<I>(&self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        expressions::in_list(self, values)
    }

    // ==================== ordering ====================

    pub fn asc(&self) -> OrderBy {
        OrderBy::asc(self)
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::desc(self)
    }
}

/// A single ORDER BY term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    expr: Sql,
    descending: bool,
}

impl OrderBy {
    /// Creates an ascending ORDER BY term: "column ASC"
    pub fn asc(column: &Column) -> Self {
        Self {
            expr: column.expr(),
            descending: false,
        }
    }

    /// Creates a descending ORDER BY term: "column DESC"
    pub fn desc(column: &Column) -> Self {
        Self {
            expr: column.expr(),
            descending: true,
        }
    }

    pub(crate) fn to_sql(&self) -> Sql {
        self.expr
            .clone()
            .push(if self.descending { Token::DESC } else { Token::ASC })
    }
}

impl From<&Column> for OrderBy {
    fn from(value: &Column) -> Self {
        OrderBy::asc(value)
    }
}

impl From<Column> for OrderBy {
    fn from(value: Column) -> Self {
        OrderBy::asc(&value)
    }
}

// ==================== FROM sources ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: TableDef,
    on: Condition,
}

/// A FROM clause: a base table plus any joins.
#[derive(Debug, Clone)]
pub struct Source {
    base: TableDef,
    joins: Vec<Join>,
}

impl Source {
    pub fn join(self, other: &impl AsTable) -> JoinBuilder {
        JoinBuilder {
            source: self,
            table: other.as_table().clone(),
            kind: JoinKind::Inner,
        }
    }

    pub fn left_join(self, other: &impl AsTable) -> JoinBuilder {
        JoinBuilder {
            source: self,
            table: other.as_table().clone(),
            kind: JoinKind::Left,
        }
    }

    pub(crate) fn base(&self) -> &TableDef {
        &self.base
    }

    pub(crate) fn has_joins(&self) -> bool {
        !self.joins.is_empty()
    }

    pub(crate) fn to_sql(&self) -> Sql {
        let mut sql = self.base.reference();
        for join in &self.joins {
            if join.kind == JoinKind::Left {
                sql.push_mut(Token::LEFT);
            }
            sql.push_mut(Token::JOIN);
            sql.append_mut(join.table.reference());
            sql.push_mut(Token::ON);
            sql.append_mut(join.on.to_sql());
        }
        sql
    }
}

impl<T: AsTable> From<&T> for Source {
    fn from(value: &T) -> Self {
        Source {
            base: value.as_table().clone(),
            joins: Vec::new(),
        }
    }
}

/// A pending join, completed by [`JoinBuilder::on`].
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    source: Source,
    table: TableDef,
    kind: JoinKind,
}

impl JoinBuilder {
    pub fn on(self, condition: Condition) -> Source {
        let mut source = self.source;
        source.joins.push(Join {
            kind: self.kind,
            table: self.table,
            on: condition,
        });
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> TableDef {
        TableDef::new(
            Dialect::SQLite,
            "users",
            vec![
                ColumnDef::new("id", "integer").primary_key(),
                ColumnDef::new("name", "text").not_null(),
            ],
        )
    }

    #[test]
    fn alias_shares_definitions() {
        let users = users();
        let u = users.as_("u");
        assert!(u.same_table(&users));
        assert_eq!(u.display_name(), "u");
        assert_eq!(users.display_name(), "users");
        assert_eq!(u.columns().len(), 2);
    }

    #[test]
    fn columns_follow_the_alias() {
        let u = users().as_("u");
        let id = u.column("id").unwrap();
        assert!(id.is_primary_key());
        assert_eq!(id.expr().build(Dialect::SQLite).text, r#""u"."id""#);
        assert_eq!(
            id.as_("u.id##").projection().build(Dialect::SQLite).text,
            r#""u"."id" AS "u.id##""#
        );
    }

    #[test]
    fn aggregates_get_default_alias() {
        let id = users().column("id").unwrap();
        let count = id.count();
        assert!(count.is_aggregate());
        assert!(!id.is_aggregate());
        assert_eq!(
            count.projection().build(Dialect::SQLite).text,
            r#"COUNT("users"."id") AS "id_count""#
        );
    }

    #[test]
    fn column_type_names_per_dialect() {
        assert_eq!(ColumnType::from("INTEGER").sql_name(Dialect::MySQL), "INT");
        assert_eq!(ColumnType::Blob.sql_name(Dialect::PostgreSQL), "BYTEA");
        assert_eq!(ColumnType::from("jsonb").sql_name(Dialect::PostgreSQL), "jsonb");
    }

    #[test]
    fn join_renders_aliased_reference() {
        let users = users();
        let friend = users.as_("users.friend");
        let source = users
            .left_join(&friend)
            .on(friend.column("id").unwrap().eq(users.column("id").unwrap()));
        assert_eq!(
            source.to_sql().build(Dialect::SQLite).text,
            r#""users" LEFT JOIN "users" AS "users.friend" ON "users.friend"."id" = "users"."id""#
        );
    }
}
