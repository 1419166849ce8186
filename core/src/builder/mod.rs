//! Immutable statement builder.
//!
//! Every method takes `&self` and returns a new [`Query`]; a query is never
//! mutated once built, so it can be rendered any number of times.

mod render;

use anydb_types::Value;

use crate::error::{AnydbError, Result};
use crate::expressions::Condition;
use crate::schema::{Column, ColumnDef, OrderBy, Source, TableDef};
use crate::sql::Statement;

/// Column/value pairs for INSERT rows and UPDATE assignments, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values(pub Vec<(String, Value)>);

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column/value pair.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push((column.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Values {
    fn from(value: Vec<(K, V)>) -> Self {
        Values(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Values {
    fn from(value: [(K, V); N]) -> Self {
        Values(value.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<&serde_json::Map<String, serde_json::Value>> for Values {
    /// Nested arrays and objects are stored as their JSON text.
    fn from(value: &serde_json::Map<String, serde_json::Value>) -> Self {
        Values(
            value
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        serde_json::Value::Null => Value::Null,
                        serde_json::Value::Bool(b) => Value::Bool(*b),
                        serde_json::Value::Number(n) => match n.as_i64() {
                            Some(i) => Value::Integer(i),
                            None => n.as_f64().map_or(Value::Null, Value::Real),
                        },
                        serde_json::Value::String(s) => Value::Text(s.clone()),
                        other => Value::Text(other.to_string()),
                    };
                    (k.clone(), v)
                })
                .collect(),
        )
    }
}

/// Anything usable as a SELECT list.
pub trait IntoSelectList {
    fn into_select_list(self) -> Vec<Column>;
}

impl IntoSelectList for Column {
    fn into_select_list(self) -> Vec<Column> {
        vec![self]
    }
}

impl IntoSelectList for &Column {
    fn into_select_list(self) -> Vec<Column> {
        vec![self.clone()]
    }
}

impl IntoSelectList for Vec<Column> {
    fn into_select_list(self) -> Vec<Column> {
        self
    }
}

impl IntoSelectList for &[Column] {
    fn into_select_list(self) -> Vec<Column> {
        self.to_vec()
    }
}

impl<const N: usize> IntoSelectList for [Column; N] {
    fn into_select_list(self) -> Vec<Column> {
        self.into()
    }
}

/// CREATE INDEX definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    name: Option<String>,
    columns: Vec<String>,
    unique: bool,
    if_not_exists: bool,
}

impl IndexDef {
    pub fn on<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            if_not_exists: false,
        }
    }

    /// Defaults to `<table>_<col1>_<col2>...`
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    fn name_for(&self, table: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => {
                let mut name = String::from(table);
                for column in &self.columns {
                    name.push('_');
                    name.push_str(column);
                }
                name
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AlterAction {
    AddColumn(ColumnDef),
    DropColumn(String),
    Rename(String),
    RenameColumn(String, String),
}

#[derive(Debug, Clone)]
pub(crate) enum IndexAction {
    List,
    Create(IndexDef),
    Drop { name: String, if_exists: bool },
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SelectParts {
    distinct: bool,
    columns: Vec<Column>,
    from: Option<Source>,
    filter: Option<Condition>,
    group_by: Vec<Column>,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) enum QueryKind {
    Select(SelectParts),
    Insert {
        rows: Vec<Values>,
        returning: Vec<Column>,
    },
    Update {
        values: Values,
        filter: Option<Condition>,
        returning: Vec<Column>,
    },
    Delete {
        filter: Option<Condition>,
        returning: Vec<Column>,
    },
    Create {
        if_not_exists: bool,
    },
    Drop {
        if_exists: bool,
    },
    Alter(Vec<AlterAction>),
    Indexes(IndexAction),
}

impl QueryKind {
    fn label(&self) -> &'static str {
        match self {
            QueryKind::Select(_) => "SELECT",
            QueryKind::Insert { .. } => "INSERT",
            QueryKind::Update { .. } => "UPDATE",
            QueryKind::Delete { .. } => "DELETE",
            QueryKind::Create { .. } => "CREATE TABLE",
            QueryKind::Drop { .. } => "DROP TABLE",
            QueryKind::Alter(_) => "ALTER TABLE",
            QueryKind::Indexes(_) => "INDEX",
        }
    }

    fn filter(&self) -> Option<&Condition> {
        match self {
            QueryKind::Select(parts) => parts.filter.as_ref(),
            QueryKind::Update { filter, .. } | QueryKind::Delete { filter, .. } => {
                filter.as_ref()
            }
            _ => None,
        }
    }
}

/// An immutable query node bound to a table.
///
/// Builder misuse (for example `where_` on a CREATE TABLE) is recorded and
/// reported by [`Query::to_statement`], so chains never panic midway.
#[derive(Debug, Clone)]
pub struct Query {
    table: TableDef,
    kind: QueryKind,
    misuse: Option<String>,
}

impl Query {
    /// A `SELECT "table".* FROM "table"` query.
    pub fn new(table: TableDef) -> Self {
        Self {
            table,
            kind: QueryKind::Select(SelectParts::default()),
            misuse: None,
        }
    }

    pub fn table(&self) -> &TableDef {
        &self.table
    }

    /// Renders the statement text and its positional parameters.
    pub fn to_statement(&self) -> Result<Statement> {
        if let Some(misuse) = &self.misuse {
            return Err(AnydbError::Statement(misuse.clone()));
        }
        Ok(render::render(&self.table, &self.kind)?.build(self.table.dialect()))
    }

    // ==================== internal helpers ====================

    fn with_kind(&self, kind: QueryKind) -> Query {
        Query {
            table: self.table.clone(),
            kind,
            misuse: self.misuse.clone(),
        }
    }

    fn misused(&self, message: String) -> Query {
        let mut query = self.clone();
        if query.misuse.is_none() {
            query.misuse = Some(message);
        }
        query
    }

    fn map_select(&self, clause: &str, f: impl FnOnce(&mut SelectParts)) -> Query {
        match &self.kind {
            QueryKind::Select(parts) => {
                let mut parts = parts.clone();
                f(&mut parts);
                self.with_kind(QueryKind::Select(parts))
            }
            other => self.misused(format!("{clause} is not valid for {}", other.label())),
        }
    }

    // ==================== SELECT ====================

    /// Appends to the select list.
    pub fn select(&self, columns: impl IntoSelectList) -> Query {
        let columns = columns.into_select_list();
        self.map_select("SELECT", |parts| parts.columns.extend(columns))
    }

    /// Replaces the FROM clause (defaults to the query's own table).
    pub fn from(&self, source: impl Into<Source>) -> Query {
        let source = source.into();
        self.map_select("FROM", |parts| parts.from = Some(source))
    }

    pub fn distinct(&self) -> Query {
        self.map_select("DISTINCT", |parts| parts.distinct = true)
    }

    /// Adds a condition; repeated calls are ANDed together.
    pub fn where_(&self, condition: Condition) -> Query {
        let combine = |existing: &Option<Condition>| match existing {
            Some(existing) => Some(existing.clone().and(condition.clone())),
            None => Some(condition.clone()),
        };
        match &self.kind {
            QueryKind::Select(parts) => {
                let mut parts = parts.clone();
                parts.filter = combine(&parts.filter);
                self.with_kind(QueryKind::Select(parts))
            }
            QueryKind::Update {
                values,
                filter,
                returning,
            } => self.with_kind(QueryKind::Update {
                values: values.clone(),
                filter: combine(filter),
                returning: returning.clone(),
            }),
            QueryKind::Delete { filter, returning } => self.with_kind(QueryKind::Delete {
                filter: combine(filter),
                returning: returning.clone(),
            }),
            other => self.misused(format!("WHERE is not valid for {}", other.label())),
        }
    }

    pub fn order_by(&self, order: impl Into<OrderBy>) -> Query {
        let order = order.into();
        self.map_select("ORDER BY", |parts| parts.order_by.push(order))
    }

    pub fn group_by(&self, columns: impl IntoSelectList) -> Query {
        let columns = columns.into_select_list();
        self.map_select("GROUP BY", |parts| parts.group_by.extend(columns))
    }

    pub fn limit(&self, limit: i64) -> Query {
        self.map_select("LIMIT", |parts| parts.limit = Some(limit))
    }

    pub fn offset(&self, offset: i64) -> Query {
        self.map_select("OFFSET", |parts| parts.offset = Some(offset))
    }

    // ==================== INSERT / UPDATE / DELETE ====================

    /// Starts an INSERT of one row.
    pub fn insert(&self, values: impl Into<Values>) -> Query {
        self.with_kind(QueryKind::Insert {
            rows: vec![values.into()],
            returning: Vec::new(),
        })
    }

    /// Adds another row to an INSERT.
    pub fn values(&self, values: impl Into<Values>) -> Query {
        match &self.kind {
            QueryKind::Insert { rows, returning } => {
                let mut rows = rows.clone();
                rows.push(values.into());
                self.with_kind(QueryKind::Insert {
                    rows,
                    returning: returning.clone(),
                })
            }
            other => self.misused(format!("VALUES is not valid for {}", other.label())),
        }
    }

    /// Starts an UPDATE. A WHERE already on the chain carries over.
    pub fn update(&self, values: impl Into<Values>) -> Query {
        self.with_kind(QueryKind::Update {
            values: values.into(),
            filter: self.kind.filter().cloned(),
            returning: Vec::new(),
        })
    }

    /// Starts a DELETE. A WHERE already on the chain carries over.
    pub fn delete(&self) -> Query {
        self.with_kind(QueryKind::Delete {
            filter: self.kind.filter().cloned(),
            returning: Vec::new(),
        })
    }

    pub fn returning(&self, columns: impl IntoSelectList) -> Query {
        let columns = columns.into_select_list();
        let extend = |existing: &Vec<Column>| {
            let mut all = existing.clone();
            all.extend(columns.iter().cloned());
            all
        };
        match &self.kind {
            QueryKind::Insert { rows, returning } => self.with_kind(QueryKind::Insert {
                rows: rows.clone(),
                returning: extend(returning),
            }),
            QueryKind::Update {
                values,
                filter,
                returning,
            } => self.with_kind(QueryKind::Update {
                values: values.clone(),
                filter: filter.clone(),
                returning: extend(returning),
            }),
            QueryKind::Delete { filter, returning } => self.with_kind(QueryKind::Delete {
                filter: filter.clone(),
                returning: extend(returning),
            }),
            other => self.misused(format!("RETURNING is not valid for {}", other.label())),
        }
    }

    // ==================== DDL ====================

    pub fn create(&self) -> Query {
        self.with_kind(QueryKind::Create {
            if_not_exists: false,
        })
    }

    pub fn drop(&self) -> Query {
        self.with_kind(QueryKind::Drop { if_exists: false })
    }

    pub fn if_not_exists(&self) -> Query {
        match &self.kind {
            QueryKind::Create { .. } => self.with_kind(QueryKind::Create {
                if_not_exists: true,
            }),
            QueryKind::Indexes(IndexAction::Create(index)) => {
                let mut index = index.clone();
                index.if_not_exists = true;
                self.with_kind(QueryKind::Indexes(IndexAction::Create(index)))
            }
            other => self.misused(format!("IF NOT EXISTS is not valid for {}", other.label())),
        }
    }

    pub fn if_exists(&self) -> Query {
        match &self.kind {
            QueryKind::Drop { .. } => self.with_kind(QueryKind::Drop { if_exists: true }),
            QueryKind::Indexes(IndexAction::Drop { name, .. }) => {
                self.with_kind(QueryKind::Indexes(IndexAction::Drop {
                    name: name.clone(),
                    if_exists: true,
                }))
            }
            other => self.misused(format!("IF EXISTS is not valid for {}", other.label())),
        }
    }

    pub fn alter(&self) -> Query {
        self.with_kind(QueryKind::Alter(Vec::new()))
    }

    fn alter_action(&self, action: AlterAction) -> Query {
        match &self.kind {
            QueryKind::Alter(actions) => {
                let mut actions = actions.clone();
                actions.push(action);
                self.with_kind(QueryKind::Alter(actions))
            }
            other => self.misused(format!(
                "column alterations are not valid for {}",
                other.label()
            )),
        }
    }

    pub fn add_column(&self, column: ColumnDef) -> Query {
        self.alter_action(AlterAction::AddColumn(column))
    }

    pub fn drop_column(&self, name: impl Into<String>) -> Query {
        self.alter_action(AlterAction::DropColumn(name.into()))
    }

    pub fn rename(&self, new_name: impl Into<String>) -> Query {
        self.alter_action(AlterAction::Rename(new_name.into()))
    }

    pub fn rename_column(&self, from: impl Into<String>, to: impl Into<String>) -> Query {
        self.alter_action(AlterAction::RenameColumn(from.into(), to.into()))
    }

    /// Lists the indexes on the table.
    pub fn indexes(&self) -> Query {
        self.with_kind(QueryKind::Indexes(IndexAction::List))
    }

    pub fn create_index(&self, index: IndexDef) -> Query {
        match &self.kind {
            QueryKind::Indexes(_) => self.with_kind(QueryKind::Indexes(IndexAction::Create(index))),
            other => self.misused(format!("CREATE INDEX is not valid for {}", other.label())),
        }
    }

    pub fn drop_index(&self, name: impl Into<String>) -> Query {
        match &self.kind {
            QueryKind::Indexes(_) => self.with_kind(QueryKind::Indexes(IndexAction::Drop {
                name: name.into(),
                if_exists: false,
            })),
            other => self.misused(format!("DROP INDEX is not valid for {}", other.label())),
        }
    }
}

impl From<&TableDef> for Query {
    fn from(value: &TableDef) -> Self {
        Query::new(value.clone())
    }
}

#[cfg(test)]
mod tests;
