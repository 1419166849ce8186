//! Tables extended with relations and execution.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use anydb_core::{
    AnydbError, AsTable, Column, ColumnDef, Condition, IntoSelectList, JoinBuilder, Result,
    Source, TableDef, Values,
};
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;

use crate::database::Shared;
use crate::naming::{self, Projection};
use crate::query::ExtQuery;

const EVENT_CAPACITY: usize = 16;

/// What a relation points at.
#[derive(Debug, Clone)]
pub enum RelationTarget {
    /// A model looked up by name on first access, so it may be defined later
    Name(String),
    Model(Model),
}

impl From<&str> for RelationTarget {
    fn from(name: &str) -> Self {
        RelationTarget::Name(name.to_owned())
    }
}

impl From<String> for RelationTarget {
    fn from(name: String) -> Self {
        RelationTarget::Name(name)
    }
}

impl From<Model> for RelationTarget {
    fn from(model: Model) -> Self {
        RelationTarget::Model(model)
    }
}

impl From<&Model> for RelationTarget {
    fn from(model: &Model) -> Self {
        RelationTarget::Model(model.clone())
    }
}

/// A declared has-one or has-many association.
#[derive(Debug, Clone)]
pub struct RelationSpec {
    pub target: RelationTarget,
    pub many: bool,
}

/// Everything [`Database::define`](crate::Database::define) needs to build a model.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub has: Vec<(String, RelationSpec)>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            has: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn columns(mut self, columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Declares a single-valued relation.
    pub fn has_one(self, name: impl Into<String>, target: impl Into<RelationTarget>) -> Self {
        self.has(name, target, false)
    }

    /// Declares a many-valued relation; its alias ends in `[]`.
    pub fn has_many(self, name: impl Into<String>, target: impl Into<RelationTarget>) -> Self {
        self.has(name, target, true)
    }

    fn has(mut self, name: impl Into<String>, target: impl Into<RelationTarget>, many: bool) -> Self {
        let name = name.into();
        let spec = RelationSpec {
            target: target.into(),
            many,
        };
        match self.has.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = spec,
            None => self.has.push((name, spec)),
        }
        self
    }
}

/// Free-form notification sent on a model's channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEvent {
    pub name: String,
    pub payload: JsonValue,
}

/// A table extended with lazily resolved relations.
///
/// Builder operations on a model return [`ExtQuery`]s bound to the database
/// that defined it. Clones share the same instance, including its relation
/// cache and event channel; [`Model::as_`] makes a new instance.
#[derive(Clone)]
pub struct Model {
    inner: Arc<ModelInner>,
}

struct ModelInner {
    table: TableDef,
    relations: Arc<[(String, RelationSpec)]>,
    resolved: Box<[OnceLock<Model>]>,
    db: Weak<Shared>,
    events: broadcast::Sender<ModelEvent>,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name())
            .field("alias", &self.alias())
            .field(
                "relations",
                &self.inner.relations.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Model {
    pub(crate) fn new(
        table: TableDef,
        relations: Arc<[(String, RelationSpec)]>,
        db: Weak<Shared>,
    ) -> Self {
        let resolved = relations.iter().map(|_| OnceLock::new()).collect();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(ModelInner {
                table,
                relations,
                resolved,
                db,
                events,
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.inner.table.name()
    }

    #[inline]
    pub fn alias(&self) -> Option<&str> {
        self.inner.table.alias()
    }

    /// The alias if set, otherwise the model name.
    #[inline]
    pub fn display_name(&self) -> &str {
        self.inner.table.display_name()
    }

    #[inline]
    pub fn table(&self) -> &TableDef {
        &self.inner.table
    }

    /// True when both handles are the same instance.
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// A new instance under `alias`, with the same columns and relation
    /// declarations and an empty relation cache.
    pub fn as_(&self, alias: impl Into<String>) -> Model {
        Model::new(
            self.inner.table.as_(alias),
            Arc::clone(&self.inner.relations),
            self.inner.db.clone(),
        )
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.inner.table.column(name)
    }

    pub fn columns(&self) -> Vec<Column> {
        self.inner.table.columns()
    }

    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.inner.relations.iter().map(|(name, _)| name.as_str())
    }

    /// The target of relation `name`, aliased `<owner>.<name>` (`[]`-suffixed
    /// when many-valued).
    ///
    /// The first access resolves and caches the target; later accesses on
    /// this instance return the cached model even if a name-based target has
    /// since been redefined.
    pub fn relation(&self, name: &str) -> Result<Model> {
        let index = self
            .inner
            .relations
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| AnydbError::UnknownRelation {
                model: self.display_name().to_owned(),
                relation: name.to_owned(),
            })?;

        let cell = &self.inner.resolved[index];
        if let Some(model) = cell.get() {
            return Ok(model.clone());
        }

        let spec = &self.inner.relations[index].1;
        let target = match &spec.target {
            RelationTarget::Model(model) => model.clone(),
            RelationTarget::Name(target) => self.lookup(target).ok_or_else(|| {
                AnydbError::ReferenceNotFound {
                    model: self.display_name().to_owned(),
                    relation: name.to_owned(),
                }
            })?,
        };
        let suffix = if spec.many { "[]" } else { "" };
        let aliased = target.as_(format!("{}.{name}{suffix}", self.display_name()));

        Ok(cell.get_or_init(|| aliased).clone())
    }

    fn lookup(&self, name: &str) -> Option<Model> {
        self.inner.db.upgrade()?.model(name)
    }

    /// The instance's notification channel. Nothing in this crate sends on it.
    pub fn events(&self) -> &broadcast::Sender<ModelEvent> {
        &self.inner.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ModelEvent> {
        self.inner.events.subscribe()
    }

    /// Sends an event to current subscribers, returning how many received it.
    pub fn emit(&self, name: impl Into<String>, payload: JsonValue) -> usize {
        self.inner
            .events
            .send(ModelEvent {
                name: name.into(),
                payload,
            })
            .unwrap_or(0)
    }

    fn wrap(&self, query: anydb_core::Query) -> ExtQuery {
        ExtQuery::new(query, self.inner.db.clone())
    }

    // ==================== builder operations ====================

    pub fn select(&self, columns: impl IntoSelectList) -> ExtQuery {
        self.wrap(self.inner.table.select(columns))
    }

    pub fn from(&self, source: impl Into<Source>) -> ExtQuery {
        self.wrap(self.inner.table.from(source))
    }

    pub fn where_(&self, condition: Condition) -> ExtQuery {
        self.wrap(self.inner.table.where_(condition))
    }

    pub fn insert(&self, values: impl Into<Values>) -> ExtQuery {
        self.wrap(self.inner.table.insert(values))
    }

    pub fn update(&self, values: impl Into<Values>) -> ExtQuery {
        self.wrap(self.inner.table.update(values))
    }

    pub fn delete(&self) -> ExtQuery {
        self.wrap(self.inner.table.delete())
    }

    pub fn create(&self) -> ExtQuery {
        self.wrap(self.inner.table.create())
    }

    pub fn drop(&self) -> ExtQuery {
        self.wrap(self.inner.table.drop())
    }

    pub fn alter(&self) -> ExtQuery {
        self.wrap(self.inner.table.alter())
    }

    pub fn indexes(&self) -> ExtQuery {
        self.wrap(self.inner.table.indexes())
    }

    /// `select(all_of(items))` on this model.
    pub fn select_deep<I>(&self, items: I) -> Result<ExtQuery>
    where
        I: IntoIterator,
        I::Item: Into<Projection>,
    {
        Ok(self.select(naming::all_of(items)?))
    }

    pub fn join(&self, other: &impl AsTable) -> JoinBuilder {
        self.inner.table.join(other)
    }

    pub fn left_join(&self, other: &impl AsTable) -> JoinBuilder {
        self.inner.table.left_join(other)
    }
}

impl AsTable for Model {
    fn as_table(&self) -> &TableDef {
        &self.inner.table
    }
}
