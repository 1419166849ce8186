//! Output aliases for multi-table projections.
//!
//! Selecting several tables at once aliases each column as
//! `<table>.<column>`, with `##` appended to primary keys, so the row
//! normalizer can fold the flat result back into nested objects.

use anydb_core::{AnydbError, Column, Result};

use crate::model::Model;

/// One argument to [`all_of`].
#[derive(Debug, Clone)]
pub enum Projection {
    /// Every column of the model
    Model(Model),
    /// A single aggregate column
    Column(Column),
}

impl From<Model> for Projection {
    fn from(model: Model) -> Self {
        Projection::Model(model)
    }
}

impl From<&Model> for Projection {
    fn from(model: &Model) -> Self {
        Projection::Model(model.clone())
    }
}

impl From<Column> for Projection {
    fn from(column: Column) -> Self {
        Projection::Column(column)
    }
}

impl From<&Column> for Projection {
    fn from(column: &Column) -> Self {
        Projection::Column(column.clone())
    }
}

/// The column's alias or name, `##`-suffixed for primary keys.
pub fn column_name(column: &Column) -> String {
    let name = column.output_name();
    if column.is_primary_key() {
        format!("{name}##")
    } else {
        name.to_owned()
    }
}

fn qualified(column: &Column) -> Column {
    let table = column.table().display_name();
    column.as_(format!("{table}.{}", column_name(column)))
}

/// Flattens models and aggregate columns into one aliased select list.
///
/// A plain column is rejected with [`AnydbError::UnsupportedProjection`];
/// select its model instead.
pub fn all_of<I>(items: I) -> Result<Vec<Column>>
where
    I: IntoIterator,
    I::Item: Into<Projection>,
{
    let mut out = Vec::new();
    for item in items {
        match item.into() {
            Projection::Model(model) => {
                out.extend(model.columns().iter().map(qualified));
            }
            Projection::Column(column) if column.is_aggregate() => out.push(qualified(&column)),
            Projection::Column(column) => {
                return Err(AnydbError::UnsupportedProjection(format!(
                    "`{}.{}` is neither a model nor an aggregate column",
                    column.table().display_name(),
                    column.name()
                )));
            }
        }
    }
    Ok(out)
}
