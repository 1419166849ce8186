//! Keyed-map shaping for [`ExtQuery::all_object`](crate::ExtQuery::all_object).

use std::fmt;
use std::sync::Arc;

use anydb_core::Row;
use serde_json::{Map, Value as JsonValue};

type RowFn = Arc<dyn Fn(&Row) -> JsonValue + Send + Sync>;

/// How each row becomes the value stored under its key.
#[derive(Clone, Default)]
pub enum Mapper {
    /// Every column except the key: none gives `null`, one gives its value,
    /// more give an object of those columns.
    #[default]
    Default,
    /// The value of one column, `null` when the row lacks it.
    ByColumn(String),
    /// An object restricted to the listed columns, in list order. Columns
    /// the row lacks are left out.
    ByColumnList(Vec<String>),
    /// Whatever the function returns for the row.
    ByFunction(RowFn),
}

impl Mapper {
    pub fn by_column(name: impl Into<String>) -> Self {
        Mapper::ByColumn(name.into())
    }

    pub fn by_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Mapper::ByColumnList(names.into_iter().map(Into::into).collect())
    }

    pub fn by_function<F>(f: F) -> Self
    where
        F: Fn(&Row) -> JsonValue + Send + Sync + 'static,
    {
        Mapper::ByFunction(Arc::new(f))
    }

    fn apply(&self, key_column: &str, row: &Row) -> JsonValue {
        match self {
            Mapper::Default => {
                let mut others: Map<String, JsonValue> = row
                    .iter()
                    .filter(|(name, _)| name.as_str() != key_column)
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                match others.len() {
                    0 => JsonValue::Null,
                    1 => others
                        .values_mut()
                        .next()
                        .map(JsonValue::take)
                        .unwrap_or_default(),
                    _ => JsonValue::Object(others),
                }
            }
            Mapper::ByColumn(name) => row.get(name).cloned().unwrap_or_default(),
            Mapper::ByColumnList(names) => JsonValue::Object(
                names
                    .iter()
                    .filter_map(|name| Some((name.clone(), row.get(name)?.clone())))
                    .collect(),
            ),
            Mapper::ByFunction(f) => f(row),
        }
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mapper::Default => f.write_str("Default"),
            Mapper::ByColumn(name) => f.debug_tuple("ByColumn").field(name).finish(),
            Mapper::ByColumnList(names) => f.debug_tuple("ByColumnList").field(names).finish(),
            Mapper::ByFunction(_) => f.write_str("ByFunction(..)"),
        }
    }
}

impl From<&str> for Mapper {
    fn from(name: &str) -> Self {
        Mapper::by_column(name)
    }
}

impl From<Vec<String>> for Mapper {
    fn from(names: Vec<String>) -> Self {
        Mapper::ByColumnList(names)
    }
}

impl<const N: usize> From<[&str; N]> for Mapper {
    fn from(names: [&str; N]) -> Self {
        Mapper::by_columns(names)
    }
}

/// The map key for a key-column value: strings as they are, numbers and
/// booleans printed, `"null"` for null and `"undefined"` when the row has no
/// such column, so a mistyped key column shows up as a single odd key.
pub fn key_string(value: Option<&JsonValue>) -> String {
    match value {
        None => String::from("undefined"),
        Some(JsonValue::Null) => String::from("null"),
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Builds the keyed map. Later rows overwrite earlier ones with the same key.
pub fn shape_rows<F>(
    rows: &[Row],
    key_column: &str,
    mapper: &Mapper,
    filter: F,
) -> Map<String, JsonValue>
where
    F: Fn(&Row) -> bool,
{
    let mut out = Map::new();
    for row in rows.iter().filter(|row| filter(row)) {
        out.insert(key_string(row.get(key_column)), mapper.apply(key_column, row));
    }
    out
}
