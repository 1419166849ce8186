//! Result rows and their normalization.
//!
//! Multi-table projections alias columns as dotted paths
//! (`users.posts[].id##`). [`normalize`] folds those paths back into nested
//! objects:
//!
//! - every `.` opens a nested object,
//! - a segment ending in `[]` becomes a one-element array,
//! - a trailing `##` marks the primary key and is stripped,
//! - a nested object whose primary key is null collapses to `null`
//!   (or `[]` when it is many-valued), which is how an unmatched LEFT JOIN
//!   shows up.

use serde_json::Value as JsonValue;

/// A result row: column name to value, in the order the driver reported.
pub type Row = serde_json::Map<String, JsonValue>;

const PRIMARY_KEY_MARK: &str = "##";
const MANY_MARK: &str = "[]";

enum Node {
    Leaf(JsonValue),
    Branch(Branch),
}

#[derive(Default)]
struct Branch {
    fields: Vec<(String, Node)>,
    many: bool,
    primary_key: Option<String>,
}

impl Branch {
    fn set(&mut self, name: &str, node: Node) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = node,
            None => self.fields.push((name.to_owned(), node)),
        }
    }

    /// Index of the child branch `name`, created (or replacing a leaf) if needed.
    fn child(&mut self, name: &str, many: bool) -> usize {
        let index = match self.fields.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.fields.push((name.to_owned(), Node::Leaf(JsonValue::Null)));
                self.fields.len() - 1
            }
        };
        if !matches!(self.fields[index].1, Node::Branch(_)) {
            self.fields[index].1 = Node::Branch(Branch {
                many,
                ..Branch::default()
            });
        }
        index
    }

    fn insert(&mut self, path: &[&str], value: JsonValue) {
        match path {
            [] => {}
            [leaf] => {
                let (name, primary_key) = match leaf.strip_suffix(PRIMARY_KEY_MARK) {
                    Some(name) => (name, true),
                    None => (*leaf, false),
                };
                if primary_key {
                    self.primary_key = Some(name.to_owned());
                }
                self.set(name, Node::Leaf(value));
            }
            [head, rest @ ..] => {
                let (name, many) = match head.strip_suffix(MANY_MARK) {
                    Some(name) => (name, true),
                    None => (*head, false),
                };
                let index = self.child(name, many);
                if let Node::Branch(child) = &mut self.fields[index].1 {
                    child.insert(rest, value);
                }
            }
        }
    }

    fn has_null_primary_key(&self) -> bool {
        let Some(pk) = &self.primary_key else {
            return false;
        };
        self.fields
            .iter()
            .any(|(name, node)| name == pk && matches!(node, Node::Leaf(JsonValue::Null)))
    }

    fn into_row(self) -> Row {
        self.fields
            .into_iter()
            .map(|(name, node)| (name, node.into_json()))
            .collect()
    }
}

impl Node {
    fn into_json(self) -> JsonValue {
        match self {
            Node::Leaf(value) => value,
            Node::Branch(branch) => {
                let many = branch.many;
                if branch.has_null_primary_key() {
                    return if many {
                        JsonValue::Array(Vec::new())
                    } else {
                        JsonValue::Null
                    };
                }
                let object = JsonValue::Object(branch.into_row());
                if many {
                    JsonValue::Array(vec![object])
                } else {
                    object
                }
            }
        }
    }
}

/// Unflattens a raw driver row into nested objects. Idempotent: a row
/// without dotted or marked keys comes back unchanged.
pub fn normalize(row: Row) -> Row {
    let mut root = Branch::default();
    for (key, value) in row {
        let path: Vec<&str> = key.split('.').collect();
        root.insert(&path, value);
    }
    root.into_row()
}
