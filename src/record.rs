// 📚 Book Records - Sparse, loosely-typed book metadata
// Every source fills a different subset of fields, so a record is a map, not a struct

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// FIELD NAMES
// ============================================================================

/// Well-known field names. Sources may add others (local files carry their own columns).
pub mod fields {
    pub const TITLE: &str = "title";
    pub const AUTHORS: &str = "authors";
    pub const PUBLISHED_DATE: &str = "published_date";
    pub const CATEGORIES: &str = "categories";
    pub const DESCRIPTION: &str = "description";
    pub const RATING: &str = "rating";
}

/// Literal used by some sources when a rating is not available
pub const RATING_NOT_AVAILABLE: &str = "N/A";

// ============================================================================
// BOOK RECORD
// ============================================================================

/// BookRecord - one sparse mapping of book attributes
///
/// Aggregates as maps, not structs: fields keep insertion order
/// (serde_json `preserve_order`) and values stay untyped. A `rating` can be text in one
/// row and a number in the next.
///
/// A field is *missing* when it is absent, null, or an empty string. The last case
/// matters because an empty CSV cell is how a missing value is persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookRecord {
    fields: Map<String, Value>,
}

impl BookRecord {
    pub fn new() -> Self {
        BookRecord { fields: Map::new() }
    }

    /// Builder pattern: set a field
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder pattern: set a field, storing null when the value is absent
    ///
    /// The key is still recorded so the column shows up when the record is persisted.
    pub fn with_optional<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        let value = value.map(Into::into).unwrap_or(Value::Null);
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    /// Raw value, if the field is present and not missing
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !is_missing_value(v))
    }

    /// Value rendered as text, if not missing
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(render_value)
    }

    pub fn is_missing(&self, key: &str) -> bool {
        self.get(key).is_none()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn title(&self) -> Option<String> {
        self.text(fields::TITLE)
    }

    pub fn authors(&self) -> Option<String> {
        self.text(fields::AUTHORS)
    }
}

/// RecordCollection - ordered, duplicates expected
pub type RecordCollection = Vec<BookRecord>;

// ============================================================================
// VALUE HELPERS
// ============================================================================

pub fn is_missing_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Render a value the way it is written into a CSV cell
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Flatten a list of names into one comma-joined string (order preserved)
pub fn join_names<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| n.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collect the string entries of a JSON array and join them
pub fn join_json_strings(value: Option<&Value>) -> String {
    let names = value
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(|i| i.as_str()).collect::<Vec<_>>())
        .unwrap_or_default();
    join_names(names)
}

// ============================================================================
// TESTS
// ============================================================================
