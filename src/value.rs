//! Configuration value tree.

use core::fmt;

use indexmap::IndexMap;

use crate::key;

/// Ordered map of normalized key segments to values.
///
/// Config-file and key/value-store tiers are handed to the store as one of
/// these; nested keys live in nested tables.
pub type Table = IndexMap<String, Value>;

/// A configuration value resolved from one of the tiers.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A boolean value.
    Bool(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// An array of values.
    Array(Vec<Value>),
    /// A nested table of key-value pairs.
    Table(Table),
}

impl Value {
    /// A short name for the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }

    /// Borrow the value as a string slice, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the value as a table, if it is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Recursively normalize all table keys.
    ///
    /// Applied once when a pre-parsed tree is handed to the store, so lookups
    /// never have to case-fold tree keys again.
    pub(crate) fn normalize_keys(self) -> Value {
        match self {
            Value::Table(table) => Value::Table(normalize_table_keys(table)),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::normalize_keys).collect())
            }
            other => other,
        }
    }
}

/// Recursively normalize the keys of a table.
pub(crate) fn normalize_table_keys(table: Table) -> Table {
    table
        .into_iter()
        .map(|(k, v)| (key::normalize(&k), v.normalize_keys()))
        .collect()
}

/// Navigate a table by path segments.
pub(crate) fn lookup_path<'a>(table: &'a Table, parts: &[&str]) -> Option<&'a Value> {
    let (first, rest) = parts.split_first()?;
    let entry = table.get(*first)?;
    if rest.is_empty() {
        return Some(entry);
    }
    match entry {
        Value::Table(nested) => lookup_path(nested, rest),
        _ => None,
    }
}

/// Insert a value into a nested table structure using path segments.
///
/// Intermediate non-table entries are replaced by tables; the last write wins.
pub(crate) fn insert_path(root: &mut Table, parts: &[&str], value: Value) {
    let Some((first, rest)) = parts.split_first() else {
        return;
    };

    if rest.is_empty() {
        root.insert((*first).to_string(), value);
        return;
    }

    let entry = root
        .entry((*first).to_string())
        .or_insert_with(|| Value::Table(Table::default()));

    if let Value::Table(nested) = entry {
        insert_path(nested, rest, value);
    } else {
        let mut nested = Table::default();
        insert_path(&mut nested, rest, value);
        *entry = Value::Table(nested);
    }
}

/// Collect every leaf path of a table as a dotted key.
pub(crate) fn collect_leaf_paths(table: &Table, prefix: &str, out: &mut indexmap::IndexSet<String>) {
    for (segment, value) in table {
        let path = if prefix.is_empty() {
            segment.clone()
        } else {
            format!("{prefix}{}{segment}", key::KEY_DELIMITER)
        };
        match value {
            Value::Table(nested) => collect_leaf_paths(nested, &path, out),
            _ => {
                out.insert(path);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Table(table) => {
                write!(f, "{{")?;
                for (i, (k, v)) in table.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Array(items.into_iter().map(Value::String).collect())
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::Array(items.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}
