//! Ordered-map keys for container entries.
//!
//! Containers map keys to values in insertion order. Keys are either
//! integers (dense sequences serialize as arrays) or text (record-style
//! access by column name).

use std::fmt;

use serde::{Serialize, Serializer};

use crate::Value;

/// A container key: an integer index or a text column name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integer key, used for list-like containers.
    Int(i64),
    /// Text key, used for record-like containers.
    Text(String),
}

impl Key {
    /// Returns true if this is an integer key.
    pub fn is_int(&self) -> bool {
        matches!(self, Key::Int(_))
    }

    /// Attempts to read this key as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(n) => Some(*n),
            Key::Text(_) => None,
        }
    }

    /// Attempts to read this key as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Key::Text(s) => Some(s),
            Key::Int(_) => None,
        }
    }

    /// Derives a key from a scalar value, as used by `index_by`, `group_by`
    /// and keyed `pluck`.
    ///
    /// Integers and text map directly; booleans map to `0`/`1`; floats with
    /// an integral value map to the integer key. Anything else (null,
    /// fractional floats, nested structures) is not keyable.
    pub fn from_scalar(value: &Value) -> Option<Key> {
        match value {
            Value::Int(n) => Some(Key::Int(*n)),
            Value::Text(s) => Some(Key::Text(s.clone())),
            Value::Bool(b) => Some(Key::Int(i64::from(*b))),
            Value::Float(f)
                if f.is_finite()
                    && f.fract() == 0.0
                    && (i64::MIN as f64..=i64::MAX as f64).contains(f) =>
            {
                Some(Key::Int(*f as i64))
            }
            _ => None,
        }
    }

    /// Converts the key into its scalar value form, as produced by `keys()`.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Int(n) => Value::Int(*n),
            Key::Text(s) => Value::Text(s.clone()),
        }
    }

    /// Returns true if this key names the given column.
    ///
    /// Text keys match by string equality; integer keys match their decimal
    /// form, so `pluck("0")` reaches the first field of positional rows.
    pub(crate) fn matches_column(&self, column: &str) -> bool {
        match self {
            Key::Text(s) => s == column,
            Key::Int(n) => {
                column.parse::<i64>().map(|c| c == *n).unwrap_or(false)
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(n) => write!(f, "{n}"),
            Key::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

impl From<i32> for Key {
    fn from(value: i32) -> Self {
        Key::Int(value as i64)
    }
}

impl From<usize> for Key {
    fn from(value: usize) -> Self {
        Key::Int(value as i64)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Text(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Text(value)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Key::Text(s) if s == other)
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<i64> for Key {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Key::Int(n) if n == other)
    }
}

// JSON object keys are always strings, so keys serialize through their
// display form.
impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
