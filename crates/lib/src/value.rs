//! Raw values for container construction and projection.
//!
//! This module provides the [`Value`] enum that represents all data a
//! container can hold in its unwrapped form. Values are either leaf scalars
//! (null, booleans, numbers, text) or array-shaped branches (lists and
//! records) that become nested containers on construction.
//!
//! `Value` plays both sides of the container lifecycle: it is the input to
//! [`Rowset::new`](crate::Rowset::new) and the output of
//! [`Rowset::to_value`](crate::Rowset::to_value), so the round-trip law
//! `Rowset::new(v)?.to_value() == v` holds for any canonical value tree.
//!
//! # Value Types
//!
//! ## Leaf values (terminal nodes)
//! - [`Value::Null`] - null/empty values
//! - [`Value::Bool`] - booleans
//! - [`Value::Int`] - 64-bit signed integers
//! - [`Value::Float`] - 64-bit floats (containers reject non-finite ones)
//! - [`Value::Text`] - UTF-8 text
//!
//! ## Branch values (array-shaped)
//! - [`Value::List`] - dense zero-based sequence
//! - [`Value::Record`] - ordered key/value pairs
//!
//! # Direct comparisons
//!
//! `Value` implements `PartialEq` with primitive types for ergonomic
//! comparisons:
//!
//! ```
//! # use rowset::Value;
//! let text = Value::Text("hello".to_string());
//! let number = Value::Int(42);
//!
//! assert!(text == "hello");
//! assert!(number == 42);
//! assert!(42 == number);
//! assert!(!(text == 42));
//! ```

use std::{cmp::Ordering, fmt};

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::{Error, Key, Result};

/// A raw nested value: the unwrapped form of container data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null/empty value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text string value
    Text(String),
    /// Dense zero-based sequence of values
    List(Vec<Value>),
    /// Ordered key/value pairs
    Record(Vec<(Key, Value)>),
}

/// Comparison flag for [`Rowset::sort`](crate::Rowset::sort) and
/// [`Rowset::sort_by`](crate::Rowset::sort_by).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sort {
    /// Numeric comparison when both sides coerce to numbers, text
    /// comparison otherwise.
    #[default]
    Regular,
    /// Coerce both sides to floats.
    Numeric,
    /// Compare rendered text forms.
    Text,
}

impl Value {
    /// Returns true if this is a leaf scalar (including null).
    pub fn is_scalar(&self) -> bool {
        !self.is_array_shaped()
    }

    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this value converts to a nested container.
    pub fn is_array_shaped(&self) -> bool {
        matches!(self, Value::List(_) | Value::Record(_))
    }

    /// Returns the type name as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Attempts to read this value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to read this value as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to read this value as a float, widening integers.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Attempts to read this value as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to read this value as a list of items.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Attempts to read this value as record entries.
    pub fn as_record(&self) -> Option<&[(Key, Value)]> {
        match self {
            Value::Record(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a column of an array-shaped row value.
    ///
    /// Record rows match by key name (integer keys match their decimal
    /// form); list rows match positional columns named by decimal index.
    pub fn get_column(&self, column: &str) -> Option<&Value> {
        match self {
            Value::Record(entries) => entries
                .iter()
                .find(|(key, _)| key.matches_column(column))
                .map(|(_, value)| value),
            Value::List(items) => column.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Number of direct children of an array-shaped value; `0` for scalars.
    pub fn element_count(&self) -> usize {
        match self {
            Value::List(items) => items.len(),
            Value::Record(entries) => entries.len(),
            _ => 0,
        }
    }

    /// Renders the value into its template/output text form.
    ///
    /// This is the form used by `implode`, `sprintf` and leaf display:
    /// null renders empty, booleans render `1`/empty, numbers render
    /// plainly, and array-shaped values render as JSON.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::List(_) | Value::Record(_) => self.to_json_string(),
        }
    }

    /// Coerces the value to a number for loose comparisons, if possible.
    fn coerced_number(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Loose, coercive equality used by `where`, `unique` and `contains`.
    ///
    /// The coercion table (documented in DESIGN.md):
    /// - identical variants compare normally; `Int`/`Float` compare
    ///   numerically across each other
    /// - text against numbers: equal when the text parses to the same
    ///   numeric value (`"1"` equals `1`)
    /// - two texts: equal when identical, or when both parse as numbers
    ///   with the same value (`"1.0"` equals `"1"`)
    /// - booleans against numbers: `true` is `1`, `false` is `0`
    /// - booleans against text: `true` matches `"1"`/`"true"`, `false`
    ///   matches `"0"`/`""`/`"false"`
    /// - null equals only null
    /// - array-shaped values compare element-wise with loose equality
    pub fn loose_eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Null, _) | (_, Null) => false,
            (Bool(a), Bool(b)) => a == b,
            // Exact, not via f64: distinct integers above 2^53 must not
            // collapse under float coercion.
            (Int(a), Int(b)) => a == b,
            (Bool(b), Text(t)) | (Text(t), Bool(b)) => {
                matches!(
                    (*b, t.as_str()),
                    (true, "1" | "true") | (false, "0" | "" | "false")
                )
            }
            (Text(a), Text(b)) => {
                a == b
                    || matches!(
                        (a.trim().parse::<f64>(), b.trim().parse::<f64>()),
                        (Ok(x), Ok(y)) if x == y
                    )
            }
            (List(a), List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Record(a), Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.loose_eq(vb))
            }
            (List(_) | Record(_), _) | (_, List(_) | Record(_)) => false,
            _ => match (self.coerced_number(), other.coerced_number()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Orders two values under the given comparison flag.
    ///
    /// Incomparable floats (never produced by containers, which reject
    /// non-finite floats) order as equal.
    pub fn compare(&self, other: &Value, flag: Sort) -> Ordering {
        match flag {
            Sort::Numeric => cmp_f64(
                self.coerced_number().unwrap_or(0.0),
                other.coerced_number().unwrap_or(0.0),
            ),
            Sort::Text => self.render().cmp(&other.render()),
            Sort::Regular => match (self.coerced_number(), other.coerced_number()) {
                (Some(a), Some(b)) => cmp_f64(a, b),
                _ => self.render().cmp(&other.render()),
            },
        }
    }

    /// Parses a JSON document into a value tree.
    ///
    /// JSON objects become [`Value::Record`]s with text keys, preserving
    /// member order as parsed.
    pub fn from_json(json: &str) -> Result<Value> {
        let parsed: serde_json::Value =
            serde_json::from_str(json).map_err(|err| Error::InvalidInput {
                key: "<json>".to_string(),
                reason: err.to_string(),
            })?;
        Ok(Value::from_serde(parsed))
    }

    fn from_serde(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_serde).collect())
            }
            serde_json::Value::Object(members) => Value::Record(
                members
                    .into_iter()
                    .map(|(k, v)| (Key::Text(k), Value::from_serde(v)))
                    .collect(),
            ),
        }
    }

    /// Serializes the value tree to a JSON string.
    ///
    /// Records with a dense zero-based integer key sequence serialize as
    /// JSON arrays, all other records as JSON objects.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Returns true when the entry keys form the dense integer sequence
/// `0..len`, i.e. the record is list-shaped.
pub(crate) fn dense_int_keys(entries: &[(Key, Value)]) -> bool {
    entries
        .iter()
        .enumerate()
        .all(|(i, (key, _))| matches!(key, Key::Int(n) if *n == i as i64))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(entries) => {
                if dense_int_keys(entries) {
                    let mut seq = serializer.serialize_seq(Some(entries.len()))?;
                    for (_, value) in entries {
                        seq.serialize_element(value)?;
                    }
                    seq.end()
                } else {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (key, value) in entries {
                        map.serialize_entry(key, value)?;
                    }
                    map.end()
                }
            }
        }
    }
}

impl fmt::Display for Value {
    /// Displays the template/output text form, see [`Value::render`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

// Convenient From implementations for common types
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Vec<(Key, Value)>> for Value {
    fn from(value: Vec<(Key, Value)>) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

// PartialEq implementations for comparing Value with primitives
impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::Text(s) if s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl PartialEq<String> for Value {
    fn eq(&self, other: &String) -> bool {
        self == other.as_str()
    }
}

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        matches!(self, Value::Int(n) if n == other)
    }
}

impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        matches!(self, Value::Int(n) if *n == *other as i64)
    }
}

impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Value::Float(f) if f == other)
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Value::Bool(b) if b == other)
    }
}

// Reverse implementations for symmetry
impl PartialEq<Value> for str {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for &str {
    fn eq(&self, other: &Value) -> bool {
        other == *self
    }
}

impl PartialEq<Value> for i64 {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

impl PartialEq<Value> for bool {
    fn eq(&self, other: &Value) -> bool {
        other == self
    }
}

/// Builds a [`Value::List`] from a sequence of convertible items.
///
/// ```
/// # use rowset::{Value, list};
/// let v = list![1, "two", 3.0];
/// assert_eq!(v.element_count(), 3);
/// ```
#[macro_export]
macro_rules! list {
    () => { $crate::Value::List(::std::vec::Vec::new()) };
    ($($item:expr),+ $(,)?) => {
        $crate::Value::List(::std::vec![$($crate::Value::from($item)),+])
    };
}

/// Builds a [`Value::Record`] from `key => value` pairs.
///
/// ```
/// # use rowset::{Value, record};
/// let row = record! { "id" => 1, "name" => "Ada" };
/// assert_eq!(row.get_column("id"), Some(&Value::Int(1)));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Value::Record(::std::vec::Vec::new()) };
    ($($key:expr => $val:expr),+ $(,)?) => {
        $crate::Value::Record(::std::vec![
            $(($crate::Key::from($key), $crate::Value::from($val))),+
        ])
    };
}
