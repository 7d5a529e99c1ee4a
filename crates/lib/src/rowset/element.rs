//! Read-time views of container elements.
//!
//! [`Rowset::read`](super::Rowset::read) and friends never fail: they
//! return an [`Element`], which is a nested container, an encoded leaf, or
//! the [`Sentinel`] standing in for a missing element. The sentinel is
//! permanently empty and fully chainable, so call sites need no null
//! checks: any chain of accessor or transformation calls on missing data
//! degrades to further sentinels, empty containers, or null.

use std::fmt;

use crate::{Key, Result, Sort, Value, diagnostics::DiagnosticKind};

use super::{Encoding, Meta, Rowset};

/// A scalar read from a container, encoded on demand.
///
/// The stored value is untouched: [`Leaf::raw`] always returns the
/// original scalar, while [`Leaf::render`] (and `Display`) applies the
/// container's escaper when the effective mode is [`Encoding::Safe`].
#[derive(Clone)]
pub struct Leaf {
    value: Value,
    mode: Encoding,
    pub(crate) meta: Meta,
}

impl Leaf {
    pub(crate) fn new(value: Value, mode: Encoding, meta: Meta) -> Leaf {
        Leaf { value, mode, meta }
    }

    /// The raw scalar, exactly as stored.
    pub fn raw(&self) -> &Value {
        &self.value
    }

    /// Consumes the leaf, returning the raw scalar.
    pub fn into_raw(self) -> Value {
        self.value
    }

    /// The effective encoding mode of this read.
    pub fn mode(&self) -> Encoding {
        self.mode
    }

    /// The presentation form: raw text in raw mode, escaped text in safe
    /// mode.
    pub fn render(&self) -> String {
        let text = self.value.render();
        match self.mode {
            Encoding::Raw => text,
            Encoding::Safe => self.meta.escaper.escape(&text),
        }
    }

    pub(crate) fn report_scalar_access(&self, key: &str) {
        self.meta.diagnostics.report(
            DiagnosticKind::UsageDeprecated,
            key,
            "keyed access into a scalar leaf".to_string(),
        );
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Leaf({:?})", self.value)
    }
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.mode == other.mode
    }
}

/// The null-object returned for missing elements.
///
/// A sentinel carries the bag of the container that produced it, so
/// delegation behaves consistently: container-shaped calls delegate to an
/// empty container sharing the same encoding mode, annotations, load
/// handler and diagnostics channel. There is no transition out of the
/// empty state; a sentinel never becomes populated.
#[derive(Clone)]
pub struct Sentinel {
    pub(crate) meta: Meta,
}

impl Sentinel {
    pub(crate) fn new(meta: Meta) -> Sentinel {
        Sentinel { meta }
    }

    /// An empty container sharing this sentinel's bag.
    pub fn rows(&self) -> Rowset {
        Rowset::empty_with_meta(self.meta.clone())
    }

    /// Always yields another missing element, without a diagnostic.
    pub fn read(&self, key: impl Into<Key>) -> Element {
        let _ = key.into();
        Element::Missing(self.clone())
    }

    /// Always yields another missing element.
    pub fn nth(&self, _index: i64) -> Element {
        Element::Missing(self.clone())
    }

    /// Always `0`.
    pub fn len(&self) -> usize {
        0
    }

    /// Always true.
    pub fn is_empty(&self) -> bool {
        true
    }

    /// Always false.
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        let _ = key.into();
        false
    }

    /// The null leaf value.
    pub fn raw(&self) -> Value {
        Value::Null
    }

    /// Renders as the empty string.
    pub fn render(&self) -> String {
        String::new()
    }
}

impl fmt::Debug for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sentinel")
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Ok(())
    }
}

/// What a container read yields: rows, an encoded leaf, or the sentinel
/// for a missing element.
///
/// `Element` mirrors enough of the container surface that chains never
/// need to unwrap intermediate reads:
///
/// ```
/// # use rowset::{Rowset, list, record};
/// let rows = Rowset::new(list![record! { "id" => 1 }])?;
/// // Missing key, then a nested-only transformation: no panic, empty result.
/// let plucked = rows.read("absent").pluck("id", None)?;
/// assert!(plucked.is_empty());
/// # Ok::<(), rowset::Error>(())
/// ```
#[derive(Debug, Clone)]
pub enum Element {
    /// A nested container, returned unchanged.
    Rows(Rowset),
    /// A scalar wrapped for on-demand encoding.
    Leaf(Leaf),
    /// Nothing there; chainable stand-in.
    Missing(Sentinel),
}

impl Element {
    /// Returns true if this element stands in for a missing one.
    pub fn is_missing(&self) -> bool {
        matches!(self, Element::Missing(_))
    }

    /// Returns true if this element is a nested container.
    pub fn is_rows(&self) -> bool {
        matches!(self, Element::Rows(_))
    }

    /// Returns true if this element is a leaf scalar.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Element::Leaf(_))
    }

    /// Borrows the nested container, if any.
    pub fn as_rows(&self) -> Option<&Rowset> {
        match self {
            Element::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Borrows the leaf, if any.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Element::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// The raw projection of the element: the unwrapped scalar, the nested
    /// structure, or null for a missing element.
    pub fn raw(&self) -> Value {
        match self {
            Element::Rows(rows) => rows.to_value(),
            Element::Leaf(leaf) => leaf.raw().clone(),
            Element::Missing(_) => Value::Null,
        }
    }

    /// The container view of the element. Leaves and missing elements
    /// delegate to an empty container sharing the producing container's
    /// bag, which is what keeps sentinel chains error-free.
    pub fn rows(&self) -> Rowset {
        match self {
            Element::Rows(rows) => rows.clone(),
            Element::Leaf(leaf) => Rowset::empty_with_meta(leaf.meta.clone()),
            Element::Missing(sentinel) => sentinel.rows(),
        }
    }

    /// The presentation form: encoded leaf text, the JSON form for rows,
    /// empty for missing.
    pub fn render(&self) -> String {
        match self {
            Element::Rows(rows) => rows.to_json_string(),
            Element::Leaf(leaf) => leaf.render(),
            Element::Missing(_) => String::new(),
        }
    }

    /// Number of direct elements; `0` for leaves and missing elements.
    pub fn len(&self) -> usize {
        match self {
            Element::Rows(rows) => rows.len(),
            _ => 0,
        }
    }

    /// Returns true unless this is a non-empty container.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // --- chainable accessor surface -------------------------------------

    /// Reads a key out of the element's container view.
    ///
    /// Reading into a scalar leaf is a retained legacy pattern: it yields
    /// the sentinel and reports a `UsageDeprecated` diagnostic.
    pub fn read(&self, key: impl Into<Key>) -> Element {
        match self {
            Element::Rows(rows) => rows.read(key),
            Element::Leaf(leaf) => {
                leaf.report_scalar_access(&key.into().to_string());
                Element::Missing(Sentinel::new(leaf.meta.clone()))
            }
            Element::Missing(sentinel) => sentinel.read(key),
        }
    }

    /// Reads a key with a default, like [`Rowset::get`].
    pub fn get(&self, key: impl Into<Key>, default: impl Into<Value>) -> Element {
        self.rows().get(key, default)
    }

    /// Positional read, like [`Rowset::nth`].
    pub fn nth(&self, index: i64) -> Element {
        match self {
            Element::Rows(rows) => rows.nth(index),
            Element::Leaf(leaf) => {
                leaf.report_scalar_access(&index.to_string());
                Element::Missing(Sentinel::new(leaf.meta.clone()))
            }
            Element::Missing(sentinel) => sentinel.nth(index),
        }
    }

    /// Returns true if the element's container view holds the key.
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        match self {
            Element::Rows(rows) => rows.contains_key(key),
            _ => false,
        }
    }

    // --- chainable transformation surface -------------------------------
    //
    // Each delegates to the container view, so missing elements (and
    // scalar leaves) behave like empty containers instead of failing.

    /// See [`Rowset::pluck`].
    pub fn pluck(&self, value_column: &str, key_column: Option<&str>) -> Result<Rowset> {
        self.rows().pluck(value_column, key_column)
    }

    /// See [`Rowset::pluck_nth`].
    pub fn pluck_nth(&self, index: i64) -> Result<Rowset> {
        self.rows().pluck_nth(index)
    }

    /// See [`Rowset::column`].
    pub fn column(&self, name: &str) -> Result<Rowset> {
        self.rows().column(name)
    }

    /// See [`Rowset::index_by`].
    pub fn index_by(&self, column: &str) -> Result<Rowset> {
        self.rows().index_by(column)
    }

    /// See [`Rowset::group_by`].
    pub fn group_by(&self, column: &str) -> Result<Rowset> {
        self.rows().group_by(column)
    }

    /// See [`Rowset::rows_where`].
    pub fn rows_where(&self, conditions: Value) -> Result<Rowset> {
        self.rows().rows_where(conditions)
    }

    /// See [`Rowset::sort`].
    pub fn sort(&self, flag: Sort) -> Result<Rowset> {
        self.rows().sort(flag)
    }

    /// See [`Rowset::sort_by`].
    pub fn sort_by(&self, column: &str, flag: Sort) -> Result<Rowset> {
        self.rows().sort_by(column, flag)
    }

    /// See [`Rowset::unique`].
    pub fn unique(&self) -> Result<Rowset> {
        self.rows().unique()
    }

    /// See [`Rowset::chunk`].
    pub fn chunk(&self, size: usize) -> Result<Rowset> {
        self.rows().chunk(size)
    }

    /// See [`Rowset::values`].
    pub fn values(&self) -> Rowset {
        self.rows().values()
    }

    /// See [`Rowset::keys`].
    pub fn keys(&self) -> Rowset {
        self.rows().keys()
    }

    /// See [`Rowset::implode`].
    pub fn implode(&self, separator: &str) -> Result<String> {
        self.rows().implode(separator)
    }

    /// See [`Rowset::contains`].
    pub fn contains(&self, needle: &Value) -> bool {
        match self {
            Element::Rows(rows) => rows.contains(needle),
            Element::Leaf(leaf) => leaf.raw().loose_eq(needle),
            Element::Missing(_) => false,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl PartialEq<Value> for Element {
    fn eq(&self, other: &Value) -> bool {
        self.raw() == *other
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.raw() == other.raw()
    }
}
