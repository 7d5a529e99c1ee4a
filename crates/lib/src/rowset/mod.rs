//! The container type: a recursive, immutable-transform wrapper around
//! nested record data.
//!
//! [`Rowset`] wraps an ordered key→value mapping in which every non-scalar
//! value is itself a `Rowset`. A container is built once from a raw
//! [`Value`] tree and never mutated; every transformation returns a new
//! container carrying the receiver's metadata forward. Reads decide at the
//! last moment whether a leaf presents its raw scalar or a
//! safe-for-embedding form, based on the container's [`Encoding`] mode.
//!
//! # Usage
//!
//! ```
//! use rowset::{Rowset, list, record};
//!
//! let rows = Rowset::new(list![
//!     record! { "id" => 1, "name" => "Ada" },
//!     record! { "id" => 2, "name" => "Grace" },
//! ])?;
//!
//! let names = rows.pluck("name", Some("id"))?;
//! assert_eq!(names.to_json_string(), r#"{"1":"Ada","2":"Grace"}"#);
//! # Ok::<(), rowset::Error>(())
//! ```
//!
//! Missing keys are never an error: reads yield a chainable
//! [`Sentinel`](element::Sentinel) and report through the container's
//! diagnostics channel instead.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    rc::{Rc, Weak},
};

use serde::{Serialize, Serializer};

use crate::{
    Error, Key, Result, Value,
    diagnostics::{DiagnosticKind, Diagnostics},
    escape::{Escaper, HtmlEscaper},
    value::dense_int_keys,
};

pub mod element;
pub mod load;
mod transform;


pub use element::{Element, Leaf, Sentinel};
pub use load::{LoadHandler, LoadReply};

/// How leaf reads present scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// Leaves read back as their raw scalars.
    #[default]
    Raw,
    /// Leaves read back escaped for embedding in output documents.
    Safe,
}

/// Ordinal bookkeeping for a container that became a child element.
///
/// Computed once, at the construction pass that placed the child in its
/// parent; never recomputed when the child is reused elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// 1-based ordinal among the siblings of the construction pass.
    pub ordinal: usize,
    /// True only for the first sibling.
    pub first: bool,
    /// True only for the last sibling.
    pub last: bool,
}

/// Opaque caller-supplied metadata carried alongside container data.
pub type Annotations = BTreeMap<String, Value>;

/// The metadata bag every container carries and propagates to derived
/// containers.
#[derive(Clone)]
pub(crate) struct Meta {
    pub(crate) mode: Encoding,
    /// Non-owning back-reference to the root of the originating tree. A
    /// root points at itself.
    pub(crate) ancestor: Weak<Inner>,
    pub(crate) position: Option<Position>,
    pub(crate) annotations: Rc<Annotations>,
    pub(crate) load: Option<LoadHandler>,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) escaper: Rc<dyn Escaper>,
    pub(crate) encode_keys: bool,
}

pub(crate) struct Inner {
    pub(crate) entries: Vec<(Key, Slot)>,
    pub(crate) index: HashMap<Key, usize>,
    pub(crate) meta: Meta,
}

/// A stored element: a leaf scalar or a nested container.
#[derive(Clone)]
pub(crate) enum Slot {
    Leaf(Value),
    Rows(Rowset),
}

impl Slot {
    pub(crate) fn to_raw(&self) -> Value {
        match self {
            Slot::Leaf(value) => value.clone(),
            Slot::Rows(rows) => rows.to_value(),
        }
    }

    pub(crate) fn is_rows(&self) -> bool {
        matches!(self, Slot::Rows(_))
    }
}

/// Construction options: the initial metadata bag.
///
/// ```
/// # use rowset::{Encoding, Options, Rowset, list};
/// let rows = Rowset::with_options(list![1, 2], Options::new().mode(Encoding::Safe))?;
/// assert_eq!(rows.mode(), Encoding::Safe);
/// # Ok::<(), rowset::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct Options {
    mode: Encoding,
    annotations: Annotations,
    load: Option<LoadHandler>,
    ancestor: Option<Rowset>,
    diagnostics: Option<Diagnostics>,
    escaper: Option<Rc<dyn Escaper>>,
    encode_keys: bool,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    /// Sets the leaf encoding mode (default: [`Encoding::Raw`]).
    pub fn mode(mut self, mode: Encoding) -> Self {
        self.mode = mode;
        self
    }

    /// Attaches caller-supplied out-of-band metadata.
    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Configures the lazy relation load handler.
    pub fn load_handler(mut self, handler: LoadHandler) -> Self {
        self.load = Some(handler);
        self
    }

    /// Declares the given container the ancestor of the one being built,
    /// instead of the new container itself.
    pub fn ancestor(mut self, ancestor: &Rowset) -> Self {
        self.ancestor = Some(ancestor.clone());
        self
    }

    /// Injects a diagnostics channel (default: a fresh active channel).
    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Replaces the leaf encoder collaborator (default: [`HtmlEscaper`]).
    pub fn escaper(mut self, escaper: Rc<dyn Escaper>) -> Self {
        self.escaper = Some(escaper);
        self
    }

    /// Makes `sprintf` escape keys as well as values in safe mode.
    pub fn encode_keys(mut self, encode_keys: bool) -> Self {
        self.encode_keys = encode_keys;
        self
    }
}

/// The central recursive container. Cheap to clone; all clones share the
/// same immutable tree.
#[derive(Clone)]
pub struct Rowset {
    pub(crate) inner: Rc<Inner>,
}

impl Rowset {
    /// Converts a raw nested structure into a container with a fresh
    /// metadata bag (raw encoding, no annotations, no load handler).
    pub fn new(raw: Value) -> Result<Rowset> {
        Rowset::with_options(raw, Options::new())
    }

    /// Converts a raw nested structure into a container with the given
    /// options.
    ///
    /// The top-level value must be array-shaped, every float must be
    /// finite, and those rules hold recursively; anything else fails with
    /// [`Error::InvalidInput`] naming the offending key.
    pub fn with_options(raw: Value, options: Options) -> Result<Rowset> {
        validate_raw(&raw)?;
        let meta = Meta {
            mode: options.mode,
            ancestor: Weak::new(),
            position: None,
            annotations: Rc::new(options.annotations),
            load: options.load,
            diagnostics: options.diagnostics.unwrap_or_default(),
            escaper: options.escaper.unwrap_or_else(|| Rc::new(HtmlEscaper)),
            encode_keys: options.encode_keys,
        };
        Ok(match options.ancestor {
            Some(ancestor) => Rowset {
                inner: Rc::new(build_inner(
                    raw,
                    Meta {
                        ancestor: Rc::downgrade(&ancestor.inner),
                        ..meta
                    },
                )),
            },
            // A fresh root is its own ancestor; new_cyclic hands every
            // descendant a weak reference to the finished root.
            None => Rowset {
                inner: Rc::new_cyclic(|root| {
                    build_inner(
                        raw,
                        Meta {
                            ancestor: root.clone(),
                            ..meta
                        },
                    )
                }),
            },
        })
    }

    /// Number of direct elements.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns true if the container holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// The container's leaf encoding mode.
    pub fn mode(&self) -> Encoding {
        self.inner.meta.mode
    }

    /// Caller-supplied out-of-band metadata, inherited by every derived
    /// container.
    pub fn annotations(&self) -> &Annotations {
        &self.inner.meta.annotations
    }

    /// Ordinal bookkeeping if this container became a child element at
    /// construction time; `None` for roots and derived containers.
    pub fn position(&self) -> Option<Position> {
        self.inner.meta.position
    }

    /// True if this container was the first child of its construction pass.
    pub fn is_first(&self) -> bool {
        self.position().is_some_and(|p| p.first)
    }

    /// True if this container was the last child of its construction pass.
    pub fn is_last(&self) -> bool {
        self.position().is_some_and(|p| p.last)
    }

    /// The root container of the tree this one originated from.
    ///
    /// The back-reference is non-owning; if the originating root has been
    /// dropped the container stands in for itself.
    pub fn ancestor(&self) -> Rowset {
        match self.inner.meta.ancestor.upgrade() {
            Some(inner) => Rowset { inner },
            None => self.clone(),
        }
    }

    /// The diagnostics channel shared by this container tree.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.inner.meta.diagnostics
    }

    /// Returns true if both handles refer to the very same container.
    pub fn ptr_eq(&self, other: &Rowset) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns true if the container holds the given key.
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.inner.index.contains_key(&key.into())
    }

    /// Reads an element by key, presenting leaves in the container's own
    /// encoding mode.
    ///
    /// A missing key yields a chainable [`Sentinel`] element and reports a
    /// `MissingKey` diagnostic, unless the container itself is empty.
    #[track_caller]
    pub fn read(&self, key: impl Into<Key>) -> Element {
        self.read_as(key, self.mode())
    }

    /// Reads an element by key with an explicit encoding mode for leaves.
    /// Nested containers are returned unchanged, never re-encoded.
    #[track_caller]
    pub fn read_as(&self, key: impl Into<Key>, mode: Encoding) -> Element {
        let key = key.into();
        match self.inner.index.get(&key) {
            Some(&at) => self.element_at(at, mode),
            None => {
                if !self.is_empty() {
                    let caller = std::panic::Location::caller();
                    self.inner.meta.diagnostics.report(
                        DiagnosticKind::MissingKey,
                        &key.to_string(),
                        caller.to_string(),
                    );
                }
                Element::Missing(self.sentinel())
            }
        }
    }

    /// Reads an element by key, falling back to `default` without any
    /// missing-key diagnostic.
    ///
    /// An absent key coerces the default into the container's
    /// representational family: scalars become encoded leaves, array-shaped
    /// values become a new container sharing this container's bag (minus
    /// position). An array default that fails construction validation
    /// degrades to the sentinel with an `InvalidDefault` diagnostic.
    #[track_caller]
    pub fn get(&self, key: impl Into<Key>, default: impl Into<Value>) -> Element {
        match self.inner.index.get(&key.into()) {
            Some(&at) => self.element_at(at, self.mode()),
            None => self.coerce_default(default.into()),
        }
    }

    /// Like [`Rowset::get`], but the default is an already-wrapped element
    /// (container or sentinel) passed through unchanged.
    pub fn get_with(&self, key: impl Into<Key>, default: Element) -> Element {
        match self.inner.index.get(&key.into()) {
            Some(&at) => self.element_at(at, self.mode()),
            None => default,
        }
    }

    /// Reads an element by insertion-order index. Negative indices resolve
    /// from the end; out of range yields the sentinel.
    #[track_caller]
    pub fn nth(&self, index: i64) -> Element {
        let len = self.len() as i64;
        let resolved = if index < 0 { len + index } else { index };
        if resolved < 0 || resolved >= len {
            if !self.is_empty() {
                let caller = std::panic::Location::caller();
                self.inner.meta.diagnostics.report(
                    DiagnosticKind::MissingKey,
                    &index.to_string(),
                    caller.to_string(),
                );
            }
            return Element::Missing(self.sentinel());
        }
        self.element_at(resolved as usize, self.mode())
    }

    /// The first element in insertion order.
    #[track_caller]
    pub fn first(&self) -> Element {
        self.nth(0)
    }

    /// The last element in insertion order.
    #[track_caller]
    pub fn last(&self) -> Element {
        self.nth(-1)
    }

    /// Iterates elements in insertion order as encoded views.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, Element)> + '_ {
        let mode = self.mode();
        self.inner
            .entries
            .iter()
            .map(move |(key, slot)| (key, self.view_slot(slot, mode)))
    }

    /// Iterates keys in insertion order.
    pub fn keys_iter(&self) -> impl Iterator<Item = &Key> + '_ {
        self.inner.entries.iter().map(|(key, _)| key)
    }

    /// Recursively strips all wrapping, returning the plain nested
    /// structure. Dense integer-keyed levels canonicalize to lists.
    pub fn to_value(&self) -> Value {
        let entries: Vec<(Key, Value)> = self
            .inner
            .entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.to_raw()))
            .collect();
        if dense_int_keys(&entries) {
            Value::List(entries.into_iter().map(|(_, value)| value).collect())
        } else {
            Value::Record(entries)
        }
    }

    /// Serializes the container's raw projection to a JSON string.
    /// Safe-mode encoding never leaks into serialization.
    pub fn to_json_string(&self) -> String {
        self.to_value().to_json_string()
    }

    /// Raw (unwrapped) values of the direct elements, in order.
    pub fn raw_values(&self) -> Vec<Value> {
        self.inner.entries.iter().map(|(_, slot)| slot.to_raw()).collect()
    }

    // --- internals shared with element/load/transform -------------------

    pub(crate) fn element_at(&self, at: usize, mode: Encoding) -> Element {
        let (_, slot) = &self.inner.entries[at];
        self.view_slot(slot, mode)
    }

    pub(crate) fn view_slot(&self, slot: &Slot, mode: Encoding) -> Element {
        match slot {
            Slot::Rows(rows) => Element::Rows(rows.clone()),
            Slot::Leaf(value) => {
                Element::Leaf(Leaf::new(value.clone(), mode, self.inner.meta.clone()))
            }
        }
    }

    pub(crate) fn sentinel(&self) -> Sentinel {
        Sentinel::new(Meta {
            position: None,
            ..self.inner.meta.clone()
        })
    }

    pub(crate) fn empty_with_meta(meta: Meta) -> Rowset {
        Rowset {
            inner: Rc::new(Inner {
                entries: Vec::new(),
                index: HashMap::new(),
                meta,
            }),
        }
    }

    #[track_caller]
    fn coerce_default(&self, default: Value) -> Element {
        if default.is_array_shaped() {
            match self.derived_from(default) {
                Ok(rows) => Element::Rows(rows),
                // An unconstructible default degrades to the sentinel, but
                // the construction failure is not swallowed silently.
                Err(err) => {
                    let caller = std::panic::Location::caller();
                    self.inner.meta.diagnostics.report(
                        DiagnosticKind::InvalidDefault,
                        err.key().unwrap_or("<default>"),
                        caller.to_string(),
                    );
                    Element::Missing(self.sentinel())
                }
            }
        } else {
            Element::Leaf(Leaf::new(default, self.mode(), self.inner.meta.clone()))
        }
    }

    /// Derived construction: validates arbitrary raw data and rebuilds a
    /// container with this container's bag copied forward.
    pub(crate) fn derived_from(&self, raw: Value) -> Result<Rowset> {
        validate_raw(&raw)?;
        Ok(self.rebuild_with_mode(raw, self.mode()))
    }

    /// Rebuilds from raw data known to be valid (produced by projecting an
    /// existing container), carrying the bag forward.
    pub(crate) fn rebuild(&self, raw: Value) -> Rowset {
        self.rebuild_with_mode(raw, self.mode())
    }

    pub(crate) fn rebuild_with_mode(&self, raw: Value, mode: Encoding) -> Rowset {
        // Derived containers start a fresh tree: no position of their own,
        // children get ordinals from the new construction pass.
        let meta = Meta {
            mode,
            position: None,
            ..self.inner.meta.clone()
        };
        Rowset {
            inner: Rc::new(build_inner(raw, meta)),
        }
    }

    pub(crate) fn has_nested(&self) -> bool {
        self.inner.entries.iter().any(|(_, slot)| slot.is_rows())
    }

    pub(crate) fn raw_entries(&self) -> Vec<(Key, Value)> {
        self.inner
            .entries
            .iter()
            .map(|(key, slot)| (key.clone(), slot.to_raw()))
            .collect()
    }

    pub(crate) fn report(&self, kind: DiagnosticKind, key: &str, context: &str) {
        self.inner
            .meta
            .diagnostics
            .report(kind, key, context.to_string());
    }
}

/// Converts raw pairs into stored slots, computing child positions from
/// this construction pass.
fn build_inner(raw: Value, meta: Meta) -> Inner {
    let pairs: Vec<(Key, Value)> = match raw {
        Value::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, value)| (Key::Int(i as i64), value))
            .collect(),
        Value::Record(entries) => entries,
        // Scalars are rejected by validate_raw before we get here.
        _ => Vec::new(),
    };

    let total = pairs.len();
    let mut entries: Vec<(Key, Slot)> = Vec::with_capacity(total);
    let mut index: HashMap<Key, usize> = HashMap::with_capacity(total);

    for (i, (key, value)) in pairs.into_iter().enumerate() {
        let slot = if value.is_array_shaped() {
            let child_meta = Meta {
                position: Some(Position {
                    ordinal: i + 1,
                    first: i == 0,
                    last: i + 1 == total,
                }),
                ..meta.clone()
            };
            Slot::Rows(Rowset {
                inner: Rc::new(build_inner(value, child_meta)),
            })
        } else {
            Slot::Leaf(value)
        };

        // Duplicate keys in record input: last one wins, in place.
        match index.get(&key) {
            Some(&at) => entries[at] = (key, slot),
            None => {
                index.insert(key.clone(), entries.len());
                entries.push((key, slot));
            }
        }
    }

    Inner {
        entries,
        index,
        meta,
    }
}

fn validate_raw(raw: &Value) -> Result<()> {
    if !raw.is_array_shaped() {
        return Err(Error::InvalidInput {
            key: "<root>".to_string(),
            reason: format!("container data must be array-shaped, got {}", raw.type_name()),
        });
    }
    validate_children(raw)
}

fn validate_children(raw: &Value) -> Result<()> {
    let check = |key: &Key, value: &Value| -> Result<()> {
        match value {
            Value::Float(f) if !f.is_finite() => Err(Error::InvalidInput {
                key: key.to_string(),
                reason: "non-finite float cannot be stored".to_string(),
            }),
            Value::List(_) | Value::Record(_) => validate_children(value),
            _ => Ok(()),
        }
    };
    match raw {
        Value::List(items) => {
            for (i, value) in items.iter().enumerate() {
                check(&Key::Int(i as i64), value)?;
            }
        }
        Value::Record(entries) => {
            for (key, value) in entries {
                check(key, value)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Structural equality over the raw projection; metadata does not take
/// part in comparisons.
impl PartialEq for Rowset {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.to_value() == other.to_value()
    }
}

impl Serialize for Rowset {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl fmt::Display for Rowset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

impl fmt::Debug for Rowset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rowset({})", self.to_json_string())
    }
}
