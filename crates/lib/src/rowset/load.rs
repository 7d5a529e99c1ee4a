//! Lazy relation loading for single-record containers.
//!
//! A container built from one record can fetch related data on demand
//! through a caller-supplied handler, configured at construction via
//! [`Options::load_handler`](super::Options::load_handler) and inherited
//! verbatim by every derived container. The handler receives the record
//! and the requested column and answers with the related raw data plus the
//! annotations for the new container, or declares the column unservable.

use std::rc::Rc;

use crate::{Error, Result, Value};

use super::{Annotations, Element, Options, Rowset};

/// What a relation load handler answers.
pub enum LoadReply {
    /// No loader exists for the requested column; surfaces as
    /// [`Error::HandlerUnavailable`].
    Unavailable,
    /// Related data plus the annotations for the loaded container.
    Loaded {
        /// Array-shaped raw data for the related container.
        data: Value,
        /// Annotations replacing (not merging into) the receiver's.
        annotations: Annotations,
    },
}

/// Caller-supplied callback for on-demand retrieval of related data.
pub type LoadHandler = Rc<dyn Fn(&Rowset, &str) -> LoadReply>;

impl Rowset {
    /// Loads related data for `column` through the configured handler.
    ///
    /// On an empty container the sentinel is returned without invoking the
    /// handler. Otherwise the call fails with [`Error::NoHandler`] when no
    /// handler is configured, [`Error::InvalidArgument`] when the column
    /// name is empty or holds characters outside `[A-Za-z0-9_-]`, and
    /// [`Error::ShapeMismatch`] when the container is a row collection
    /// rather than a single record.
    ///
    /// On success the result is a new container built from the handler's
    /// data, inheriting this container's encoding mode, load handler,
    /// escaper and diagnostics channel, with annotations replaced by the
    /// handler's map.
    pub fn load(&self, column: &str) -> Result<Element> {
        if self.is_empty() {
            return Ok(Element::Missing(self.sentinel()));
        }
        let handler = self.load_handler().ok_or(Error::NoHandler)?;
        if column.is_empty()
            || !column
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::InvalidArgument {
                reason: format!("invalid relation column name {column:?}"),
            });
        }
        if self.has_nested() {
            return Err(Error::ShapeMismatch {
                operation: "load",
                reason: "relations load from a single record, found a row collection"
                    .to_string(),
            });
        }

        match handler(self, column) {
            LoadReply::Unavailable => Err(Error::HandlerUnavailable {
                column: column.to_string(),
            }),
            LoadReply::Loaded { data, annotations } => {
                if !data.is_array_shaped() {
                    return Err(Error::ContractViolation {
                        reason: format!(
                            "loader for column {column:?} returned {}, expected array-shaped data",
                            data.type_name()
                        ),
                    });
                }
                let meta = &self.inner.meta;
                let rows = Rowset::with_options(
                    data,
                    Options::new()
                        .mode(meta.mode)
                        .annotations(annotations)
                        .load_handler(handler.clone())
                        .diagnostics(meta.diagnostics.clone())
                        .escaper(meta.escaper.clone())
                        .encode_keys(meta.encode_keys),
                )?;
                Ok(Element::Rows(rows))
            }
        }
    }

    /// The configured relation load handler, if any.
    pub fn load_handler(&self) -> Option<LoadHandler> {
        self.inner.meta.load.clone()
    }
}
