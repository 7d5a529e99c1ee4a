//!
//! Rowset: a recursive, immutable-transform container for nested record data.
//! This library wraps tabular/record data (e.g. query result sets) so calling
//! code can traverse and reshape it without re-deriving encoding or positional
//! context at every step.
//!
//! ## Core Concepts
//!
//! * **Values (`value::Value`)**: The raw nested structure a container is built
//!   from and projects back to. Scalars, nulls, lists and records.
//! * **Containers (`rowset::Rowset`)**: The central recursive data structure,
//!   an ordered key→value mapping built once and never mutated; every
//!   transformation (`filter`, `sort_by`, `group_by`, `pluck`, `merge`, ...)
//!   returns a new container with the metadata bag copied forward.
//! * **Elements (`rowset::Element`)**: What reads yield. Leaves encode on
//!   demand (raw or safe-for-embedding per the container's `Encoding` mode);
//!   nested containers pass through unchanged; missing keys yield the
//!   chainable `Sentinel` instead of an error.
//! * **Metadata bag**: Encoding mode, the non-owning ancestor back-reference,
//!   1-based sibling position, opaque annotations, and the lazy relation
//!   `LoadHandler`, all propagated through every derived view.
//! * **Diagnostics (`diagnostics::Diagnostics`)**: Missing keys and columns are
//!   soft: recorded on an injectable channel and mirrored to `tracing`, never
//!   raised. Errors are reserved for genuine misuse (wrong shape, bad
//!   arguments, loader contract violations).
//!
//! ## Example
//!
//! ```
//! use rowset::{Rowset, list, record};
//!
//! let rows = Rowset::new(list![
//!     record! { "id" => 1, "state" => "open" },
//!     record! { "id" => 2, "state" => "done" },
//!     record! { "id" => 3, "state" => "open" },
//! ])?;
//!
//! let open = rows.rows_where_eq("state", "open")?;
//! assert_eq!(open.len(), 2);
//!
//! // Missing data stays chainable: no unwraps, no panics.
//! assert!(rows.read("missing").read("also missing").is_missing());
//! # Ok::<(), rowset::Error>(())
//! ```

pub mod diagnostics;
pub mod errors;
pub mod escape;
pub mod key;
pub mod rowset;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use errors::Error;
pub use escape::{Escaper, HtmlEscaper};
pub use key::Key;
pub use rowset::{
    Annotations, Element, Encoding, Leaf, LoadHandler, LoadReply, Options, Position, Rowset,
    Sentinel,
};
pub use value::{Sort, Value};

/// Result type used throughout the Rowset library.
pub type Result<T> = std::result::Result<T, Error>;
