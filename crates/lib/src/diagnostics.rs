//! Structured diagnostics channel for non-fatal conditions.
//!
//! Missing keys and columns never raise errors; they are recorded here and
//! mirrored to `tracing` as warnings. The channel is a cloneable handle
//! injected at container construction and inherited by every derived
//! container, so tests can inspect or mute it per container without any
//! global state.

use std::{cell::RefCell, rc::Rc};

/// Classification of a non-fatal diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A read addressed a key the container does not hold.
    MissingKey,
    /// A row operation addressed a column a row does not hold.
    MissingColumn,
    /// A legacy access pattern retained for compatibility was used.
    UsageDeprecated,
    /// A fallback value could not be converted into a container.
    InvalidDefault,
}

impl DiagnosticKind {
    /// Returns the kind as a stable string, used in log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::MissingKey => "missing_key",
            DiagnosticKind::MissingColumn => "missing_column",
            DiagnosticKind::UsageDeprecated => "usage_deprecated",
            DiagnosticKind::InvalidDefault => "invalid_default",
        }
    }
}

/// A single recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went soft-wrong.
    pub kind: DiagnosticKind,
    /// The offending key or column.
    pub key: String,
    /// Where it happened: the call site when resolvable, otherwise the
    /// operation name.
    pub context: String,
}

#[derive(Debug, Default)]
struct State {
    muted: bool,
    records: Vec<Diagnostic>,
}

/// Cloneable handle to a diagnostics sink shared by a container tree.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    state: Rc<RefCell<State>>,
}

impl Diagnostics {
    /// Creates an active diagnostics channel.
    pub fn new() -> Self {
        Diagnostics {
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Creates a muted channel: reports are dropped without recording or
    /// logging.
    pub fn muted() -> Self {
        let diagnostics = Diagnostics::new();
        diagnostics.set_muted(true);
        diagnostics
    }

    /// Mutes or unmutes the channel.
    pub fn set_muted(&self, muted: bool) {
        self.state.borrow_mut().muted = muted;
    }

    /// Returns true if the channel is muted.
    pub fn is_muted(&self) -> bool {
        self.state.borrow().muted
    }

    pub(crate) fn report(&self, kind: DiagnosticKind, key: &str, context: String) {
        if self.is_muted() {
            return;
        }
        tracing::warn!(
            kind = kind.as_str(),
            key,
            context = context.as_str(),
            "container diagnostic"
        );
        self.state.borrow_mut().records.push(Diagnostic {
            kind,
            key: key.to_string(),
            context,
        });
    }

    /// Returns a snapshot of all recorded diagnostics.
    pub fn records(&self) -> Vec<Diagnostic> {
        self.state.borrow().records.clone()
    }

    /// Drains and returns all recorded diagnostics.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.state.borrow_mut().records)
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.state.borrow().records.len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.state.borrow().records.is_empty()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics::new()
    }
}
