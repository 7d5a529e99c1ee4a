//! Error types for container construction and transformation.
//!
//! This module defines the structured error type shared across the crate,
//! covering malformed construction input, violated structural preconditions,
//! and relation-loader contract failures. Soft conditions (missing keys and
//! columns) are never errors; they flow through the diagnostics channel
//! instead, see [`crate::diagnostics`].

use thiserror::Error;

/// Structured error type for container operations.
///
/// Every variant is fatal: the crate never raises an error for missing data,
/// only for genuine programming mistakes such as handing a scalar where a
/// row collection is required, or invoking the relation loader without
/// configuring one.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// Construction input (or an operation argument) is malformed.
    #[error("invalid input at `{key}`: {reason}")]
    InvalidInput { key: String, reason: String },

    /// An operation's structural precondition does not hold.
    #[error("`{operation}` shape mismatch: {reason}")]
    ShapeMismatch {
        operation: &'static str,
        reason: String,
    },

    /// An argument is of the wrong shape for the call, independent of the
    /// container's own structure.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// The relation loader was invoked on a container with no handler
    /// configured.
    #[error("no relation load handler configured")]
    NoHandler,

    /// The configured relation load handler reported that it cannot serve
    /// the requested column.
    #[error("no relation loader available for column `{column}`")]
    HandlerUnavailable { column: String },

    /// The relation load handler returned data that violates its contract.
    #[error("relation loader contract violation: {reason}")]
    ContractViolation { reason: String },
}

impl Error {
    /// Check if this error comes from malformed construction input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Error::InvalidInput { .. })
    }

    /// Check if this error is a structural precondition failure.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, Error::ShapeMismatch { .. })
    }

    /// Check if this error is a malformed call argument.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }

    /// Check if this error relates to the relation-loader collaborator.
    pub fn is_loader_error(&self) -> bool {
        matches!(
            self,
            Error::NoHandler | Error::HandlerUnavailable { .. } | Error::ContractViolation { .. }
        )
    }

    /// Get the operation name if this is an operation-specific error.
    pub fn operation(&self) -> Option<&str> {
        match self {
            Error::ShapeMismatch { operation, .. } => Some(operation),
            _ => None,
        }
    }

    /// Get the key if this is a key-related error.
    pub fn key(&self) -> Option<&str> {
        match self {
            Error::InvalidInput { key, .. } => Some(key),
            _ => None,
        }
    }
}
