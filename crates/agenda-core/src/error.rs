//! Domain error types.

use thiserror::Error;

use crate::document::Kind;

/// Top-level error type for the storage and resolution layer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A lookup by key missed.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Kind of the missing document.
        kind: Kind,
        /// Rendered key of the missing document.
        key: String,
    },

    /// Construction-time validation failed. Every violation is accumulated
    /// before reporting; validation never stops at the first problem.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A pagination token was malformed or belongs to a different query.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// An underlying store I/O failure, wrapping the backend error text.
    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    /// Builds a `NotFound` error for a key of the given kind.
    #[must_use]
    pub fn not_found(kind: Kind, key: impl Into<String>) -> Self {
        DomainError::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Returns true when this error is a lookup miss.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_joins_all_violations() {
        let err = DomainError::Validation(vec![
            "date is not defined".to_owned(),
            "title is not defined".to_owned(),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: date is not defined; title is not defined"
        );
    }

    #[test]
    fn test_not_found_names_kind_and_key() {
        let err = DomainError::not_found(Kind::Event, "Event(9)");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Event not found: Event(9)");
    }
}
