//! Error types for local store implementations.

use thiserror::Error;

/// Result type for local store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors a [`crate::LocalStore`] implementation may report.
///
/// Store failures are terminal for the operation that hit them: the
/// repository never retries a local write and never falls through to a
/// remote attempt after one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The underlying storage backend failed.
    #[error("store backend error: {0}")]
    Backend(String),

    /// The addressed row does not exist.
    #[error("row not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(
            StoreError::Backend("disk full".into()).to_string(),
            "store backend error: disk full"
        );
        assert_eq!(
            StoreError::NotFound("flock-9".into()).to_string(),
            "row not found: flock-9"
        );
    }
}
