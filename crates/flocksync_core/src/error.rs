//! Error types for the Flocksync data layer.

use thiserror::Error;

/// Result type for data-layer operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors surfaced to callers of the data layer.
///
/// The five network kinds (`NoInternet`, `Timeout`, `Client`, `Server`,
/// `Unknown`) are produced only by [`crate::classify`]. `Validation` and
/// `Storage` exist because local failures must be representable too: no raw
/// error ever escapes a repository operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// No network connectivity.
    #[error("no internet connection")]
    NoInternet,

    /// The remote call exceeded its deadline.
    #[error("operation timed out")]
    Timeout,

    /// The remote rejected the request (HTTP 4xx).
    #[error("client error (HTTP {0})")]
    Client(u16),

    /// The remote failed to process the request (HTTP 5xx).
    #[error("server error (HTTP {0})")]
    Server(u16),

    /// Any failure outside the closed network taxonomy.
    #[error("unknown error: {0}")]
    Unknown(String),

    /// Registration input is missing required fields.
    #[error("missing required fields: {}", missing.join(", "))]
    Validation {
        /// Names of the required fields that were absent.
        missing: Vec<String>,
    },

    /// The local store failed. Never retried.
    #[error("local store error: {0}")]
    Storage(String),
}

impl DataError {
    /// Wraps an arbitrary error as `Unknown`, keeping its display text.
    pub fn unknown(cause: impl std::fmt::Display) -> Self {
        Self::Unknown(cause.to_string())
    }

    /// Wraps a local-store failure.
    pub fn storage(cause: impl std::fmt::Display) -> Self {
        Self::Storage(cause.to_string())
    }

    /// Returns true if a retry could plausibly succeed.
    ///
    /// Transient by default: server-side failures and timeouts. Client
    /// errors, validation and storage failures are deterministic and
    /// connectivity absence is not worth hammering.
    pub fn is_transient(&self) -> bool {
        matches!(self, DataError::Server(_) | DataError::Timeout)
    }
}

/// Raw failures reported by a remote transport implementation.
///
/// This is what the wire layer is allowed to say; [`crate::classify`] maps
/// it into the [`DataError`] taxonomy at the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The host could not be reached at all.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The request did not complete within the transport's deadline.
    #[error("request timed out after {millis}ms")]
    TimedOut {
        /// Deadline that elapsed, in milliseconds.
        millis: u64,
    },

    /// The remote answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Status code as received.
        status: u16,
        /// Response body or status text.
        message: String,
    },

    /// Anything else the transport could not describe more precisely.
    #[error("transport error: {0}")]
    Other(String),
}
