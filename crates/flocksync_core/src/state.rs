//! The result envelope used by every data-layer operation.

use crate::error::DataError;

/// Envelope around the outcome of a fallible, possibly-async operation.
///
/// Streamed reads emit a sequence of these; one-shot writes return exactly
/// one `Success` or `Error`. `Loading` only ever appears as an initial or
/// intermediate marker.
#[derive(Debug, Clone, PartialEq)]
pub enum DataState<T> {
    /// The operation produced a value.
    Success(T),
    /// The operation failed with a classified error.
    Error(DataError),
    /// The operation is still in flight and no cached value exists yet.
    Loading,
}

impl<T> DataState<T> {
    /// Applies `f` to the `Success` payload, passing `Error` and `Loading`
    /// through unchanged.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DataState<U> {
        match self {
            DataState::Success(value) => DataState::Success(f(value)),
            DataState::Error(error) => DataState::Error(error),
            DataState::Loading => DataState::Loading,
        }
    }

    /// Applies a fallible transform to the `Success` payload.
    ///
    /// A transform failure becomes the `Error` variant, so a fallible
    /// mapping step can never leak an unwrapped error to the caller.
    pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U, DataError>) -> DataState<U> {
        match self {
            DataState::Success(value) => match f(value) {
                Ok(mapped) => DataState::Success(mapped),
                Err(error) => DataState::Error(error),
            },
            DataState::Error(error) => DataState::Error(error),
            DataState::Loading => DataState::Loading,
        }
    }

    /// Runs `action` if this is `Success`, returning the envelope unchanged.
    pub fn on_success(self, action: impl FnOnce(&T)) -> Self {
        if let DataState::Success(value) = &self {
            action(value);
        }
        self
    }

    /// Runs `action` if this is `Error`, returning the envelope unchanged.
    pub fn on_error(self, action: impl FnOnce(&DataError)) -> Self {
        if let DataState::Error(error) = &self {
            action(error);
        }
        self
    }

    /// Runs `action` if this is `Loading`, returning the envelope unchanged.
    pub fn on_loading(self, action: impl FnOnce()) -> Self {
        if let DataState::Loading = &self {
            action();
        }
        self
    }

    /// Returns true for the `Success` variant.
    pub fn is_success(&self) -> bool {
        matches!(self, DataState::Success(_))
    }

    /// Returns true for the `Error` variant.
    pub fn is_error(&self) -> bool {
        matches!(self, DataState::Error(_))
    }

    /// Returns true for the `Loading` variant.
    pub fn is_loading(&self) -> bool {
        matches!(self, DataState::Loading)
    }

    /// Consumes the envelope, returning the payload if present.
    pub fn success(self) -> Option<T> {
        match self {
            DataState::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the error if present.
    pub fn error(&self) -> Option<&DataError> {
        match self {
            DataState::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl<T> From<Result<T, DataError>> for DataState<T> {
    fn from(result: Result<T, DataError>) -> Self {
        match result {
            Ok(value) => DataState::Success(value),
            Err(error) => DataState::Error(error),
        }
    }
}
