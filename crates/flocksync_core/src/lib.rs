//! # Flocksync Core
//!
//! Shared primitives for the Flocksync offline-first data layer.
//!
//! This crate provides:
//! - `DataState` result envelope used by every read/write operation
//! - `DataError` closed error taxonomy
//! - Transport error classification
//! - Retry with exponential backoff
//!
//! ## Key Invariants
//!
//! - Raw transport errors never cross this layer unclassified
//! - `Loading` is an initial/intermediate marker, never a terminal value
//!   of a one-shot operation
//! - Only `Server` and `Timeout` errors are retried by default

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod error;
mod retry;
mod state;

pub use classify::classify;
pub use error::{DataError, DataResult, TransportError};
pub use retry::{execute_with_backoff, RetryConfig};
pub use state::DataState;
