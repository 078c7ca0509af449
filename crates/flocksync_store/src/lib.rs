//! # Flocksync Store
//!
//! Persistence and remote-source contracts for the Flocksync data layer.
//!
//! This crate provides:
//! - `Row` types carrying cache metadata for each entity
//! - The `LocalStore` contract (synchronous, durable cache)
//! - The `RemoteSource` contract (async, possibly-unreachable real-time
//!   backing service) and the untyped `RemoteRecord` it speaks
//! - `MemoryLocalStore` and `MockRemoteSource` for tests and local
//!   composition roots
//!
//! Concrete production backends (an embedded row store, a real-time
//! document service) implement these traits outside this workspace; the
//! repository layer consumes the contracts only.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod local;
mod remote;
mod row;

pub use error::{StoreError, StoreResult};
pub use local::{LocalStore, MemoryLocalStore};
pub use remote::{
    Collection, FieldValue, MockRemoteSource, RecordStream, RemoteRecord, RemoteSource,
};
pub use row::{FlockRow, MortalityRow, Row, SensorRow};
