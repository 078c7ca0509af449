//! # Flocksync Repo
//!
//! Offline-first sync repository for the Flocksync data layer.
//!
//! This crate composes the core primitives, the domain model and the store
//! contracts into reactive, cached, retried CRUD per entity type:
//!
//! - Streamed reads emit the cached local value first, then remote-derived
//!   updates; a remote failure never retracts an already-emitted cached
//!   value.
//! - One-shot writes go to the local store first (the durable source of
//!   truth), then push to the remote through the retry policy; a failed
//!   push leaves the row dirty for a later [`SyncRepository::sync_pending`]
//!   sweep.
//! - Every committed local write is published on a typed [`EventBus`].
//!
//! ## Key Invariants
//!
//! - The cached emission always precedes the first remote-derived emission
//! - Raw transport errors are classified before they reach a caller
//! - Local-store failures are terminal: never retried, never followed by a
//!   remote attempt
//! - A locally modified (`needs_sync`) row wins over the remote copy until
//!   it has been pushed

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod events;
mod mapper;
mod repository;

pub use config::RepoConfig;
pub use events::{Change, EntityEvent, EventBus};
pub use mapper::SyncEntity;
pub use repository::{SyncRepository, SyncSummary};
