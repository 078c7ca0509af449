//! # Flocksync Testkit
//!
//! Shared fixtures and proptest generators for the Flocksync crates.
//!
//! Everything in here is test support: deterministic sample entities for
//! scenario tests and `proptest` strategies for property tests. Production
//! crates must not depend on it outside `dev-dependencies`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::{
    mortality_record, remote_flock_record, sample_flock, sample_registration, sensor_reading,
    traceable_registration,
};
pub use generators::{arb_flock, arb_mortality_record, arb_sensor_reading};
