//! # Flocksync Model
//!
//! Domain entities for the Flocksync data layer.
//!
//! This crate provides:
//! - `Flock` and its supporting enums
//! - `MortalityRecord` and `SensorReading`
//! - `FlockRegistration` input and the registry field-requirement tables
//!
//! Entities here are plain data: persistence rows and remote wire maps live
//! in `flocksync_store`, and the mapping between the three representations
//! is owned by `flocksync_repo`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod flock;
mod mortality;
pub mod registry;
mod sensor;

pub use flock::{AgeGroup, Flock, FlockType, Gender, RegistryType};
pub use mortality::{MortalityCause, MortalityRecord};
pub use registry::{optional_fields, required_fields, Field, FlockRegistration};
pub use sensor::SensorReading;
