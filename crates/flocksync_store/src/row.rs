//! Row types persisted by the local store.
//!
//! Rows flatten domain entities into storage-friendly shapes (enums become
//! their stable string forms) and add the cache metadata the sync layer
//! needs: created/updated timestamps and the `needs_sync` dirty flag.

use serde::{Deserialize, Serialize};

/// Common surface every persisted row exposes to the store and the
/// repository.
pub trait Row: Clone + Send + Sync + 'static {
    /// Primary key.
    fn id(&self) -> &str;

    /// Secondary key used by list reads: flock type for flocks, flock id
    /// for mortality records, device id for sensor readings.
    fn list_key(&self) -> &str;

    /// True while the row carries local changes the remote has not seen.
    fn needs_sync(&self) -> bool;

    /// Sets the dirty flag.
    fn set_needs_sync(&mut self, needs_sync: bool);
}

/// A locally cached flock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockRow {
    /// Primary key.
    pub id: String,
    /// Owning farmer's id.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Stable string form of the flock type.
    pub flock_type: String,
    /// Stable string form of the registry type.
    pub registry_type: String,
    /// Stable string form of the age bracket.
    pub age_group: String,
    /// Breed, if known.
    pub breed: Option<String>,
    /// Sire flock id.
    pub father_id: Option<String>,
    /// Dam flock id.
    pub mother_id: Option<String>,
    /// Hatchery or farm of origin.
    pub place_of_birth: Option<String>,
    /// Hatch date, unix milliseconds.
    pub date_of_birth: Option<u64>,
    /// Provenance proof references.
    pub proofs: Option<Vec<String>>,
    /// Plumage colors.
    pub color: Option<String>,
    /// Vaccination record reference.
    pub vaccination: Option<String>,
    /// Average weight in kilograms.
    pub weight: Option<f64>,
    /// Average height in centimeters.
    pub height: Option<f64>,
    /// Stable string form of the gender, when established.
    pub gender: Option<String>,
    /// Ring or tag identification.
    pub identification: Option<String>,
    /// Size classification.
    pub size: Option<String>,
    /// Specialty line.
    pub specialty: Option<String>,
    /// Whether the record passed registry verification.
    pub verified: bool,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Last update time, unix milliseconds.
    pub updated_at: u64,
    /// Dirty flag: local changes not yet pushed to the remote.
    pub needs_sync: bool,
}

impl Row for FlockRow {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_key(&self) -> &str {
        &self.flock_type
    }

    fn needs_sync(&self) -> bool {
        self.needs_sync
    }

    fn set_needs_sync(&mut self, needs_sync: bool) {
        self.needs_sync = needs_sync;
    }
}

/// A locally cached mortality record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortalityRow {
    /// Primary key.
    pub id: String,
    /// Flock the loss occurred in.
    pub flock_id: String,
    /// Stable string form of the cause.
    pub cause: String,
    /// Number of birds lost.
    pub count: u32,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the loss was recorded, unix milliseconds.
    pub recorded_at: u64,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Last update time, unix milliseconds.
    pub updated_at: u64,
    /// Dirty flag: local changes not yet pushed to the remote.
    pub needs_sync: bool,
}

impl Row for MortalityRow {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_key(&self) -> &str {
        &self.flock_id
    }

    fn needs_sync(&self) -> bool {
        self.needs_sync
    }

    fn set_needs_sync(&mut self, needs_sync: bool) {
        self.needs_sync = needs_sync;
    }
}

/// A locally cached sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorRow {
    /// Primary key.
    pub id: String,
    /// Reporting device id.
    pub device_id: String,
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity, percent.
    pub humidity_pct: f64,
    /// Remaining battery, percent, when reported.
    pub battery_pct: Option<f64>,
    /// Capture time, unix milliseconds.
    pub recorded_at: u64,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Last update time, unix milliseconds.
    pub updated_at: u64,
    /// Dirty flag: local changes not yet pushed to the remote.
    pub needs_sync: bool,
}

impl Row for SensorRow {
    fn id(&self) -> &str {
        &self.id
    }

    fn list_key(&self) -> &str {
        &self.device_id
    }

    fn needs_sync(&self) -> bool {
        self.needs_sync
    }

    fn set_needs_sync(&mut self, needs_sync: bool) {
        self.needs_sync = needs_sync;
    }
}
