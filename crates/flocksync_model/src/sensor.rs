//! Coop sensor readings.

use serde::{Deserialize, Serialize};

/// One environmental reading from a coop sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Client-generated id (UUID v4 string).
    pub id: String,
    /// Reporting device id.
    pub device_id: String,
    /// Air temperature in degrees Celsius.
    pub temperature_c: f64,
    /// Relative humidity, percent.
    pub humidity_pct: f64,
    /// Remaining battery, percent, when the device reports it.
    pub battery_pct: Option<f64>,
    /// Capture time, unix milliseconds.
    pub recorded_at: u64,
}
