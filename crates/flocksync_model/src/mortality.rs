//! Mortality records.

use serde::{Deserialize, Serialize};

/// Recorded cause of death for a mortality event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MortalityCause {
    /// Illness or infection.
    Disease,
    /// Predator attack.
    Predator,
    /// Physical injury.
    Injury,
    /// Heat stress or other environmental cause.
    Environment,
    /// Cause could not be determined.
    Unknown,
}

impl MortalityCause {
    /// Stable string form used by rows and remote maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            MortalityCause::Disease => "disease",
            MortalityCause::Predator => "predator",
            MortalityCause::Injury => "injury",
            MortalityCause::Environment => "environment",
            MortalityCause::Unknown => "unknown",
        }
    }

    /// Parses the stable string form. Unrecognized causes map to `Unknown`
    /// so older clients can read records written by newer ones.
    pub fn parse(s: &str) -> Self {
        match s {
            "disease" => MortalityCause::Disease,
            "predator" => MortalityCause::Predator,
            "injury" => MortalityCause::Injury,
            "environment" => MortalityCause::Environment,
            _ => MortalityCause::Unknown,
        }
    }
}

/// A single mortality event within a flock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortalityRecord {
    /// Client-generated id (UUID v4 string).
    pub id: String,
    /// Flock the loss occurred in.
    pub flock_id: String,
    /// Recorded cause.
    pub cause: MortalityCause,
    /// Number of birds lost.
    pub count: u32,
    /// Free-form notes.
    pub notes: Option<String>,
    /// When the loss was recorded, unix milliseconds.
    pub recorded_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cause_round_trip() {
        for c in [
            MortalityCause::Disease,
            MortalityCause::Predator,
            MortalityCause::Injury,
            MortalityCause::Environment,
            MortalityCause::Unknown,
        ] {
            assert_eq!(MortalityCause::parse(c.as_str()), c);
        }
    }

    #[test]
    fn unrecognized_cause_degrades_to_unknown() {
        assert_eq!(MortalityCause::parse("meteorite"), MortalityCause::Unknown);
    }
}
