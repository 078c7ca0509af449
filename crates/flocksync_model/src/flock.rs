//! The flock entity and its supporting enums.

use serde::{Deserialize, Serialize};

/// Kind of bird group a flock record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlockType {
    /// Mixed or unspecified fowl.
    Fowl,
    /// Laying hens.
    Hen,
    /// Roosters.
    Rooster,
    /// Chicks not yet classified.
    Chick,
}

impl FlockType {
    /// Stable string form used by rows and remote maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlockType::Fowl => "fowl",
            FlockType::Hen => "hen",
            FlockType::Rooster => "rooster",
            FlockType::Chick => "chick",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fowl" => Some(FlockType::Fowl),
            "hen" => Some(FlockType::Hen),
            "rooster" => Some(FlockType::Rooster),
            "chick" => Some(FlockType::Chick),
            _ => None,
        }
    }
}

/// Registry class of a flock: traceable flocks carry lineage and provenance,
/// non-traceable flocks are registered on physical attributes alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegistryType {
    /// Full provenance is known and required.
    Traceable,
    /// Provenance unknown; physical attributes are required instead.
    NonTraceable,
}

impl RegistryType {
    /// Stable string form used by rows and remote maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryType::Traceable => "traceable",
            RegistryType::NonTraceable => "non_traceable",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "traceable" => Some(RegistryType::Traceable),
            "non_traceable" => Some(RegistryType::NonTraceable),
            _ => None,
        }
    }
}

/// Age bracket used by the registry requirement tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    /// Newly hatched chicks.
    Chick,
    /// Zero to five weeks.
    WeeksZeroToFive,
    /// Five weeks to five months.
    WeeksFiveToMonthsFive,
    /// Five months to twelve months and beyond.
    MonthsFiveToTwelvePlus,
}

impl AgeGroup {
    /// Stable string form used by rows and remote maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Chick => "chick",
            AgeGroup::WeeksZeroToFive => "weeks_0_5",
            AgeGroup::WeeksFiveToMonthsFive => "weeks_5_months_5",
            AgeGroup::MonthsFiveToTwelvePlus => "months_5_12_plus",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chick" => Some(AgeGroup::Chick),
            "weeks_0_5" => Some(AgeGroup::WeeksZeroToFive),
            "weeks_5_months_5" => Some(AgeGroup::WeeksFiveToMonthsFive),
            "months_5_12_plus" => Some(AgeGroup::MonthsFiveToTwelvePlus),
            _ => None,
        }
    }
}

/// Bird gender, when established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Gender {
    /// Stable string form used by rows and remote maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Parses the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            _ => None,
        }
    }
}

/// A registered flock.
///
/// Timestamps are unix milliseconds. Optional fields mirror the registry
/// requirement tables: what must be present depends on the registry type
/// and age group (see [`crate::registry`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flock {
    /// Client-generated id (UUID v4 string).
    pub id: String,
    /// Owning farmer's id.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Kind of bird group.
    pub flock_type: FlockType,
    /// Registry class.
    pub registry_type: RegistryType,
    /// Age bracket.
    pub age_group: AgeGroup,
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
    /// Provenance proof references (photo or document urls).
    pub proofs: Option<Vec<String>>,
    /// Plumage colors.
    pub color: Option<String>,
    /// Vaccination record reference.
    pub vaccination: Option<String>,
    /// Average weight in kilograms.
    pub weight: Option<f64>,
    /// Average height in centimeters.
    pub height: Option<f64>,
    /// Gender, when established.
    pub gender: Option<Gender>,
    /// Ring or tag identification.
    pub identification: Option<String>,
    /// Size classification (for example "medium").
    pub size: Option<String>,
    /// Specialty such as a fighting or show line.
    pub specialty: Option<String>,
    /// Whether the record passed registry verification.
    pub verified: bool,
    /// Creation time, unix milliseconds.
    pub created_at: u64,
    /// Last update time, unix milliseconds.
    pub updated_at: u64,
}
