//! Registry field-requirement tables and registration input.
//!
//! Which fields a flock registration must carry depends on its registry
//! type and age bracket. Traceable flocks need provenance (lineage, place
//! and date of birth, proofs); non-traceable flocks are registered on
//! physical attributes instead, with provenance optional.

use crate::flock::{AgeGroup, Flock, FlockType, Gender, RegistryType};
use serde::{Deserialize, Serialize};

/// A field of the registration form that the requirement tables refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Sire and dam references.
    FamilyTree,
    /// Hatchery or farm of origin.
    PlaceOfBirth,
    /// Hatch date.
    DateOfBirth,
    /// Provenance proof references.
    Proofs,
    /// Plumage colors.
    Colors,
    /// Vaccination record reference.
    Vaccination,
    /// Average weight.
    Weight,
    /// Average height.
    Height,
    /// Gender.
    Gender,
    /// Ring or tag identification.
    Identification,
    /// Size classification.
    Size,
    /// Specialty line.
    Specialty,
    /// Registry verification flag.
    Verification,
}

impl Field {
    /// Human-readable name, used in validation errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FamilyTree => "Family tree",
            Field::PlaceOfBirth => "Place of birth",
            Field::DateOfBirth => "Date of birth",
            Field::Proofs => "Proofs",
            Field::Colors => "Colors",
            Field::Vaccination => "Vaccination",
            Field::Weight => "Weight",
            Field::Height => "Height",
            Field::Gender => "Gender",
            Field::Identification => "Identification",
            Field::Size => "Size",
            Field::Specialty => "Specialty",
            Field::Verification => "Verification",
        }
    }
}

const TRACEABLE_CHICK: &[Field] = &[
    Field::FamilyTree,
    Field::PlaceOfBirth,
    Field::DateOfBirth,
    Field::Proofs,
    Field::Colors,
    Field::Vaccination,
    Field::Verification,
];

const TRACEABLE_YOUNG: &[Field] = &[
    Field::FamilyTree,
    Field::PlaceOfBirth,
    Field::DateOfBirth,
    Field::Proofs,
    Field::Colors,
    Field::Vaccination,
    Field::Weight,
    Field::Height,
    Field::Gender,
    Field::Identification,
    Field::Verification,
];

const TRACEABLE_GROWN: &[Field] = &[
    Field::FamilyTree,
    Field::PlaceOfBirth,
    Field::DateOfBirth,
    Field::Proofs,
    Field::Colors,
    Field::Vaccination,
    Field::Weight,
    Field::Height,
    Field::Gender,
    Field::Identification,
    Field::Size,
    Field::Specialty,
    Field::Verification,
];

const NON_TRACEABLE: &[Field] = &[
    Field::Colors,
    Field::Weight,
    Field::Height,
    Field::Gender,
    Field::Identification,
    Field::Size,
    Field::Specialty,
    Field::Verification,
];

const NON_TRACEABLE_OPTIONAL: &[Field] = &[
    Field::FamilyTree,
    Field::PlaceOfBirth,
    Field::DateOfBirth,
    Field::Vaccination,
    Field::Proofs,
];

/// Fields that must be present for the given registry type and age bracket.
pub fn required_fields(registry_type: RegistryType, age_group: AgeGroup) -> &'static [Field] {
    match registry_type {
        RegistryType::Traceable => match age_group {
            AgeGroup::Chick => TRACEABLE_CHICK,
            AgeGroup::WeeksZeroToFive => TRACEABLE_YOUNG,
            AgeGroup::WeeksFiveToMonthsFive | AgeGroup::MonthsFiveToTwelvePlus => TRACEABLE_GROWN,
        },
        RegistryType::NonTraceable => NON_TRACEABLE,
    }
}

/// Fields that may be present but are not required.
pub fn optional_fields(registry_type: RegistryType) -> &'static [Field] {
    match registry_type {
        RegistryType::Traceable => &[],
        RegistryType::NonTraceable => NON_TRACEABLE_OPTIONAL,
    }
}

/// Input for registering a new flock.
///
/// All attribute fields are optional at the type level; which ones must be
/// filled in is decided by [`required_fields`] for the chosen registry type
/// and age bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockRegistration {
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
    /// Gender, when established.
    pub gender: Option<Gender>,
    /// Ring or tag identification.
    pub identification: Option<String>,
    /// Size classification.
    pub size: Option<String>,
    /// Specialty line.
    pub specialty: Option<String>,
    /// Whether registry verification was completed.
    pub verified: bool,
}

impl FlockRegistration {
    /// Fields this registration actually carries.
    ///
    /// `FamilyTree` counts as provided when at least one parent reference is
    /// given; `Verification` when the verified flag is set; an empty proofs
    /// list does not count.
    pub fn provided_fields(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        if self.father_id.is_some() || self.mother_id.is_some() {
            fields.push(Field::FamilyTree);
        }
        if self.place_of_birth.is_some() {
            fields.push(Field::PlaceOfBirth);
        }
        if self.date_of_birth.is_some() {
            fields.push(Field::DateOfBirth);
        }
        if self.proofs.as_ref().is_some_and(|p| !p.is_empty()) {
            fields.push(Field::Proofs);
        }
        if self.color.is_some() {
            fields.push(Field::Colors);
        }
        if self.vaccination.is_some() {
            fields.push(Field::Vaccination);
        }
        if self.weight.is_some() {
            fields.push(Field::Weight);
        }
        if self.height.is_some() {
            fields.push(Field::Height);
        }
        if self.gender.is_some() {
            fields.push(Field::Gender);
        }
        if self.identification.is_some() {
            fields.push(Field::Identification);
        }
        if self.size.is_some() {
            fields.push(Field::Size);
        }
        if self.specialty.is_some() {
            fields.push(Field::Specialty);
        }
        if self.verified {
            fields.push(Field::Verification);
        }
        fields
    }

    /// Required fields that are absent from this registration.
    pub fn missing_required(&self) -> Vec<Field> {
        let provided = self.provided_fields();
        required_fields(self.registry_type, self.age_group)
            .iter()
            .copied()
            .filter(|field| !provided.contains(field))
            .collect()
    }

    /// Builds the flock entity this registration describes.
    ///
    /// The id and timestamps come from the caller so the repository stays in
    /// charge of id generation and clock access.
    pub fn into_flock(self, id: String, now: u64) -> Flock {
        Flock {
            id,
            owner_id: self.owner_id,
            name: self.name,
            flock_type: self.flock_type,
            registry_type: self.registry_type,
            age_group: self.age_group,
            breed: self.breed,
            father_id: self.father_id,
            mother_id: self.mother_id,
            place_of_birth: self.place_of_birth,
            date_of_birth: self.date_of_birth,
            proofs: self.proofs,
            color: self.color,
            vaccination: self.vaccination,
            weight: self.weight,
            height: self.height,
            gender: self.gender,
            identification: self.identification,
            size: self.size,
            specialty: self.specialty,
            verified: self.verified,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_traceable_registration() -> FlockRegistration {
        FlockRegistration {
            owner_id: "farmer-1".into(),
            name: "Backyard batch".into(),
            flock_type: FlockType::Hen,
            registry_type: RegistryType::NonTraceable,
            age_group: AgeGroup::MonthsFiveToTwelvePlus,
            breed: None,
            father_id: None,
            mother_id: None,
            place_of_birth: None,
            date_of_birth: None,
            proofs: None,
            color: Some("black".into()),
            vaccination: None,
            weight: Some(1.8),
            height: Some(38.0),
            gender: Some(Gender::Female),
            identification: Some("RING-88".into()),
            size: Some("medium".into()),
            specialty: Some("layer".into()),
            verified: true,
        }
    }

    #[test]
    fn traceable_table_grows_with_age() {
        let chick = required_fields(RegistryType::Traceable, AgeGroup::Chick);
        let young = required_fields(RegistryType::Traceable, AgeGroup::WeeksZeroToFive);
        let grown = required_fields(RegistryType::Traceable, AgeGroup::WeeksFiveToMonthsFive);

        assert_eq!(chick.len(), 7);
        assert_eq!(young.len(), 11);
        assert_eq!(grown.len(), 13);
        assert!(chick.iter().all(|f| young.contains(f)));
        assert!(young.iter().all(|f| grown.contains(f)));
        assert!(!chick.contains(&Field::Weight));
        assert!(young.contains(&Field::Identification));
        assert!(grown.contains(&Field::Specialty));
    }

    #[test]
    fn non_traceable_is_age_independent() {
        for age in [
            AgeGroup::Chick,
            AgeGroup::WeeksZeroToFive,
            AgeGroup::WeeksFiveToMonthsFive,
            AgeGroup::MonthsFiveToTwelvePlus,
        ] {
            assert_eq!(required_fields(RegistryType::NonTraceable, age), NON_TRACEABLE);
        }
        assert!(optional_fields(RegistryType::NonTraceable).contains(&Field::FamilyTree));
        assert!(optional_fields(RegistryType::Traceable).is_empty());
    }

    #[test]
    fn complete_registration_has_nothing_missing() {
        assert!(non_traceable_registration().missing_required().is_empty());
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut reg = non_traceable_registration();
        reg.color = None;
        reg.identification = None;
        let missing = reg.missing_required();
        assert_eq!(missing, vec![Field::Colors, Field::Identification]);
    }

    #[test]
    fn empty_proofs_do_not_count_as_provided() {
        let mut reg = non_traceable_registration();
        reg.registry_type = RegistryType::Traceable;
        reg.age_group = AgeGroup::Chick;
        reg.father_id = Some("F0".into());
        reg.place_of_birth = Some("hatchery".into());
        reg.date_of_birth = Some(1_700_000_000_000);
        reg.vaccination = Some("schedule-a".into());
        reg.proofs = Some(vec![]);
        assert_eq!(reg.missing_required(), vec![Field::Proofs]);
    }

    #[test]
    fn into_flock_keeps_attributes() {
        let reg = non_traceable_registration();
        let flock = reg.clone().into_flock("flock-1".into(), 42);
        assert_eq!(flock.id, "flock-1");
        assert_eq!(flock.owner_id, reg.owner_id);
        assert_eq!(flock.weight, reg.weight);
        assert_eq!(flock.created_at, 42);
        assert_eq!(flock.updated_at, 42);
    }
}
