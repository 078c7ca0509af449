//! Proptest strategies over the domain model.
//!
//! `arb_flock` exercises every optional attribute independently so mapping
//! round-trip properties cover sparse and dense entities alike.

use flocksync_model::{
    AgeGroup, Flock, FlockType, Gender, MortalityCause, MortalityRecord, RegistryType,
    SensorReading,
};
use proptest::collection::vec;
use proptest::option;
use proptest::prelude::*;

/// Any flock type.
pub fn arb_flock_type() -> impl Strategy<Value = FlockType> {
    prop_oneof![
        Just(FlockType::Fowl),
        Just(FlockType::Hen),
        Just(FlockType::Rooster),
        Just(FlockType::Chick),
    ]
}

/// Any registry type.
pub fn arb_registry_type() -> impl Strategy<Value = RegistryType> {
    prop_oneof![Just(RegistryType::Traceable), Just(RegistryType::NonTraceable)]
}

/// Any age bracket.
pub fn arb_age_group() -> impl Strategy<Value = AgeGroup> {
    prop_oneof![
        Just(AgeGroup::Chick),
        Just(AgeGroup::WeeksZeroToFive),
        Just(AgeGroup::WeeksFiveToMonthsFive),
        Just(AgeGroup::MonthsFiveToTwelvePlus),
    ]
}

/// Any gender.
pub fn arb_gender() -> impl Strategy<Value = Gender> {
    prop_oneof![Just(Gender::Male), Just(Gender::Female)]
}

/// Any mortality cause.
pub fn arb_mortality_cause() -> impl Strategy<Value = MortalityCause> {
    prop_oneof![
        Just(MortalityCause::Disease),
        Just(MortalityCause::Predator),
        Just(MortalityCause::Injury),
        Just(MortalityCause::Environment),
        Just(MortalityCause::Unknown),
    ]
}

type Lineage = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<u64>,
    Option<Vec<String>>,
    Option<String>,
);

prop_compose! {
    fn arb_lineage()(
        breed in option::of("[A-Za-z]{3,10}"),
        father_id in option::of("[a-f0-9]{8}"),
        mother_id in option::of("[a-f0-9]{8}"),
        place_of_birth in option::of("[A-Za-z][A-Za-z ]{2,15}"),
        date_of_birth in option::of(0u64..2_000_000_000_000u64),
        proofs in option::of(vec("proof://[a-z]{3,8}", 1..3)),
        color in option::of("[a-z]{3,10}"),
    ) -> Lineage {
        (breed, father_id, mother_id, place_of_birth, date_of_birth, proofs, color)
    }
}

type Physique = (
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<Gender>,
    Option<String>,
    Option<String>,
    Option<String>,
);

prop_compose! {
    fn arb_physique()(
        vaccination in option::of("[a-z-]{3,12}"),
        weight in option::of(0.05f64..8.0),
        height in option::of(5.0f64..90.0),
        gender in option::of(arb_gender()),
        identification in option::of("RING-[0-9]{1,4}"),
        size in option::of("[a-z]{4,8}"),
        specialty in option::of("[a-z]{4,10}"),
    ) -> Physique {
        (vaccination, weight, height, gender, identification, size, specialty)
    }
}

prop_compose! {
    /// A flock with independently present or absent optional attributes.
    pub fn arb_flock()(
        id in "[a-f0-9]{8}",
        owner_id in "farmer-[0-9]{1,3}",
        name in "[A-Za-z][A-Za-z ]{0,15}",
        flock_type in arb_flock_type(),
        registry_type in arb_registry_type(),
        age_group in arb_age_group(),
        verified in any::<bool>(),
        created_at in 0u64..2_000_000_000_000u64,
        lineage in arb_lineage(),
        physique in arb_physique(),
    ) -> Flock {
        let (breed, father_id, mother_id, place_of_birth, date_of_birth, proofs, color) = lineage;
        let (vaccination, weight, height, gender, identification, size, specialty) = physique;
        Flock {
            id,
            owner_id,
            name,
            flock_type,
            registry_type,
            age_group,
            breed,
            father_id,
            mother_id,
            place_of_birth,
            date_of_birth,
            proofs,
            color,
            vaccination,
            weight,
            height,
            gender,
            identification,
            size,
            specialty,
            verified,
            created_at,
            updated_at: created_at,
        }
    }
}

prop_compose! {
    /// Any mortality record.
    pub fn arb_mortality_record()(
        id in "[a-f0-9]{8}",
        flock_id in "[a-f0-9]{8}",
        cause in arb_mortality_cause(),
        count in 1u32..500,
        notes in option::of("[A-Za-z ]{1,30}"),
        recorded_at in 0u64..2_000_000_000_000u64,
    ) -> MortalityRecord {
        MortalityRecord { id, flock_id, cause, count, notes, recorded_at }
    }
}

prop_compose! {
    /// Any sensor reading.
    pub fn arb_sensor_reading()(
        id in "[a-f0-9]{8}",
        device_id in "coop-[0-9]{1,3}",
        temperature_c in -20.0f64..60.0,
        humidity_pct in 0.0f64..100.0,
        battery_pct in option::of(0.0f64..100.0),
        recorded_at in 0u64..2_000_000_000_000u64,
    ) -> SensorReading {
        SensorReading { id, device_id, temperature_c, humidity_pct, battery_pct, recorded_at }
    }
}
