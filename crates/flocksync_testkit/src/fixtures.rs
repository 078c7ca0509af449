//! Deterministic sample entities for scenario tests.

use flocksync_model::{
    AgeGroup, Flock, FlockRegistration, FlockType, Gender, MortalityCause, MortalityRecord,
    RegistryType, SensorReading,
};
use flocksync_store::{FieldValue, RemoteRecord};

/// Fixed timestamp all fixtures use, unix milliseconds.
pub const FIXED_NOW_MS: u64 = 1_700_000_000_000;

/// A fully populated traceable hen flock.
pub fn sample_flock(id: &str) -> Flock {
    Flock {
        id: id.to_string(),
        owner_id: "farmer-1".into(),
        name: format!("Flock {id}"),
        flock_type: FlockType::Hen,
        registry_type: RegistryType::Traceable,
        age_group: AgeGroup::WeeksZeroToFive,
        breed: Some("Aseel".into()),
        father_id: Some("sire-1".into()),
        mother_id: Some("dam-1".into()),
        place_of_birth: Some("Kadapa hatchery".into()),
        date_of_birth: Some(FIXED_NOW_MS - 1_000_000),
        proofs: Some(vec!["proof://hatch-cert".into()]),
        color: Some("black-red".into()),
        vaccination: Some("schedule-a".into()),
        weight: Some(0.45),
        height: Some(18.0),
        gender: Some(Gender::Female),
        identification: Some("RING-42".into()),
        size: None,
        specialty: None,
        verified: true,
        created_at: FIXED_NOW_MS,
        updated_at: FIXED_NOW_MS,
    }
}

/// A registration that satisfies the non-traceable requirements table.
pub fn sample_registration() -> FlockRegistration {
    FlockRegistration {
        owner_id: "farmer-1".into(),
        name: "Yard hens".into(),
        flock_type: FlockType::Hen,
        registry_type: RegistryType::NonTraceable,
        age_group: AgeGroup::MonthsFiveToTwelvePlus,
        breed: Some("Kadaknath".into()),
        father_id: None,
        mother_id: None,
        place_of_birth: None,
        date_of_birth: None,
        proofs: None,
        color: Some("brown".into()),
        vaccination: Some("schedule-a".into()),
        weight: Some(1.9),
        height: Some(30.0),
        gender: Some(Gender::Female),
        identification: Some("RING-7".into()),
        size: Some("medium".into()),
        specialty: Some("layers".into()),
        verified: true,
    }
}

/// A registration that satisfies the traceable-chick requirements table.
pub fn traceable_registration() -> FlockRegistration {
    FlockRegistration {
        owner_id: "farmer-1".into(),
        name: "Hatch batch 3".into(),
        flock_type: FlockType::Chick,
        registry_type: RegistryType::Traceable,
        age_group: AgeGroup::Chick,
        breed: Some("Aseel".into()),
        father_id: Some("sire-1".into()),
        mother_id: None,
        place_of_birth: Some("Kadapa hatchery".into()),
        date_of_birth: Some(FIXED_NOW_MS - 100_000),
        proofs: Some(vec!["proof://hatch-cert".into()]),
        color: Some("yellow".into()),
        vaccination: Some("schedule-a".into()),
        weight: None,
        height: None,
        gender: None,
        identification: None,
        size: None,
        specialty: None,
        verified: true,
    }
}

/// A mortality record attached to the given flock.
pub fn mortality_record(id: &str, flock_id: &str) -> MortalityRecord {
    MortalityRecord {
        id: id.to_string(),
        flock_id: flock_id.to_string(),
        cause: MortalityCause::Disease,
        count: 2,
        notes: Some("isolated coop 3".into()),
        recorded_at: FIXED_NOW_MS,
    }
}

/// A sensor reading from the given device.
pub fn sensor_reading(id: &str, device_id: &str) -> SensorReading {
    SensorReading {
        id: id.to_string(),
        device_id: device_id.to_string(),
        temperature_c: 32.5,
        humidity_pct: 61.0,
        battery_pct: Some(87.0),
        recorded_at: FIXED_NOW_MS,
    }
}

/// A minimal remote flock document carrying only the required fields.
pub fn remote_flock_record(id: &str, flock_type: FlockType) -> RemoteRecord {
    let mut record = RemoteRecord::new();
    record.insert("id".into(), FieldValue::Str(id.into()));
    record.insert("owner_id".into(), FieldValue::Str("farmer-1".into()));
    record.insert("name".into(), FieldValue::Str(format!("Flock {id}")));
    record.insert("flock_type".into(), FieldValue::Str(flock_type.as_str().into()));
    record.insert("registry_type".into(), FieldValue::Str("non_traceable".into()));
    record.insert("age_group".into(), FieldValue::Str("months_5_12_plus".into()));
    record.insert("verified".into(), FieldValue::Bool(true));
    record.insert("created_at".into(), FieldValue::Int(FIXED_NOW_MS as i64));
    record.insert("updated_at".into(), FieldValue::Int(FIXED_NOW_MS as i64));
    record
}
