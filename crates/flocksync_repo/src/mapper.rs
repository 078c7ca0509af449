//! Mapping between domain entities, local rows and remote records.
//!
//! The repository owns all three-way mapping. For every required field the
//! row and remote mappings are inverses; optional fields are omitted from
//! remote records when absent and survive unchanged when present.

use flocksync_core::{DataError, DataResult};
use flocksync_model::{
    AgeGroup, Flock, FlockType, Gender, MortalityCause, MortalityRecord, RegistryType,
    SensorReading,
};
use flocksync_store::{Collection, FieldValue, FlockRow, MortalityRow, RemoteRecord, Row, SensorRow};

/// An entity type the repository can sync.
///
/// Bundles the row type, the remote collection and the mapping functions,
/// so the repository's read/write paths can be written once and
/// instantiated per entity.
pub trait SyncEntity: Sized + Send + Sync + Clone + 'static {
    /// Local row representation.
    type Row: Row;

    /// Remote collection holding this entity.
    const COLLECTION: Collection;

    /// Primary key.
    fn id(&self) -> &str;

    /// Flattens the entity into a local row.
    fn to_row(&self, needs_sync: bool) -> Self::Row;

    /// Rebuilds the entity from a local row.
    fn from_row(row: &Self::Row) -> DataResult<Self>;

    /// Serializes the entity into an untyped remote record. Absent
    /// optional fields are omitted.
    fn to_remote(&self) -> RemoteRecord;

    /// Rebuilds the entity from an untyped remote record.
    fn from_remote(record: &RemoteRecord) -> DataResult<Self>;
}

fn missing(key: &str) -> DataError {
    DataError::unknown(format!("remote record missing field `{key}`"))
}

fn corrupt_row(what: &str, value: &str) -> DataError {
    DataError::storage(format!("corrupt row: bad {what} `{value}`"))
}

fn req_str(record: &RemoteRecord, key: &str) -> DataResult<String> {
    record
        .get(key)
        .and_then(FieldValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing(key))
}

fn opt_str(record: &RemoteRecord, key: &str) -> Option<String> {
    record.get(key).and_then(FieldValue::as_str).map(str::to_string)
}

fn req_u64(record: &RemoteRecord, key: &str) -> DataResult<u64> {
    record
        .get(key)
        .and_then(FieldValue::as_i64)
        .and_then(|n| u64::try_from(n).ok())
        .ok_or_else(|| missing(key))
}

fn opt_u64(record: &RemoteRecord, key: &str) -> Option<u64> {
    record
        .get(key)
        .and_then(FieldValue::as_i64)
        .and_then(|n| u64::try_from(n).ok())
}

fn opt_f64(record: &RemoteRecord, key: &str) -> Option<f64> {
    record.get(key).and_then(FieldValue::as_f64)
}

fn req_f64(record: &RemoteRecord, key: &str) -> DataResult<f64> {
    opt_f64(record, key).ok_or_else(|| missing(key))
}

fn req_bool(record: &RemoteRecord, key: &str) -> DataResult<bool> {
    record.get(key).and_then(FieldValue::as_bool).ok_or_else(|| missing(key))
}

fn put_opt_str(record: &mut RemoteRecord, key: &str, value: &Option<String>) {
    if let Some(value) = value {
        record.insert(key.into(), FieldValue::Str(value.clone()));
    }
}

fn put_opt_f64(record: &mut RemoteRecord, key: &str, value: Option<f64>) {
    if let Some(value) = value {
        record.insert(key.into(), FieldValue::Float(value));
    }
}

// Timestamps saturate at i64::MAX instead of wrapping negative.
fn int_field(value: u64) -> FieldValue {
    FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
}

impl SyncEntity for Flock {
    type Row = FlockRow;

    const COLLECTION: Collection = Collection::Flocks;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, needs_sync: bool) -> FlockRow {
        FlockRow {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            name: self.name.clone(),
            flock_type: self.flock_type.as_str().into(),
            registry_type: self.registry_type.as_str().into(),
            age_group: self.age_group.as_str().into(),
            breed: self.breed.clone(),
            father_id: self.father_id.clone(),
            mother_id: self.mother_id.clone(),
            place_of_birth: self.place_of_birth.clone(),
            date_of_birth: self.date_of_birth,
            proofs: self.proofs.clone(),
            color: self.color.clone(),
            vaccination: self.vaccination.clone(),
            weight: self.weight,
            height: self.height,
            gender: self.gender.map(|g| g.as_str().into()),
            identification: self.identification.clone(),
            size: self.size.clone(),
            specialty: self.specialty.clone(),
            verified: self.verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
            needs_sync,
        }
    }

    fn from_row(row: &FlockRow) -> DataResult<Self> {
        let gender = match &row.gender {
            Some(g) => Some(Gender::parse(g).ok_or_else(|| corrupt_row("gender", g))?),
            None => None,
        };
        Ok(Flock {
            id: row.id.clone(),
            owner_id: row.owner_id.clone(),
            name: row.name.clone(),
            flock_type: FlockType::parse(&row.flock_type)
                .ok_or_else(|| corrupt_row("flock type", &row.flock_type))?,
            registry_type: RegistryType::parse(&row.registry_type)
                .ok_or_else(|| corrupt_row("registry type", &row.registry_type))?,
            age_group: AgeGroup::parse(&row.age_group)
                .ok_or_else(|| corrupt_row("age group", &row.age_group))?,
            breed: row.breed.clone(),
            father_id: row.father_id.clone(),
            mother_id: row.mother_id.clone(),
            place_of_birth: row.place_of_birth.clone(),
            date_of_birth: row.date_of_birth,
            proofs: row.proofs.clone(),
            color: row.color.clone(),
            vaccination: row.vaccination.clone(),
            weight: row.weight,
            height: row.height,
            gender,
            identification: row.identification.clone(),
            size: row.size.clone(),
            specialty: row.specialty.clone(),
            verified: row.verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }

    fn to_remote(&self) -> RemoteRecord {
        let mut record = RemoteRecord::new();
        record.insert("id".into(), FieldValue::Str(self.id.clone()));
        record.insert("owner_id".into(), FieldValue::Str(self.owner_id.clone()));
        record.insert("name".into(), FieldValue::Str(self.name.clone()));
        record.insert("flock_type".into(), FieldValue::Str(self.flock_type.as_str().into()));
        record.insert(
            "registry_type".into(),
            FieldValue::Str(self.registry_type.as_str().into()),
        );
        record.insert("age_group".into(), FieldValue::Str(self.age_group.as_str().into()));
        put_opt_str(&mut record, "breed", &self.breed);
        put_opt_str(&mut record, "father_id", &self.father_id);
        put_opt_str(&mut record, "mother_id", &self.mother_id);
        put_opt_str(&mut record, "place_of_birth", &self.place_of_birth);
        if let Some(dob) = self.date_of_birth {
            record.insert("date_of_birth".into(), int_field(dob));
        }
        if let Some(proofs) = &self.proofs {
            record.insert("proofs".into(), FieldValue::StrList(proofs.clone()));
        }
        put_opt_str(&mut record, "color", &self.color);
        put_opt_str(&mut record, "vaccination", &self.vaccination);
        put_opt_f64(&mut record, "weight", self.weight);
        put_opt_f64(&mut record, "height", self.height);
        if let Some(gender) = self.gender {
            record.insert("gender".into(), FieldValue::Str(gender.as_str().into()));
        }
        put_opt_str(&mut record, "identification", &self.identification);
        put_opt_str(&mut record, "size", &self.size);
        put_opt_str(&mut record, "specialty", &self.specialty);
        record.insert("verified".into(), FieldValue::Bool(self.verified));
        record.insert("created_at".into(), int_field(self.created_at));
        record.insert("updated_at".into(), int_field(self.updated_at));
        record
    }

    fn from_remote(record: &RemoteRecord) -> DataResult<Self> {
        let flock_type = req_str(record, "flock_type")?;
        let registry_type = req_str(record, "registry_type")?;
        let age_group = req_str(record, "age_group")?;
        let gender = match opt_str(record, "gender") {
            Some(g) => Some(
                Gender::parse(&g).ok_or_else(|| DataError::unknown(format!("bad gender `{g}`")))?,
            ),
            None => None,
        };
        Ok(Flock {
            id: req_str(record, "id")?,
            owner_id: req_str(record, "owner_id")?,
            name: req_str(record, "name")?,
            flock_type: FlockType::parse(&flock_type)
                .ok_or_else(|| DataError::unknown(format!("bad flock type `{flock_type}`")))?,
            registry_type: RegistryType::parse(&registry_type)
                .ok_or_else(|| DataError::unknown(format!("bad registry type `{registry_type}`")))?,
            age_group: AgeGroup::parse(&age_group)
                .ok_or_else(|| DataError::unknown(format!("bad age group `{age_group}`")))?,
            breed: opt_str(record, "breed"),
            father_id: opt_str(record, "father_id"),
            mother_id: opt_str(record, "mother_id"),
            place_of_birth: opt_str(record, "place_of_birth"),
            date_of_birth: opt_u64(record, "date_of_birth"),
            proofs: record
                .get("proofs")
                .and_then(FieldValue::as_str_list)
                .map(<[String]>::to_vec),
            color: opt_str(record, "color"),
            vaccination: opt_str(record, "vaccination"),
            weight: opt_f64(record, "weight"),
            height: opt_f64(record, "height"),
            gender,
            identification: opt_str(record, "identification"),
            size: opt_str(record, "size"),
            specialty: opt_str(record, "specialty"),
            verified: req_bool(record, "verified")?,
            created_at: req_u64(record, "created_at")?,
            updated_at: req_u64(record, "updated_at")?,
        })
    }
}

impl SyncEntity for MortalityRecord {
    type Row = MortalityRow;

    const COLLECTION: Collection = Collection::MortalityRecords;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, needs_sync: bool) -> MortalityRow {
        MortalityRow {
            id: self.id.clone(),
            flock_id: self.flock_id.clone(),
            cause: self.cause.as_str().into(),
            count: self.count,
            notes: self.notes.clone(),
            recorded_at: self.recorded_at,
            created_at: self.recorded_at,
            updated_at: self.recorded_at,
            needs_sync,
        }
    }

    fn from_row(row: &MortalityRow) -> DataResult<Self> {
        Ok(MortalityRecord {
            id: row.id.clone(),
            flock_id: row.flock_id.clone(),
            cause: MortalityCause::parse(&row.cause),
            count: row.count,
            notes: row.notes.clone(),
            recorded_at: row.recorded_at,
        })
    }

    fn to_remote(&self) -> RemoteRecord {
        let mut record = RemoteRecord::new();
        record.insert("id".into(), FieldValue::Str(self.id.clone()));
        record.insert("flock_id".into(), FieldValue::Str(self.flock_id.clone()));
        record.insert("cause".into(), FieldValue::Str(self.cause.as_str().into()));
        record.insert("count".into(), FieldValue::Int(i64::from(self.count)));
        put_opt_str(&mut record, "notes", &self.notes);
        record.insert("recorded_at".into(), int_field(self.recorded_at));
        record
    }

    fn from_remote(record: &RemoteRecord) -> DataResult<Self> {
        let count = record
            .get("count")
            .and_then(FieldValue::as_i64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| missing("count"))?;
        Ok(MortalityRecord {
            id: req_str(record, "id")?,
            flock_id: req_str(record, "flock_id")?,
            cause: MortalityCause::parse(&req_str(record, "cause")?),
            count,
            notes: opt_str(record, "notes"),
            recorded_at: req_u64(record, "recorded_at")?,
        })
    }
}

impl SyncEntity for SensorReading {
    type Row = SensorRow;

    const COLLECTION: Collection = Collection::SensorReadings;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_row(&self, needs_sync: bool) -> SensorRow {
        SensorRow {
            id: self.id.clone(),
            device_id: self.device_id.clone(),
            temperature_c: self.temperature_c,
            humidity_pct: self.humidity_pct,
            battery_pct: self.battery_pct,
            recorded_at: self.recorded_at,
            created_at: self.recorded_at,
            updated_at: self.recorded_at,
            needs_sync,
        }
    }

    fn from_row(row: &SensorRow) -> DataResult<Self> {
        Ok(SensorReading {
            id: row.id.clone(),
            device_id: row.device_id.clone(),
            temperature_c: row.temperature_c,
            humidity_pct: row.humidity_pct,
            battery_pct: row.battery_pct,
            recorded_at: row.recorded_at,
        })
    }

    fn to_remote(&self) -> RemoteRecord {
        let mut record = RemoteRecord::new();
        record.insert("id".into(), FieldValue::Str(self.id.clone()));
        record.insert("device_id".into(), FieldValue::Str(self.device_id.clone()));
        record.insert("temperature_c".into(), FieldValue::Float(self.temperature_c));
        record.insert("humidity_pct".into(), FieldValue::Float(self.humidity_pct));
        put_opt_f64(&mut record, "battery_pct", self.battery_pct);
        record.insert("recorded_at".into(), int_field(self.recorded_at));
        record
    }

    fn from_remote(record: &RemoteRecord) -> DataResult<Self> {
        Ok(SensorReading {
            id: req_str(record, "id")?,
            device_id: req_str(record, "device_id")?,
            temperature_c: req_f64(record, "temperature_c")?,
            humidity_pct: req_f64(record, "humidity_pct")?,
            battery_pct: opt_f64(record, "battery_pct"),
            recorded_at: req_u64(record, "recorded_at")?,
        })
    }
}
