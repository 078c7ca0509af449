//! The remote source contract, the untyped records it speaks, and a
//! scripted mock implementation.

use async_trait::async_trait;
use flocksync_core::TransportError;
use futures::stream::{BoxStream, StreamExt};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Remote collections, one per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Flock documents.
    Flocks,
    /// Mortality record documents.
    MortalityRecords,
    /// Sensor reading documents.
    SensorReadings,
}

impl Collection {
    /// Collection name on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Flocks => "flocks",
            Collection::MortalityRecords => "mortality_records",
            Collection::SensorReadings => "sensor_readings",
        }
    }

    /// Field that list reads filter on.
    pub fn key_field(&self) -> &'static str {
        match self {
            Collection::Flocks => "flock_type",
            Collection::MortalityRecords => "flock_id",
            Collection::SensorReadings => "device_id",
        }
    }
}

/// One value inside a remote record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// UTF-8 text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// List of strings (proof references and the like).
    StrList(Vec<String>),
}

impl FieldValue {
    /// Borrows the text payload, if this is `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is `Int`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float payload; integers widen losslessly enough for
    /// the fields this layer maps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrows the string list payload, if this is `StrList`.
    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::StrList(items) => Some(items),
            _ => None,
        }
    }
}

/// An untyped key-value document as delivered by the remote source.
///
/// Transient: mapped to and from domain entities by the repository, never
/// persisted as-is.
pub type RemoteRecord = BTreeMap<String, FieldValue>;

/// A cancellable stream of real-time record updates.
pub type RecordStream = BoxStream<'static, Result<RemoteRecord, TransportError>>;

/// Eventually-consistent, possibly-unreachable real-time backing service.
///
/// All failures are raw [`TransportError`]s; classification into the
/// user-facing taxonomy happens in the repository layer.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches one record by id. `Ok(None)` means the remote definitely
    /// has no such document.
    async fn fetch(&self, collection: Collection, id: &str)
        -> Result<Option<RemoteRecord>, TransportError>;

    /// Fetches all records whose key field matches `key`.
    async fn fetch_matching(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Vec<RemoteRecord>, TransportError>;

    /// Creates or replaces a record. The record must carry an `"id"` field.
    async fn save(&self, collection: Collection, record: RemoteRecord)
        -> Result<(), TransportError>;

    /// Deletes a record by id. Deleting a missing record succeeds.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), TransportError>;

    /// Subscribes to real-time updates for one record. The stream ends
    /// when the subscription is torn down server-side; the consumer
    /// cancels by dropping it.
    fn watch(&self, collection: Collection, id: &str) -> RecordStream;
}

type WatchKey = (Collection, String);
type WatchSender = broadcast::Sender<Result<RemoteRecord, TransportError>>;

/// A scripted remote source for tests.
///
/// Holds records in memory, can be made unreachable, can fail a fixed
/// number of upcoming calls, and lets tests push watch updates.
pub struct MockRemoteSource {
    reachable: AtomicBool,
    records: RwLock<BTreeMap<WatchKey, RemoteRecord>>,
    fail_next: RwLock<Option<(u32, TransportError)>>,
    watchers: RwLock<BTreeMap<WatchKey, WatchSender>>,
    saved: RwLock<Vec<(Collection, RemoteRecord)>>,
}

impl MockRemoteSource {
    /// Creates a reachable, empty mock.
    pub fn new() -> Self {
        Self {
            reachable: AtomicBool::new(true),
            records: RwLock::new(BTreeMap::new()),
            fail_next: RwLock::new(None),
            watchers: RwLock::new(BTreeMap::new()),
            saved: RwLock::new(Vec::new()),
        }
    }

    /// Toggles reachability. While unreachable every call fails with
    /// `ConnectionFailed`.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Fails the next `count` calls with the given error, then recovers.
    pub fn fail_next(&self, count: u32, error: TransportError) {
        *self.fail_next.write() = Some((count, error));
    }

    /// Seeds a record directly, bypassing the failure scripting.
    pub fn seed(&self, collection: Collection, record: RemoteRecord) {
        let id = record
            .get("id")
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string();
        self.records.write().insert((collection, id), record);
    }

    /// Records successfully saved through [`RemoteSource::save`].
    pub fn saved(&self) -> Vec<(Collection, RemoteRecord)> {
        self.saved.read().clone()
    }

    /// Pushes a real-time update to any active watchers of the record and
    /// updates the stored copy.
    pub fn push_update(&self, collection: Collection, record: RemoteRecord) {
        let id = record
            .get("id")
            .and_then(FieldValue::as_str)
            .unwrap_or_default()
            .to_string();
        self.records
            .write()
            .insert((collection, id.clone()), record.clone());
        if let Some(tx) = self.watchers.read().get(&(collection, id)) {
            let _ = tx.send(Ok(record));
        }
    }

    /// Pushes a transport failure to any active watchers of the record.
    pub fn push_watch_error(&self, collection: Collection, id: &str, error: TransportError) {
        if let Some(tx) = self.watchers.read().get(&(collection, id.to_string())) {
            let _ = tx.send(Err(error));
        }
    }

    fn gate(&self) -> Result<(), TransportError> {
        if !self.reachable.load(Ordering::SeqCst) {
            return Err(TransportError::ConnectionFailed("remote unreachable".into()));
        }
        let mut scripted = self.fail_next.write();
        if let Some((remaining, error)) = scripted.as_mut() {
            if *remaining > 0 {
                *remaining -= 1;
                let err = error.clone();
                if *remaining == 0 {
                    *scripted = None;
                }
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Default for MockRemoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteSource for MockRemoteSource {
    async fn fetch(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<RemoteRecord>, TransportError> {
        self.gate()?;
        Ok(self.records.read().get(&(collection, id.to_string())).cloned())
    }

    async fn fetch_matching(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<Vec<RemoteRecord>, TransportError> {
        self.gate()?;
        let field = collection.key_field();
        Ok(self
            .records
            .read()
            .iter()
            .filter(|((c, _), record)| {
                *c == collection
                    && record.get(field).and_then(FieldValue::as_str) == Some(key)
            })
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn save(
        &self,
        collection: Collection,
        record: RemoteRecord,
    ) -> Result<(), TransportError> {
        self.gate()?;
        let id = record
            .get("id")
            .and_then(FieldValue::as_str)
            .ok_or_else(|| TransportError::Other("record missing id field".into()))?
            .to_string();
        self.records
            .write()
            .insert((collection, id), record.clone());
        self.saved.write().push((collection, record));
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), TransportError> {
        self.gate()?;
        self.records.write().remove(&(collection, id.to_string()));
        Ok(())
    }

    fn watch(&self, collection: Collection, id: &str) -> RecordStream {
        let rx = {
            let mut watchers = self.watchers.write();
            watchers
                .entry((collection, id.to_string()))
                .or_insert_with(|| broadcast::channel(32).0)
                .subscribe()
        };
        // Lagged subscribers just skip the overwritten updates.
        BroadcastStream::new(rx)
            .filter_map(|item| async move { item.ok() })
            .boxed()
    }
}
