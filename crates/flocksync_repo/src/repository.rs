//! The offline-first sync repository.
//!
//! Streamed reads run a local-then-remote driver task per subscriber:
//! cached emission, retried remote fetch, reconciliation, then (for id
//! reads) the remote watch subscription. One-shot writes commit locally
//! first and push through the retry policy. Dropping a stream receiver
//! cancels its driver task at the next suspension point.

use crate::config::RepoConfig;
use crate::events::{Change, EntityEvent, EventBus};
use crate::mapper::SyncEntity;
use flocksync_core::{classify, execute_with_backoff, DataError, DataResult, DataState, RetryConfig};
use flocksync_model::{Flock, FlockRegistration, FlockType, MortalityRecord, SensorReading};
use flocksync_store::{FlockRow, LocalStore, MortalityRow, RemoteRecord, RemoteSource, Row, SensorRow};
use futures::StreamExt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};
use uuid::Uuid;

/// Outcome of a [`SyncRepository::sync_pending`] sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSummary {
    /// Rows pushed and marked synced.
    pub pushed: usize,
    /// Rows that could not be pushed and stay dirty.
    pub failed: usize,
    /// One line per failed row: `collection/id: error`.
    pub errors: Vec<String>,
}

impl SyncSummary {
    /// True when nothing was left dirty.
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Offline-first repository over a local store bundle and a remote source.
///
/// The local store is the durable source of truth; the remote is
/// eventually consistent and possibly unreachable. All remote failures are
/// classified before they reach a caller.
pub struct SyncRepository<S, R> {
    local: Arc<S>,
    remote: Arc<R>,
    config: RepoConfig,
    events: EventBus,
}

impl<S, R> SyncRepository<S, R>
where
    S: LocalStore<FlockRow> + LocalStore<MortalityRow> + LocalStore<SensorRow> + 'static,
    R: RemoteSource + 'static,
{
    /// Creates a repository over the given store and remote source.
    pub fn new(local: Arc<S>, remote: Arc<R>, config: RepoConfig) -> Self {
        let events = EventBus::new(config.event_capacity);
        Self {
            local,
            remote,
            config,
            events,
        }
    }

    /// The change-event bus fed by committed local writes.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Streams one flock: cached value, retried remote fetch, then live
    /// watch updates until the receiver is dropped.
    pub fn flock_by_id(&self, id: &str) -> ReceiverStream<DataState<Option<Flock>>> {
        self.stream_by_id::<Flock>(id)
    }

    /// Streams the flocks of one type: cached list, then the reconciled
    /// remote list.
    pub fn flocks_by_type(&self, flock_type: FlockType) -> ReceiverStream<DataState<Vec<Flock>>> {
        self.stream_by_key::<Flock>(flock_type.as_str())
    }

    /// Streams the mortality records of one flock.
    pub fn mortality_by_flock(
        &self,
        flock_id: &str,
    ) -> ReceiverStream<DataState<Vec<MortalityRecord>>> {
        self.stream_by_key::<MortalityRecord>(flock_id)
    }

    /// Streams the sensor readings of one device.
    pub fn sensor_readings_by_device(
        &self,
        device_id: &str,
    ) -> ReceiverStream<DataState<Vec<SensorReading>>> {
        self.stream_by_key::<SensorReading>(device_id)
    }

    /// Validates and registers a new flock, returning its generated id.
    ///
    /// Missing required fields fail with `Validation` before anything is
    /// written. The local insert happens first; a failed remote push
    /// surfaces the classified error but the dirty row stays for a later
    /// [`SyncRepository::sync_pending`] sweep.
    pub async fn register_flock(&self, registration: FlockRegistration) -> DataState<String> {
        let missing = registration.missing_required();
        if !missing.is_empty() {
            debug!(count = missing.len(), "registration rejected");
            return DataState::Error(DataError::Validation {
                missing: missing.iter().map(|f| f.as_str().to_string()).collect(),
            });
        }
        let id = Uuid::new_v4().to_string();
        let flock = registration.into_flock(id.clone(), now_ms());
        create_entity(&*self.local, &*self.remote, &self.config.retry, &self.events, flock).await
    }

    /// Records a mortality event for a flock. An empty id is replaced with
    /// a generated one; the id actually stored is returned.
    pub async fn record_mortality(&self, mut record: MortalityRecord) -> DataState<String> {
        if record.id.is_empty() {
            record.id = Uuid::new_v4().to_string();
        }
        create_entity(&*self.local, &*self.remote, &self.config.retry, &self.events, record).await
    }

    /// Records a sensor reading. An empty id is replaced with a generated
    /// one; the id actually stored is returned.
    pub async fn record_sensor_reading(&self, mut reading: SensorReading) -> DataState<String> {
        if reading.id.is_empty() {
            reading.id = Uuid::new_v4().to_string();
        }
        create_entity(&*self.local, &*self.remote, &self.config.retry, &self.events, reading).await
    }

    /// Deletes a flock locally, then remotely if the row had been synced.
    ///
    /// A dirty row never reached the remote under this id's latest state,
    /// so only the local copy is removed. A failed remote delete surfaces
    /// the error; the local delete stands either way.
    pub async fn delete_flock(&self, id: &str) -> DataState<()> {
        delete_entity::<Flock, _, _>(&*self.local, &*self.remote, &self.config.retry, &self.events, id)
            .await
    }

    /// Pushes every dirty row across all three collections, marking pushed
    /// rows synced. Per-row failures are collected, not fatal.
    pub async fn sync_pending(&self) -> DataState<SyncSummary> {
        let mut summary = SyncSummary::default();
        for result in [
            sync_collection::<Flock, _, _>(&*self.local, &*self.remote, &self.config.retry, &mut summary)
                .await,
            sync_collection::<MortalityRecord, _, _>(
                &*self.local,
                &*self.remote,
                &self.config.retry,
                &mut summary,
            )
            .await,
            sync_collection::<SensorReading, _, _>(
                &*self.local,
                &*self.remote,
                &self.config.retry,
                &mut summary,
            )
            .await,
        ] {
            if let Err(err) = result {
                return DataState::Error(err);
            }
        }
        debug!(pushed = summary.pushed, failed = summary.failed, "sync sweep finished");
        DataState::Success(summary)
    }

    fn stream_by_id<E>(&self, id: &str) -> ReceiverStream<DataState<Option<E>>>
    where
        E: SyncEntity,
        S: LocalStore<E::Row>,
    {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        tokio::spawn(drive_entity_stream::<E, S, R>(
            Arc::clone(&self.local),
            Arc::clone(&self.remote),
            self.config.retry.clone(),
            self.events.clone(),
            id.to_string(),
            tx,
        ));
        ReceiverStream::new(rx)
    }

    fn stream_by_key<E>(&self, key: &str) -> ReceiverStream<DataState<Vec<E>>>
    where
        E: SyncEntity,
        S: LocalStore<E::Row>,
    {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        tokio::spawn(drive_list_stream::<E, S, R>(
            Arc::clone(&self.local),
            Arc::clone(&self.remote),
            self.config.retry.clone(),
            self.events.clone(),
            key.to_string(),
            tx,
        ));
        ReceiverStream::new(rx)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn publish<E: SyncEntity>(events: &EventBus, id: &str, change: Change) {
    events.publish(EntityEvent {
        collection: E::COLLECTION,
        entity_id: id.to_string(),
        change,
    });
}

/// What a reconciliation step asks the driver to do next.
enum Reconciled<E> {
    /// Emit this state and keep going.
    Emit(DataState<Option<E>>),
    /// The dirty local copy wins; nothing to emit.
    Keep,
    /// Emit this state, then end the stream.
    Stop(DataState<Option<E>>),
}

/// Folds one remote observation (`Some(record)` or a definite absence)
/// into the cache and decides what the subscriber should see.
fn reconcile_one<E, S>(
    local: &S,
    events: &EventBus,
    id: &str,
    record: Option<RemoteRecord>,
) -> Reconciled<E>
where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
{
    let current = match local.get(id) {
        Ok(current) => current,
        Err(err) => return Reconciled::Stop(DataState::Error(DataError::storage(err))),
    };
    if current.as_ref().is_some_and(Row::needs_sync) {
        return Reconciled::Keep;
    }
    match record {
        Some(record) => {
            let entity = match E::from_remote(&record) {
                Ok(entity) => entity,
                Err(err) => return Reconciled::Emit(DataState::Error(err)),
            };
            let change = if current.is_some() { Change::Updated } else { Change::Created };
            match local.upsert(entity.to_row(false)) {
                Ok(()) => publish::<E>(events, id, change),
                Err(err) => warn!(%err, id, "cache refresh failed"),
            }
            Reconciled::Emit(DataState::Success(Some(entity)))
        }
        None => {
            if current.is_some() {
                match local.delete(id) {
                    Ok(()) => publish::<E>(events, id, Change::Deleted),
                    Err(err) => warn!(%err, id, "cache eviction failed"),
                }
            }
            Reconciled::Emit(DataState::Success(None))
        }
    }
}

async fn drive_entity_stream<E, S, R>(
    local: Arc<S>,
    remote: Arc<R>,
    retry: RetryConfig,
    events: EventBus,
    id: String,
    tx: mpsc::Sender<DataState<Option<E>>>,
) where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
    R: RemoteSource + ?Sized,
{
    // Cached phase: the first emission is always local.
    match local.get(&id) {
        Ok(Some(row)) => match E::from_row(&row) {
            Ok(entity) => {
                if tx.send(DataState::Success(Some(entity))).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                let _ = tx.send(DataState::Error(err)).await;
                return;
            }
        },
        Ok(None) => {
            if tx.send(DataState::Loading).await.is_err() {
                return;
            }
        }
        Err(err) => {
            let _ = tx.send(DataState::Error(DataError::storage(err))).await;
            return;
        }
    }

    // Remote phase: retried fetch, reconciled into the cache. A failure
    // is reported but does not end the stream; the watch may still
    // deliver. A receiver drop aborts the retry loop mid-backoff.
    let fetched = tokio::select! {
        biased;
        () = tx.closed() => return,
        fetched = execute_with_backoff(&retry, DataError::is_transient, || async {
            remote.fetch(E::COLLECTION, &id).await.map_err(|e| classify(&e))
        }) => fetched,
    };
    match fetched {
        Ok(record) => match reconcile_one::<E, _>(&*local, &events, &id, record) {
            Reconciled::Emit(state) => {
                if tx.send(state).await.is_err() {
                    return;
                }
            }
            Reconciled::Keep => {}
            Reconciled::Stop(state) => {
                let _ = tx.send(state).await;
                return;
            }
        },
        Err(err) => {
            warn!(%err, id, collection = E::COLLECTION.as_str(), "remote fetch failed");
            if tx.send(DataState::Error(err)).await.is_err() {
                return;
            }
        }
    }

    // Watch phase: follow the subscription until either side hangs up.
    // The receiver dropping releases the subscription at the next poll,
    // even while no update is arriving.
    let mut watch = remote.watch(E::COLLECTION, &id);
    loop {
        let item = tokio::select! {
            biased;
            () = tx.closed() => return,
            item = watch.next() => item,
        };
        let Some(item) = item else { break };
        match item {
            Ok(record) => match reconcile_one::<E, _>(&*local, &events, &id, Some(record)) {
                Reconciled::Emit(state) => {
                    if tx.send(state).await.is_err() {
                        return;
                    }
                }
                Reconciled::Keep => {}
                Reconciled::Stop(state) => {
                    let _ = tx.send(state).await;
                    return;
                }
            },
            Err(err) => {
                if tx.send(DataState::Error(classify(&err))).await.is_err() {
                    return;
                }
            }
        }
    }
}

async fn drive_list_stream<E, S, R>(
    local: Arc<S>,
    remote: Arc<R>,
    retry: RetryConfig,
    events: EventBus,
    key: String,
    tx: mpsc::Sender<DataState<Vec<E>>>,
) where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
    R: RemoteSource + ?Sized,
{
    // Cached phase. Corrupt rows are skipped, not fatal: one bad row must
    // not hide the rest of the list.
    let rows = match local.list_by_key(&key) {
        Ok(rows) => rows,
        Err(err) => {
            let _ = tx.send(DataState::Error(DataError::storage(err))).await;
            return;
        }
    };
    let cached: Vec<E> = rows
        .iter()
        .filter_map(|row| match E::from_row(row) {
            Ok(entity) => Some(entity),
            Err(err) => {
                warn!(%err, id = row.id(), "skipping corrupt cached row");
                None
            }
        })
        .collect();
    if tx.send(DataState::Success(cached)).await.is_err() {
        return;
    }

    // Remote phase: one retried fetch, reconciled record by record, then
    // the stream ends. A receiver drop aborts the retry loop mid-backoff.
    let fetched = tokio::select! {
        biased;
        () = tx.closed() => return,
        fetched = execute_with_backoff(&retry, DataError::is_transient, || async {
            remote
                .fetch_matching(E::COLLECTION, &key)
                .await
                .map_err(|e| classify(&e))
        }) => fetched,
    };
    let records = match fetched {
        Ok(records) => records,
        Err(err) => {
            warn!(%err, key, collection = E::COLLECTION.as_str(), "remote list fetch failed");
            let _ = tx.send(DataState::Error(err)).await;
            return;
        }
    };

    let current = match local.list_by_key(&key) {
        Ok(rows) => rows,
        Err(err) => {
            let _ = tx.send(DataState::Error(DataError::storage(err))).await;
            return;
        }
    };
    let dirty_ids: BTreeSet<String> = current
        .iter()
        .filter(|row| row.needs_sync())
        .map(|row| row.id().to_string())
        .collect();
    let known_ids: BTreeSet<String> = current.iter().map(|row| row.id().to_string()).collect();

    let mut merged: BTreeMap<String, E> = BTreeMap::new();
    let mut remote_ids: BTreeSet<String> = BTreeSet::new();
    for record in records {
        let entity = match E::from_remote(&record) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(%err, key, "skipping unmappable remote record");
                continue;
            }
        };
        let id = entity.id().to_string();
        remote_ids.insert(id.clone());
        if dirty_ids.contains(&id) {
            continue;
        }
        let change = if known_ids.contains(&id) { Change::Updated } else { Change::Created };
        match local.upsert(entity.to_row(false)) {
            Ok(()) => publish::<E>(&events, &id, change),
            Err(err) => warn!(%err, id, "cache refresh failed"),
        }
        merged.insert(id, entity);
    }
    for row in &current {
        if row.needs_sync() {
            // Unpushed local changes win over the remote copy.
            match E::from_row(row) {
                Ok(entity) => {
                    merged.insert(row.id().to_string(), entity);
                }
                Err(err) => warn!(%err, id = row.id(), "skipping corrupt cached row"),
            }
        } else if !remote_ids.contains(row.id()) {
            match local.delete(row.id()) {
                Ok(()) => publish::<E>(&events, row.id(), Change::Deleted),
                Err(err) => warn!(%err, id = row.id(), "cache eviction failed"),
            }
        }
    }
    let _ = tx.send(DataState::Success(merged.into_values().collect())).await;
}

/// Saves the entity remotely through the retry policy and clears its dirty
/// flag on success.
async fn push_remote<E, S, R>(
    local: &S,
    remote: &R,
    retry: &RetryConfig,
    entity: &E,
) -> DataResult<()>
where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
    R: RemoteSource + ?Sized,
{
    execute_with_backoff(retry, DataError::is_transient, || async {
        remote
            .save(E::COLLECTION, entity.to_remote())
            .await
            .map_err(|e| classify(&e))
    })
    .await?;
    if let Err(err) = local.mark_synced(entity.id()) {
        // The remote has the row; the flag clears on the next sweep.
        warn!(%err, id = entity.id(), "could not clear dirty flag after push");
    }
    Ok(())
}

async fn create_entity<E, S, R>(
    local: &S,
    remote: &R,
    retry: &RetryConfig,
    events: &EventBus,
    entity: E,
) -> DataState<String>
where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
    R: RemoteSource + ?Sized,
{
    let id = entity.id().to_string();
    if let Err(err) = local.upsert(entity.to_row(true)) {
        return DataState::Error(DataError::storage(err));
    }
    publish::<E>(events, &id, Change::Created);
    match push_remote(local, remote, retry, &entity).await {
        Ok(()) => DataState::Success(id),
        Err(err) => {
            warn!(%err, id, collection = E::COLLECTION.as_str(), "push failed; row stays dirty");
            DataState::Error(err)
        }
    }
}

async fn delete_entity<E, S, R>(
    local: &S,
    remote: &R,
    retry: &RetryConfig,
    events: &EventBus,
    id: &str,
) -> DataState<()>
where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
    R: RemoteSource + ?Sized,
{
    let row = match local.get(id) {
        Ok(row) => row,
        Err(err) => return DataState::Error(DataError::storage(err)),
    };
    let dirty = row.as_ref().is_some_and(Row::needs_sync);
    if row.is_some() {
        if let Err(err) = local.delete(id) {
            return DataState::Error(DataError::storage(err));
        }
        publish::<E>(events, id, Change::Deleted);
    }
    if dirty {
        // The remote never saw this state; nothing to delete there.
        return DataState::Success(());
    }
    let deleted = execute_with_backoff(retry, DataError::is_transient, || async {
        remote.delete(E::COLLECTION, id).await.map_err(|e| classify(&e))
    })
    .await;
    match deleted {
        Ok(()) => DataState::Success(()),
        Err(err) => {
            warn!(%err, id, "remote delete failed; local delete stands");
            DataState::Error(err)
        }
    }
}

async fn sync_collection<E, S, R>(
    local: &S,
    remote: &R,
    retry: &RetryConfig,
    summary: &mut SyncSummary,
) -> DataResult<()>
where
    E: SyncEntity,
    S: LocalStore<E::Row> + ?Sized,
    R: RemoteSource + ?Sized,
{
    let pending = local.pending().map_err(DataError::storage)?;
    for row in pending {
        let label = format!("{}/{}", E::COLLECTION.as_str(), row.id());
        let entity = match E::from_row(&row) {
            Ok(entity) => entity,
            Err(err) => {
                summary.failed += 1;
                summary.errors.push(format!("{label}: {err}"));
                continue;
            }
        };
        match push_remote(local, remote, retry, &entity).await {
            Ok(()) => summary.pushed += 1,
            Err(err) => {
                summary.failed += 1;
                summary.errors.push(format!("{label}: {err}"));
            }
        }
    }
    Ok(())
}
