//! End-to-end scenarios over the full local + remote + repository stack.

use std::sync::Arc;
use std::time::Duration;

use flocksync_core::{DataError, DataState, RetryConfig, TransportError};
use flocksync_model::{Flock, FlockType};
use flocksync_repo::{Change, RepoConfig, SyncEntity, SyncRepository};
use flocksync_store::{
    Collection, FieldValue, FlockRow, LocalStore, MemoryLocalStore, MockRemoteSource, RemoteSource,
};
use flocksync_testkit::fixtures;
use flocksync_testkit::generators::{arb_flock, arb_mortality_record, arb_sensor_reading};
use proptest::prelude::*;
use tokio_stream::StreamExt;

fn new_repo(
    local: &Arc<MemoryLocalStore>,
    remote: &Arc<MockRemoteSource>,
) -> SyncRepository<MemoryLocalStore, MockRemoteSource> {
    SyncRepository::new(
        Arc::clone(local),
        Arc::clone(remote),
        RepoConfig::new().with_retry(RetryConfig::no_retry()),
    )
}

fn cache_flock(local: &MemoryLocalStore, flock: &Flock, needs_sync: bool) {
    local.upsert(flock.to_row(needs_sync)).unwrap();
}

#[tokio::test]
async fn cached_flock_survives_unreachable_remote() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let flock = fixtures::sample_flock("F1");
    cache_flock(&local, &flock, false);
    remote.set_reachable(false);

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flock_by_id("F1");

    // Cached emission first, then the classified failure; the earlier
    // value is never retracted.
    assert_eq!(stream.next().await.unwrap(), DataState::Success(Some(flock.clone())));
    assert_eq!(stream.next().await.unwrap(), DataState::Error(DataError::NoInternet));
    assert_eq!(
        LocalStore::<FlockRow>::get(&*local, "F1").unwrap().unwrap(),
        flock.to_row(false)
    );
}

#[tokio::test]
async fn cold_cache_loads_from_remote() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let flock = fixtures::sample_flock("F1");
    remote.seed(Collection::Flocks, flock.to_remote());

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flock_by_id("F1");

    assert_eq!(stream.next().await.unwrap(), DataState::Loading);
    assert_eq!(stream.next().await.unwrap(), DataState::Success(Some(flock.clone())));

    // The fetch refreshed the cache as a clean row.
    let row = LocalStore::<FlockRow>::get(&*local, "F1").unwrap().unwrap();
    assert!(!row.needs_sync);
    assert_eq!(row, flock.to_row(false));
}

#[tokio::test]
async fn remote_absence_evicts_clean_row() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let flock = fixtures::sample_flock("F1");
    cache_flock(&local, &flock, false);

    let repo = new_repo(&local, &remote);
    let mut events = repo.events().subscribe();
    let mut stream = repo.flock_by_id("F1");

    assert_eq!(stream.next().await.unwrap(), DataState::Success(Some(flock)));
    assert_eq!(stream.next().await.unwrap(), DataState::Success(None));
    assert_eq!(LocalStore::<FlockRow>::get(&*local, "F1").unwrap(), None);

    let event = events.recv().await.unwrap();
    assert_eq!(event.change, Change::Deleted);
    assert_eq!(event.entity_id, "F1");
}

#[tokio::test]
async fn dirty_row_wins_over_remote() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let mut local_flock = fixtures::sample_flock("F1");
    local_flock.name = "renamed offline".into();
    cache_flock(&local, &local_flock, true);
    // Remote still has the old name.
    remote.seed(Collection::Flocks, fixtures::sample_flock("F1").to_remote());

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flock_by_id("F1");

    assert_eq!(
        stream.next().await.unwrap(),
        DataState::Success(Some(local_flock.clone()))
    );
    // The reconcile keeps the dirty row: no second emission arrives.
    let silence =
        tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
    assert!(silence.is_err());
    let row = LocalStore::<FlockRow>::get(&*local, "F1").unwrap().unwrap();
    assert!(row.needs_sync);
    assert_eq!(row.name, "renamed offline");
}

#[tokio::test]
async fn watch_updates_refresh_cache_and_re_emit() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let flock = fixtures::sample_flock("F1");
    remote.seed(Collection::Flocks, flock.to_remote());

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flock_by_id("F1");
    assert_eq!(stream.next().await.unwrap(), DataState::Loading);
    assert!(stream.next().await.unwrap().is_success());

    let mut renamed = flock.clone();
    renamed.name = "renamed upstream".into();
    renamed.updated_at += 1;
    remote.push_update(Collection::Flocks, renamed.to_remote());

    assert_eq!(
        stream.next().await.unwrap(),
        DataState::Success(Some(renamed.clone()))
    );
    let row = LocalStore::<FlockRow>::get(&*local, "F1").unwrap().unwrap();
    assert_eq!(row.name, "renamed upstream");

    // A watch failure is reported without closing the subscription.
    remote.push_watch_error(
        Collection::Flocks,
        "F1",
        TransportError::TimedOut { millis: 5000 },
    );
    assert_eq!(stream.next().await.unwrap(), DataState::Error(DataError::Timeout));

    remote.push_update(Collection::Flocks, flock.to_remote());
    assert_eq!(stream.next().await.unwrap(), DataState::Success(Some(flock)));
}

#[tokio::test]
async fn dropped_receiver_stops_the_driver() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    remote.seed(Collection::Flocks, fixtures::sample_flock("F1").to_remote());

    let repo = new_repo(&local, &remote);
    let stream = repo.flock_by_id("F1");
    drop(stream);

    // The driver bails at its first failed send, before the fetch, so the
    // cache is never touched.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(LocalStore::<FlockRow>::get(&*local, "F1").unwrap(), None);
}

#[tokio::test]
async fn dropped_receiver_releases_the_watch_subscription() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let flock = fixtures::sample_flock("F1");
    remote.seed(Collection::Flocks, flock.to_remote());

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flock_by_id("F1");
    assert_eq!(stream.next().await.unwrap(), DataState::Loading);
    assert!(stream.next().await.unwrap().is_success());

    // The driver is now parked on the watch. Dropping the receiver must
    // stop it even though no further send is attempted.
    drop(stream);

    let mut renamed = flock.clone();
    renamed.name = "renamed upstream".into();
    remote.push_update(Collection::Flocks, renamed.to_remote());
    tokio::time::sleep(Duration::from_millis(100)).await;

    // A dead subscriber's driver must not keep reconciling updates.
    let row = LocalStore::<FlockRow>::get(&*local, "F1").unwrap().unwrap();
    assert_eq!(row.name, "Flock F1");
}

#[tokio::test]
async fn list_stream_merges_local_and_remote() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());

    // F1: clean locally, updated upstream. F2: dirty local change.
    // F3: clean locally, gone upstream. F4: new upstream.
    let f1 = fixtures::sample_flock("F1");
    let mut f2 = fixtures::sample_flock("F2");
    f2.name = "renamed offline".into();
    let f3 = fixtures::sample_flock("F3");
    let f4 = fixtures::sample_flock("F4");
    cache_flock(&local, &f1, false);
    cache_flock(&local, &f2, true);
    cache_flock(&local, &f3, false);

    let mut f1_up = f1.clone();
    f1_up.name = "renamed upstream".into();
    remote.seed(Collection::Flocks, f1_up.to_remote());
    remote.seed(Collection::Flocks, fixtures::sample_flock("F2").to_remote());
    remote.seed(Collection::Flocks, f4.to_remote());

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flocks_by_type(FlockType::Hen);

    let cached = stream.next().await.unwrap().success().unwrap();
    assert_eq!(
        cached.iter().map(|f| f.id.as_str()).collect::<Vec<_>>(),
        vec!["F1", "F2", "F3"]
    );

    let merged = stream.next().await.unwrap().success().unwrap();
    let names: Vec<(&str, &str)> =
        merged.iter().map(|f| (f.id.as_str(), f.name.as_str())).collect();
    assert_eq!(
        names,
        vec![
            ("F1", "renamed upstream"),
            ("F2", "renamed offline"),
            ("F4", "Flock F4"),
        ]
    );
    // The stream ends after the remote phase.
    assert_eq!(stream.next().await, None);

    // F3 was evicted, F2 kept its dirty flag.
    assert_eq!(LocalStore::<FlockRow>::get(&*local, "F3").unwrap(), None);
    assert!(LocalStore::<FlockRow>::get(&*local, "F2").unwrap().unwrap().needs_sync);
}

#[tokio::test]
async fn list_stream_reports_remote_failure_after_cached_emission() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    cache_flock(&local, &fixtures::sample_flock("F1"), false);
    remote.set_reachable(false);

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flocks_by_type(FlockType::Hen);

    assert_eq!(stream.next().await.unwrap().success().unwrap().len(), 1);
    assert_eq!(stream.next().await.unwrap(), DataState::Error(DataError::NoInternet));
    assert_eq!(stream.next().await, None);
}

#[tokio::test]
async fn offline_registration_drains_through_sync_pending() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    remote.set_reachable(false);
    let repo = new_repo(&local, &remote);

    let state = repo.register_flock(fixtures::sample_registration()).await;
    assert_eq!(state.error(), Some(&DataError::NoInternet));
    let pending = LocalStore::<FlockRow>::pending(&*local).unwrap();
    assert_eq!(pending.len(), 1);
    let id = pending[0].id.clone();

    remote.set_reachable(true);
    let summary = repo.sync_pending().await.success().unwrap();
    assert_eq!(summary.pushed, 1);
    assert!(summary.is_clean());

    let record = remote.fetch(Collection::Flocks, &id).await.unwrap().unwrap();
    assert_eq!(record.get("id").unwrap().as_str(), Some(id.as_str()));
    assert!(LocalStore::<FlockRow>::pending(&*local).unwrap().is_empty());
}

#[tokio::test]
async fn traceable_registration_requires_full_lineage() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let repo = new_repo(&local, &remote);

    let mut reg = fixtures::traceable_registration();
    reg.father_id = None;
    reg.mother_id = None;

    match repo.register_flock(reg).await {
        DataState::Error(DataError::Validation { missing }) => {
            assert!(missing.contains(&"Family tree".to_string()));
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(LocalStore::<FlockRow>::pending(&*local).unwrap().is_empty());

    assert!(repo
        .register_flock(fixtures::traceable_registration())
        .await
        .is_success());
}

#[tokio::test(start_paused = true)]
async fn transient_remote_failures_are_retried_with_backoff() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let flock = fixtures::sample_flock("F1");
    remote.seed(Collection::Flocks, flock.to_remote());
    remote.fail_next(2, TransportError::Http { status: 503, message: "busy".into() });

    let repo = SyncRepository::new(
        Arc::clone(&local),
        Arc::clone(&remote),
        RepoConfig::new().with_retry(RetryConfig::new(3)),
    );
    let mut stream = repo.flock_by_id("F1");

    assert_eq!(stream.next().await.unwrap(), DataState::Loading);
    // Two 503s are absorbed by the backoff loop; paused time fast-forwards
    // the sleeps.
    assert_eq!(stream.next().await.unwrap(), DataState::Success(Some(flock)));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    remote.fail_next(1, TransportError::Http { status: 403, message: "forbidden".into() });

    let repo = SyncRepository::new(
        Arc::clone(&local),
        Arc::clone(&remote),
        RepoConfig::new().with_retry(RetryConfig::new(3)),
    );
    let mut stream = repo.flock_by_id("F1");

    assert_eq!(stream.next().await.unwrap(), DataState::Loading);
    // A single scripted failure surfaces directly: no retry consumed it.
    assert_eq!(stream.next().await.unwrap(), DataState::Error(DataError::Client(403)));
}

#[tokio::test]
async fn unmappable_remote_record_is_an_error_not_a_crash() {
    let local = Arc::new(MemoryLocalStore::new());
    let remote = Arc::new(MockRemoteSource::new());
    let mut record = fixtures::remote_flock_record("F1", FlockType::Hen);
    record.insert("flock_type".into(), FieldValue::Str("ostrich".into()));
    remote.seed(Collection::Flocks, record);

    let repo = new_repo(&local, &remote);
    let mut stream = repo.flock_by_id("F1");

    assert_eq!(stream.next().await.unwrap(), DataState::Loading);
    match stream.next().await.unwrap() {
        DataState::Error(DataError::Unknown(message)) => {
            assert!(message.contains("ostrich"));
        }
        other => panic!("unexpected state: {other:?}"),
    }
    // Nothing bogus was written to the cache.
    assert_eq!(LocalStore::<FlockRow>::get(&*local, "F1").unwrap(), None);
}

proptest! {
    #[test]
    fn flock_mappings_round_trip(flock in arb_flock()) {
        prop_assert_eq!(&Flock::from_row(&flock.to_row(false)).unwrap(), &flock);
        prop_assert_eq!(&Flock::from_remote(&flock.to_remote()).unwrap(), &flock);
    }

    #[test]
    fn mortality_mappings_round_trip(record in arb_mortality_record()) {
        use flocksync_model::MortalityRecord;
        prop_assert_eq!(&MortalityRecord::from_row(&record.to_row(true)).unwrap(), &record);
        prop_assert_eq!(&MortalityRecord::from_remote(&record.to_remote()).unwrap(), &record);
    }

    #[test]
    fn sensor_mappings_round_trip(reading in arb_sensor_reading()) {
        use flocksync_model::SensorReading;
        prop_assert_eq!(&SensorReading::from_row(&reading.to_row(true)).unwrap(), &reading);
        prop_assert_eq!(&SensorReading::from_remote(&reading.to_remote()).unwrap(), &reading);
    }
}
