//! The local store contract and an in-memory implementation.

use crate::error::{StoreError, StoreResult};
use crate::row::{FlockRow, MortalityRow, Row, SensorRow};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Durable, always-available cache for one row type.
///
/// Reads and writes are synchronous and fast; they never suspend. A write
/// is atomic per id: no reader observes a partially written row. How
/// concurrent writes to the same id are serialized is the implementation's
/// business.
pub trait LocalStore<R: Row>: Send + Sync {
    /// Fetches a row by primary key.
    fn get(&self, id: &str) -> StoreResult<Option<R>>;

    /// Fetches all rows whose list key matches, ordered by id.
    fn list_by_key(&self, key: &str) -> StoreResult<Vec<R>>;

    /// Inserts or replaces a row.
    fn upsert(&self, row: R) -> StoreResult<()>;

    /// Deletes a row by primary key. Deleting a missing row is a no-op.
    fn delete(&self, id: &str) -> StoreResult<()>;

    /// All rows still carrying unsynced local changes, ordered by id.
    fn pending(&self) -> StoreResult<Vec<R>>;

    /// Clears the dirty flag on a row.
    fn mark_synced(&self, id: &str) -> StoreResult<()>;
}

/// One in-memory table.
struct MemoryTable<R: Row> {
    rows: RwLock<BTreeMap<String, R>>,
}

impl<R: Row> MemoryTable<R> {
    fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn get(&self, id: &str) -> Option<R> {
        self.rows.read().get(id).cloned()
    }

    fn list_by_key(&self, key: &str) -> Vec<R> {
        self.rows
            .read()
            .values()
            .filter(|row| row.list_key() == key)
            .cloned()
            .collect()
    }

    fn upsert(&self, row: R) {
        self.rows.write().insert(row.id().to_string(), row);
    }

    fn delete(&self, id: &str) {
        self.rows.write().remove(id);
    }

    fn pending(&self) -> Vec<R> {
        self.rows
            .read()
            .values()
            .filter(|row| row.needs_sync())
            .cloned()
            .collect()
    }

    fn mark_synced(&self, id: &str) -> StoreResult<()> {
        let mut rows = self.rows.write();
        match rows.get_mut(id) {
            Some(row) => {
                row.set_needs_sync(false);
                Ok(())
            }
            None => Err(StoreError::NotFound(id.to_string())),
        }
    }
}

/// In-memory [`LocalStore`] covering all three entity tables.
///
/// Used by tests and local composition roots. Write failures can be
/// injected to exercise the repository's local-failure paths.
#[derive(Default)]
pub struct MemoryLocalStore {
    flocks: MemoryTable<FlockRow>,
    mortality: MemoryTable<MortalityRow>,
    sensors: MemoryTable<SensorRow>,
    fail_writes: AtomicBool,
}

impl MemoryLocalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with a backend error until
    /// [`MemoryLocalStore::restore_writes`] is called.
    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    /// Clears injected write failures.
    pub fn restore_writes(&self) {
        self.fail_writes.store(false, Ordering::SeqCst);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Backend("injected write failure".into()))
        } else {
            Ok(())
        }
    }
}

impl<R: Row> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_local_store {
    ($row:ty, $table:ident) => {
        impl LocalStore<$row> for MemoryLocalStore {
            fn get(&self, id: &str) -> StoreResult<Option<$row>> {
                Ok(self.$table.get(id))
            }

            fn list_by_key(&self, key: &str) -> StoreResult<Vec<$row>> {
                Ok(self.$table.list_by_key(key))
            }

            fn upsert(&self, row: $row) -> StoreResult<()> {
                self.check_writable()?;
                self.$table.upsert(row);
                Ok(())
            }

            fn delete(&self, id: &str) -> StoreResult<()> {
                self.check_writable()?;
                self.$table.delete(id);
                Ok(())
            }

            fn pending(&self) -> StoreResult<Vec<$row>> {
                Ok(self.$table.pending())
            }

            fn mark_synced(&self, id: &str) -> StoreResult<()> {
                self.check_writable()?;
                self.$table.mark_synced(id)
            }
        }
    };
}

impl_local_store!(FlockRow, flocks);
impl_local_store!(MortalityRow, mortality);
impl_local_store!(SensorRow, sensors);
