//! Shared application state for the monitor API server.
//!
//! [`SnapshotStore`] is the single shared mutable resource in the system:
//! one slot holding the latest complete factory snapshot and the wall-clock
//! time it was accepted. Ingestion replaces the slot wholesale; the poll
//! endpoint and the archiver copy it out under a read lock and release the
//! lock before doing any I/O.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use linewatch_db::TableStorePool;
use linewatch_types::{FactorySnapshot, LimitTable};
use tokio::sync::RwLock;

/// Placeholder freshness label served before the first snapshot arrives.
pub const WAITING_FOR_SIGNAL: &str = "Waiting for Signal...";

/// The current snapshot together with its acceptance time.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    /// The latest complete factory snapshot.
    pub snapshot: FactorySnapshot,
    /// Wall-clock time the snapshot was accepted by the store.
    pub last_updated: DateTime<Utc>,
}

/// Single-slot store for the latest factory snapshot.
///
/// Replace is atomic: a reader observes either the previous snapshot or
/// the new one in full, never a mixture. There is intentionally no
/// history here -- history lives only in the archive.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Option<StoredSnapshot>>>,
}

impl SnapshotStore {
    /// Create an empty store. Reads return `None` until the first replace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a snapshot as current, last-write-wins.
    ///
    /// Stamps `captured_at` with the acceptance time when the producer did
    /// not supply one. Always succeeds; late or out-of-order snapshots are
    /// accepted as-is.
    pub async fn replace(&self, mut snapshot: FactorySnapshot) {
        let now = Utc::now();
        if snapshot.captured_at.is_none() {
            snapshot.captured_at = Some(now);
        }

        let mut slot = self.inner.write().await;
        *slot = Some(StoredSnapshot {
            snapshot,
            last_updated: now,
        });
    }

    /// Copy out the current snapshot, or `None` before the first replace.
    ///
    /// The clone happens under the read lock; callers never hold the lock
    /// across I/O.
    pub async fn read(&self) -> Option<StoredSnapshot> {
        self.inner.read().await.clone()
    }
}

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The single-slot snapshot store.
    pub store: SnapshotStore,
    /// Monitor-side alarm limits attached to pushed readings.
    pub limits: LimitTable,
    /// Table-store pool for history queries, when one was initialized.
    pub archive: Option<TableStorePool>,
}

impl AppState {
    /// Create application state with no table store attached.
    pub fn new(limits: LimitTable) -> Self {
        Self {
            store: SnapshotStore::new(),
            limits,
            archive: None,
        }
    }

    /// Create application state with a table-store pool for history
    /// queries.
    pub fn with_archive(limits: LimitTable, archive: TableStorePool) -> Self {
        Self {
            store: SnapshotStore::new(),
            limits,
            archive: Some(archive),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use linewatch_types::{MetricReading, Process, ProcessBlock};

    use super::*;

    /// A complete snapshot where every reading carries the same marker
    /// value, so a torn read would be detectable as mixed markers.
    fn marked_snapshot(marker: f64) -> FactorySnapshot {
        let mut processes = BTreeMap::new();
        for process in Process::ALL {
            processes.insert(
                process,
                ProcessBlock::new(vec![
                    MetricReading::new("motor_temp", marker, 1000.0),
                    MetricReading::new("psu_temp", marker, 1000.0),
                ]),
            );
        }
        FactorySnapshot::new(processes)
    }

    #[tokio::test]
    async fn read_before_first_replace_is_none() {
        let store = SnapshotStore::new();
        assert!(store.read().await.is_none());
    }

    #[tokio::test]
    async fn replace_then_read_returns_the_snapshot() {
        let store = SnapshotStore::new();
        let before = Utc::now();

        store.replace(marked_snapshot(1.0)).await;

        let stored = store.read().await.unwrap();
        assert!(stored.last_updated >= before);
        assert!(stored.snapshot.is_complete());
        assert_eq!(stored.snapshot.reading_count(), 8);
    }

    #[tokio::test]
    async fn read_is_idempotent() {
        let store = SnapshotStore::new();
        store.replace(marked_snapshot(2.0)).await;

        let first = store.read().await;
        let second = store.read().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn replace_stamps_captured_at_when_absent() {
        let store = SnapshotStore::new();
        store.replace(marked_snapshot(3.0)).await;

        let stored = store.read().await.unwrap();
        assert!(stored.snapshot.captured_at.is_some());
    }

    #[tokio::test]
    async fn replace_preserves_producer_captured_at() {
        let store = SnapshotStore::new();
        let mut snapshot = marked_snapshot(4.0);
        let supplied = Utc::now();
        snapshot.captured_at = Some(supplied);

        store.replace(snapshot).await;

        let stored = store.read().await.unwrap();
        assert_eq!(stored.snapshot.captured_at, Some(supplied));
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = SnapshotStore::new();
        store.replace(marked_snapshot(1.0)).await;
        store.replace(marked_snapshot(2.0)).await;

        let stored = store.read().await.unwrap();
        let block = stored.snapshot.block(Process::Pultrusion).unwrap();
        assert_eq!(block.readings[0].value, 2.0);
    }

    #[tokio::test]
    async fn concurrent_readers_never_observe_a_torn_snapshot() {
        let store = SnapshotStore::new();
        store.replace(marked_snapshot(0.0)).await;

        let writer = {
            let store = store.clone();
            tokio::spawn(async move {
                for generation in 1..=50_u32 {
                    store.replace(marked_snapshot(f64::from(generation))).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move {
                    for _ in 0..100 {
                        let stored = store.read().await.unwrap();
                        let values: Vec<f64> = stored
                            .snapshot
                            .processes
                            .values()
                            .flat_map(|b| b.readings.iter().map(|r| r.value))
                            .collect();
                        let first = values.first().copied().unwrap();
                        assert!(
                            values.iter().all(|v| *v == first),
                            "observed a mixture of snapshot generations"
                        );
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
