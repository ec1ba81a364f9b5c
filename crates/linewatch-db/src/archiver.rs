//! Interval-gated batch archiver.
//!
//! The archiver owns its own interval clock, decoupled from ingestion and
//! polling cadence. Each cycle it flattens the current factory snapshot
//! into [`ArchiveRow`]s and submits them as one batch. Failures are
//! swallowed into an [`ArchiveOutcome`] -- an unreachable table store
//! degrades to "archive skipped this cycle", never to a crash.
//!
//! # State machine
//!
//! ```text
//! Idle --(elapsed >= interval)--> Writing --(batch insert, any outcome)--> Idle
//! ```
//!
//! The timer resets when Writing is entered, so a failed cycle waits a
//! full interval before the next attempt.

use std::time::Duration;

use chrono::{DateTime, Utc};
use linewatch_types::FactorySnapshot;
use tokio::time::Instant;

use crate::sensor_store::SensorDataStore;
use crate::table_store::TableStorePool;

/// Default time between archive cycles.
pub const DEFAULT_ARCHIVE_INTERVAL: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Archive rows
// ---------------------------------------------------------------------------

/// One (process, metric, value, time) record bound for the table store.
///
/// Produced only by the archiver from a factory snapshot; one row per
/// metric reading, values rounded to 2 decimal places, `recorded_at`
/// assigned at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRow {
    /// Lowercase process name.
    pub process_name: String,
    /// Metric name as it appears on the wire.
    pub metric_name: String,
    /// Reading value rounded to 2 decimal places.
    pub value: f64,
    /// Timestamp assigned when the archive cycle ran.
    pub recorded_at: DateTime<Utc>,
}

impl ArchiveRow {
    /// Flatten a snapshot into archive rows, one per reading.
    pub fn flatten(snapshot: &FactorySnapshot, recorded_at: DateTime<Utc>) -> Vec<Self> {
        snapshot
            .processes
            .iter()
            .flat_map(|(process, block)| {
                block.readings.iter().map(|reading| Self {
                    process_name: process.as_str().to_owned(),
                    metric_name: reading.name.clone(),
                    value: round_2dp(reading.value),
                    recorded_at,
                })
            })
            .collect()
    }
}

/// Round a value to 2 decimal places for archival.
fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Archiver
// ---------------------------------------------------------------------------

/// Result of one call to [`Archiver::try_archive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// The interval has not elapsed; no attempt was made.
    Skipped,
    /// The batch landed in the table store.
    Written {
        /// Number of rows inserted.
        rows: usize,
    },
    /// The attempt failed (client uninitialized or insert error). The
    /// failure was swallowed; the next attempt waits a full interval.
    Failed,
}

impl ArchiveOutcome {
    /// Whether this outcome represents a successful write.
    pub const fn succeeded(self) -> bool {
        matches!(self, Self::Written { .. })
    }
}

/// Interval-gated batch archiver for factory snapshots.
///
/// Holds an optional table-store pool: when the pool failed to initialize
/// at startup, every attempt is a no-op [`ArchiveOutcome::Failed`] without
/// touching the network.
#[derive(Debug)]
pub struct Archiver {
    pool: Option<TableStorePool>,
    interval: Duration,
    last_attempt: Option<Instant>,
}

impl Archiver {
    /// Create an archiver with the given table-store pool (or `None` when
    /// the store is unavailable) and cycle interval.
    pub const fn new(pool: Option<TableStorePool>, interval: Duration) -> Self {
        Self {
            pool,
            interval,
            last_attempt: None,
        }
    }

    /// The configured cycle interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a table-store client was initialized at startup.
    pub const fn has_client(&self) -> bool {
        self.pool.is_some()
    }

    /// Whether enough time has elapsed since the last attempt to enter
    /// another archive cycle. The first call is always due.
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_attempt
            .is_none_or(|last| now.duration_since(last) >= self.interval)
    }

    /// Run one archive cycle if the interval has elapsed.
    ///
    /// On entering the cycle the timer resets immediately, so the outcome
    /// (success or failure) never shortens or stretches the cadence. The
    /// snapshot is flattened into rows stamped with the current wall-clock
    /// time and inserted as a single batch.
    pub async fn try_archive(&mut self, snapshot: &FactorySnapshot) -> ArchiveOutcome {
        let now = Instant::now();
        if !self.is_due(now) {
            return ArchiveOutcome::Skipped;
        }
        self.last_attempt = Some(now);

        let Some(pool) = &self.pool else {
            tracing::debug!("Archive cycle skipped: table store uninitialized");
            return ArchiveOutcome::Failed;
        };

        let rows = ArchiveRow::flatten(snapshot, Utc::now());
        let store = SensorDataStore::new(pool.pool());

        match store.batch_insert(&rows).await {
            Ok(()) => {
                tracing::debug!(rows = rows.len(), "Archive cycle written");
                ArchiveOutcome::Written { rows: rows.len() }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Archive cycle failed");
                ArchiveOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::collections::BTreeMap;

    use linewatch_types::{MetricReading, Process, ProcessBlock};

    use super::*;

    fn sample_snapshot() -> FactorySnapshot {
        let mut processes = BTreeMap::new();
        processes.insert(
            Process::Pultrusion,
            ProcessBlock::new(vec![
                MetricReading::new("die_temp", 85.123, 90.0),
                MetricReading::new("resin_temp", 40.126, 45.0),
            ]),
        );
        processes.insert(
            Process::Stranding,
            ProcessBlock::new(vec![MetricReading::new("psu_temp", 55.0, 60.0)]),
        );
        FactorySnapshot::new(processes)
    }

    #[test]
    fn flatten_produces_one_row_per_reading() {
        let recorded_at = Utc::now();
        let rows = ArchiveRow::flatten(&sample_snapshot(), recorded_at);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.recorded_at == recorded_at));
    }

    #[test]
    fn flatten_rounds_values_to_two_decimals() {
        let rows = ArchiveRow::flatten(&sample_snapshot(), Utc::now());
        let die = rows.iter().find(|r| r.metric_name == "die_temp").unwrap();
        assert_eq!(die.value, 85.12);
        let resin = rows.iter().find(|r| r.metric_name == "resin_temp").unwrap();
        assert_eq!(resin.value, 40.13);
    }

    #[test]
    fn flatten_uses_wire_process_names() {
        let rows = ArchiveRow::flatten(&sample_snapshot(), Utc::now());
        assert!(rows.iter().any(|r| r.process_name == "pultrusion"));
        assert!(rows.iter().any(|r| r.process_name == "stranding"));
    }

    #[tokio::test(start_paused = true)]
    async fn uninitialized_client_fails_without_network() {
        let mut archiver = Archiver::new(None, Duration::from_secs(5));
        let outcome = archiver.try_archive(&sample_snapshot()).await;
        assert_eq!(outcome, ArchiveOutcome::Failed);
        assert!(!outcome.succeeded());
    }

    #[tokio::test(start_paused = true)]
    async fn attempts_within_interval_are_gated() {
        let mut archiver = Archiver::new(None, Duration::from_secs(5));
        let snapshot = sample_snapshot();

        // First attempt enters the cycle (and fails: no client).
        assert_eq!(archiver.try_archive(&snapshot).await, ArchiveOutcome::Failed);

        // 2s later: still inside the interval, no attempt made.
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(archiver.try_archive(&snapshot).await, ArchiveOutcome::Skipped);

        // 6s after the first attempt: a new cycle is due.
        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(archiver.try_archive(&snapshot).await, ArchiveOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_cycle_still_resets_the_timer() {
        let mut archiver = Archiver::new(None, Duration::from_secs(5));
        let snapshot = sample_snapshot();

        let _ = archiver.try_archive(&snapshot).await;
        // Immediately after a failed cycle, the archiver is not due again.
        assert!(!archiver.is_due(Instant::now()));
        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(archiver.is_due(Instant::now()));
    }
}
