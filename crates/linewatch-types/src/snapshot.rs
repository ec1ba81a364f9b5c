//! The full-factory snapshot replaced wholesale on every ingest.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::process::{Process, ProcessBlock};

/// A complete, internally consistent set of readings for all monitored
/// processes at one instant.
///
/// Snapshots are replaced wholesale, never partially mutated: an update
/// always supplies all four processes. The camera payload is carried as
/// the opaque base64 string the producer sent; it is never decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorySnapshot {
    /// Process blocks keyed by process (all four keys when complete).
    pub processes: BTreeMap<Process, ProcessBlock>,
    /// Optional camera frame, base64-encoded, passed through opaquely.
    #[serde(default)]
    pub image_base64: Option<String>,
    /// When the readings were captured. Stamped at acceptance if the
    /// producer did not supply one.
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
}

impl FactorySnapshot {
    /// Build a snapshot from its process blocks, with no camera frame
    /// and no capture timestamp.
    pub fn new(processes: BTreeMap<Process, ProcessBlock>) -> Self {
        Self {
            processes,
            image_base64: None,
            captured_at: None,
        }
    }

    /// Whether all four process keys are present.
    pub fn is_complete(&self) -> bool {
        Process::ALL.iter().all(|p| self.processes.contains_key(p))
    }

    /// Total number of readings across all processes.
    pub fn reading_count(&self) -> usize {
        self.processes.values().map(|b| b.readings.len()).sum()
    }

    /// Look up the block for a process.
    pub fn block(&self, process: Process) -> Option<&ProcessBlock> {
        self.processes.get(&process)
    }
}
