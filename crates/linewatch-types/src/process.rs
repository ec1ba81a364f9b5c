//! The four monitored factory processes and their reading blocks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reading::{MetricReading, ProcessStatus};

// ---------------------------------------------------------------------------
// Process keys
// ---------------------------------------------------------------------------

/// One of the four monitored production processes.
///
/// The set is fixed: a snapshot is only complete when all four are present.
/// Serialized lowercase to match the producer's JSON keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Pultrusion line (die, resin, drive motor).
    Pultrusion,
    /// Encapsulation unit (core, motor, PSU, machine body).
    Encapsulation,
    /// Conforming stage (strands, motor, PSU, unit body).
    Conforming,
    /// Stranding stage (PSU, motor).
    Stranding,
}

impl Process {
    /// All four processes in wire order.
    pub const ALL: [Self; 4] = [
        Self::Pultrusion,
        Self::Encapsulation,
        Self::Conforming,
        Self::Stranding,
    ];

    /// Lowercase wire name of this process.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pultrusion => "pultrusion",
            Self::Encapsulation => "encapsulation",
            Self::Conforming => "conforming",
            Self::Stranding => "stranding",
        }
    }

    /// Parse a lowercase wire name back into a process key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pultrusion" => Some(Self::Pultrusion),
            "encapsulation" => Some(Self::Encapsulation),
            "conforming" => Some(Self::Conforming),
            "stranding" => Some(Self::Stranding),
            _ => None,
        }
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Process blocks
// ---------------------------------------------------------------------------

/// The readings for one process at one instant, with derived status.
///
/// The status field exists for serialization convenience only; it is
/// recomputed from the readings whenever a block is materialized via
/// [`ProcessBlock::new`]. Rule: `Warning` iff any contained reading's
/// value strictly exceeds its limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessBlock {
    /// Readings in wire order.
    pub readings: Vec<MetricReading>,
    /// Derived status (any reading over limit => `Warning`).
    pub status: ProcessStatus,
}

impl ProcessBlock {
    /// Build a block and derive its status from the readings.
    pub fn new(readings: Vec<MetricReading>) -> Self {
        let status = Self::derive_status(&readings);
        Self { readings, status }
    }

    /// Derive the block status: `Warning` iff any reading is over limit.
    pub fn derive_status(readings: &[MetricReading]) -> ProcessStatus {
        if readings.iter().any(|r| r.status().is_warning()) {
            ProcessStatus::Warning
        } else {
            ProcessStatus::Normal
        }
    }

    /// Look up a reading by its wire name.
    pub fn reading(&self, name: &str) -> Option<&MetricReading> {
        self.readings.iter().find(|r| r.name == name)
    }
}
