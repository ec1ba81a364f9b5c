//! Metric readings and the threshold status classifier.
//!
//! A [`MetricReading`] pairs a measured value with the alarm limit it is
//! judged against. [`classify`] is the single place that judgement happens;
//! every derived status in the system comes from it.

use serde::{Deserialize, Serialize};

/// Unit attached to a reading when the producer does not supply one.
pub const DEFAULT_UNIT: &str = "°C";

/// Qualitative status derived from a reading or a block of readings.
///
/// Status is never stored independently of the values it was derived
/// from -- it is recomputed whenever a block is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// All readings are at or below their limits.
    Normal,
    /// At least one reading exceeds its limit.
    Warning,
}

impl ProcessStatus {
    /// Whether this status indicates an over-limit condition.
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::Warning)
    }
}

/// Classify a measured value against its alarm limit.
///
/// Strict comparison: `value == limit` is still [`ProcessStatus::Normal`].
/// Pure and total -- non-finite inputs compare like any other `f64`, but
/// payload validation rejects them before they reach this point.
pub fn classify(value: f64, limit: f64) -> ProcessStatus {
    if value > limit {
        ProcessStatus::Warning
    } else {
        ProcessStatus::Normal
    }
}

/// One sensor measurement together with the limit it is judged against.
///
/// Immutable once created: ingestion replaces whole snapshots, never
/// individual readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    /// Metric name as it appears on the wire (e.g. `die_temp`).
    pub name: String,
    /// Measured value.
    pub value: f64,
    /// Alarm limit the value is compared against.
    pub limit: f64,
    /// Engineering unit, defaulting to `°C`.
    #[serde(default = "default_unit")]
    pub unit: String,
}

impl MetricReading {
    /// Create a reading with the default unit.
    pub fn new(name: impl Into<String>, value: f64, limit: f64) -> Self {
        Self {
            name: name.into(),
            value,
            limit,
            unit: default_unit(),
        }
    }

    /// Classify this reading's value against its limit.
    pub fn status(&self) -> ProcessStatus {
        classify(self.value, self.limit)
    }
}

/// Serde default for [`MetricReading::unit`].
fn default_unit() -> String {
    DEFAULT_UNIT.to_owned()
}
