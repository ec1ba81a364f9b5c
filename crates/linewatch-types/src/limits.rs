//! Per-metric alarm limits with built-in defaults.
//!
//! Limits are monitor-side configuration: the producer pushes bare values
//! and the monitor decides what counts as over-limit. The built-in table
//! covers all thirteen sensor points; deployments override individual
//! entries from the YAML configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::process::Process;

/// Fallback limit for a metric with no configured entry.
///
/// High enough that an unknown metric never raises a spurious `Warning`
/// while still bounding runaway values.
pub const DEFAULT_LIMIT: f64 = 100.0;

/// Alarm limits keyed by process and metric name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitTable {
    /// Limit entries, process -> metric name -> limit.
    limits: BTreeMap<Process, BTreeMap<String, f64>>,
}

impl LimitTable {
    /// Look up the limit for a metric, falling back to [`DEFAULT_LIMIT`].
    pub fn limit_for(&self, process: Process, metric: &str) -> f64 {
        self.limits
            .get(&process)
            .and_then(|m| m.get(metric))
            .copied()
            .unwrap_or(DEFAULT_LIMIT)
    }

    /// Set or replace the limit for one metric.
    pub fn set(&mut self, process: Process, metric: impl Into<String>, limit: f64) {
        self.limits
            .entry(process)
            .or_default()
            .insert(metric.into(), limit);
    }

    /// Apply configuration overrides keyed by lowercase process name.
    ///
    /// Unknown process names are skipped rather than rejected, so a stale
    /// config entry cannot stop the monitor.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, BTreeMap<String, f64>>) {
        for (name, metrics) in overrides {
            let Some(process) = Process::from_name(name) else {
                continue;
            };
            for (metric, limit) in metrics {
                self.set(process, metric.clone(), *limit);
            }
        }
    }
}

impl Default for LimitTable {
    /// Built-in limits for all thirteen sensor points.
    fn default() -> Self {
        let mut table = Self {
            limits: BTreeMap::new(),
        };

        table.set(Process::Pultrusion, "die_temp", 90.0);
        table.set(Process::Pultrusion, "resin_temp", 45.0);
        table.set(Process::Pultrusion, "motor_temp", 70.0);

        table.set(Process::Encapsulation, "core_temp", 85.0);
        table.set(Process::Encapsulation, "motor_temp", 70.0);
        table.set(Process::Encapsulation, "psu_temp", 60.0);
        table.set(Process::Encapsulation, "machine_temp", 50.0);

        table.set(Process::Conforming, "strands_temp", 80.0);
        table.set(Process::Conforming, "motor_temp", 70.0);
        table.set(Process::Conforming, "psu_temp", 60.0);
        table.set(Process::Conforming, "unit_temp", 50.0);

        table.set(Process::Stranding, "psu_temp", 60.0);
        table.set(Process::Stranding, "motor_temp", 70.0);

        table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_table_covers_die_temp() {
        let table = LimitTable::default();
        assert_eq!(table.limit_for(Process::Pultrusion, "die_temp"), 90.0);
    }

    #[test]
    fn unknown_metric_falls_back_to_default_limit() {
        let table = LimitTable::default();
        assert_eq!(
            table.limit_for(Process::Pultrusion, "bearing_temp"),
            DEFAULT_LIMIT
        );
    }

    #[test]
    fn overrides_replace_defaults() {
        let mut table = LimitTable::default();
        let mut overrides = BTreeMap::new();
        let mut pultrusion = BTreeMap::new();
        pultrusion.insert("die_temp".to_owned(), 92.5);
        overrides.insert("pultrusion".to_owned(), pultrusion);

        table.apply_overrides(&overrides);
        assert_eq!(table.limit_for(Process::Pultrusion, "die_temp"), 92.5);
        // Untouched entries keep their defaults.
        assert_eq!(table.limit_for(Process::Pultrusion, "resin_temp"), 45.0);
    }

    #[test]
    fn overrides_ignore_unknown_process_names() {
        let mut table = LimitTable::default();
        let mut overrides = BTreeMap::new();
        let mut bogus = BTreeMap::new();
        bogus.insert("die_temp".to_owned(), 1.0);
        overrides.insert("extrusion".to_owned(), bogus);

        table.apply_overrides(&overrides);
        assert_eq!(table.limit_for(Process::Pultrusion, "die_temp"), 90.0);
    }
}
