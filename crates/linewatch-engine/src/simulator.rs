//! Simulated reading source for running the monitor without a producer.
//!
//! [`ReadingSource`] abstracts over whatever produces new sensor values;
//! the generative ingestion mode drives one on a fixed tick and feeds the
//! result into the same snapshot store the push endpoint writes to.
//! [`SimulatedSource`] synthesizes values that hover below each metric's
//! alarm limit with occasional over-limit excursions, so Warning states
//! actually show up on the dashboard.

use linewatch_types::{FactorySnapshot, LimitTable, MetricReading, Process, ProcessBlock};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Fraction of the alarm limit the simulated values hover around.
const BASELINE_FRACTION: f64 = 0.85;

/// Jitter band around the baseline, in degrees.
const JITTER: f64 = 3.0;

/// Per-reading chance (out of 100) of an over-limit excursion.
const EXCURSION_PERCENT: u32 = 3;

/// Metric names per process, in wire order.
const PROCESS_METRICS: [(Process, &[&str]); 4] = [
    (Process::Pultrusion, &["die_temp", "resin_temp", "motor_temp"]),
    (
        Process::Encapsulation,
        &["core_temp", "motor_temp", "psu_temp", "machine_temp"],
    ),
    (
        Process::Conforming,
        &["strands_temp", "motor_temp", "psu_temp", "unit_temp"],
    ),
    (Process::Stranding, &["psu_temp", "motor_temp"]),
];

/// Whatever produces new sensor values, real or synthetic.
///
/// Generation always succeeds structurally (a source builds a complete
/// snapshot by construction); transport and scheduling failures belong to
/// the caller.
pub trait ReadingSource {
    /// Synthesize or fetch the next complete factory snapshot.
    fn produce(&mut self) -> FactorySnapshot;
}

/// Reading source backed by a seeded random number generator.
#[derive(Debug)]
pub struct SimulatedSource {
    rng: SmallRng,
    limits: LimitTable,
}

impl SimulatedSource {
    /// Create a source. A fixed seed gives a reproducible run; `None`
    /// seeds from the operating system.
    pub fn new(limits: LimitTable, seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        Self { rng, limits }
    }

    /// One jittered value for a metric with the given alarm limit.
    fn next_value(&mut self, limit: f64) -> f64 {
        if self.rng.random_range(0..100) < EXCURSION_PERCENT {
            return limit + self.rng.random_range(0.5..5.0);
        }
        limit * BASELINE_FRACTION + self.rng.random_range(-JITTER..JITTER)
    }
}

impl ReadingSource for SimulatedSource {
    fn produce(&mut self) -> FactorySnapshot {
        let mut processes = std::collections::BTreeMap::new();

        for (process, metrics) in PROCESS_METRICS {
            let readings = metrics
                .iter()
                .map(|name| {
                    let limit = self.limits.limit_for(process, name);
                    MetricReading::new(*name, self.next_value(limit), limit)
                })
                .collect();
            processes.insert(process, ProcessBlock::new(readings));
        }

        FactorySnapshot::new(processes)
    }
}
