//! Upload payload mirroring the producer's JSON shape.
//!
//! The push producer sends one flat object per process with named
//! temperature fields plus its own idea of a status string. The monitor
//! accepts the shape verbatim, validates that every value is a finite
//! number, and converts it into the generic [`FactorySnapshot`] model.
//! The pushed `status` strings are discarded -- status is always
//! recomputed from values and limits on this side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::limits::LimitTable;
use crate::process::{Process, ProcessBlock};
use crate::reading::MetricReading;
use crate::snapshot::FactorySnapshot;

/// Errors raised when an upload payload fails validation.
///
/// Validation happens before the snapshot store is touched: a rejected
/// payload leaves the current snapshot unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A sensor value was NaN or infinite.
    #[error("non-finite value for {field}")]
    NonFinite {
        /// Dotted path of the offending field (e.g. `pultrusion.die_temp`).
        field: String,
    },
}

// ---------------------------------------------------------------------------
// Per-process wire objects
// ---------------------------------------------------------------------------

/// Pultrusion line readings as pushed by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PultrusionReadings {
    /// Die temperature.
    pub die_temp: f64,
    /// Resin bath temperature.
    pub resin_temp: f64,
    /// Drive motor temperature.
    pub motor_temp: f64,
    /// Producer-side status string; accepted and discarded.
    #[serde(default)]
    pub status: Option<String>,
}

/// Encapsulation unit readings as pushed by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncapsulationReadings {
    /// Core temperature.
    pub core_temp: f64,
    /// Motor temperature.
    pub motor_temp: f64,
    /// Power supply temperature.
    pub psu_temp: f64,
    /// Machine body temperature.
    pub machine_temp: f64,
    /// Producer-side status string; accepted and discarded.
    #[serde(default)]
    pub status: Option<String>,
}

/// Conforming stage readings as pushed by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConformingReadings {
    /// Strand bundle temperature.
    pub strands_temp: f64,
    /// Motor temperature.
    pub motor_temp: f64,
    /// Power supply temperature.
    pub psu_temp: f64,
    /// Unit body temperature.
    pub unit_temp: f64,
    /// Producer-side status string; accepted and discarded.
    #[serde(default)]
    pub status: Option<String>,
}

/// Stranding stage readings as pushed by the producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrandingReadings {
    /// Power supply temperature.
    pub psu_temp: f64,
    /// Motor temperature.
    pub motor_temp: f64,
    /// Producer-side status string; accepted and discarded.
    #[serde(default)]
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Full payload
// ---------------------------------------------------------------------------

/// The complete push payload: all four processes plus an optional camera
/// frame.
///
/// Deserialization enforces presence of all four process keys; a partial
/// update is not representable on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    /// Pultrusion line readings.
    pub pultrusion: PultrusionReadings,
    /// Encapsulation unit readings.
    pub encapsulation: EncapsulationReadings,
    /// Conforming stage readings.
    pub conforming: ConformingReadings,
    /// Stranding stage readings.
    pub stranding: StrandingReadings,
    /// Optional camera frame, base64-encoded, passed through opaquely.
    #[serde(default)]
    pub image_base64: Option<String>,
}

impl UploadPayload {
    /// Check that every sensor value is a finite number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFinite`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in self.values() {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    field: field.to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Convert into the generic snapshot model, attaching limits from the
    /// monitor-side table and deriving each block's status.
    ///
    /// The producer's `status` strings are not consulted.
    pub fn into_snapshot(self, limits: &LimitTable) -> FactorySnapshot {
        let mut processes = BTreeMap::new();

        for process in Process::ALL {
            let readings = self
                .process_values(process)
                .into_iter()
                .map(|(name, value)| {
                    MetricReading::new(name, value, limits.limit_for(process, name))
                })
                .collect();
            processes.insert(process, ProcessBlock::new(readings));
        }

        let mut snapshot = FactorySnapshot::new(processes);
        snapshot.image_base64 = self.image_base64;
        snapshot
    }

    /// All sensor values with their dotted field paths, in wire order.
    fn values(&self) -> [(&'static str, f64); 13] {
        [
            ("pultrusion.die_temp", self.pultrusion.die_temp),
            ("pultrusion.resin_temp", self.pultrusion.resin_temp),
            ("pultrusion.motor_temp", self.pultrusion.motor_temp),
            ("encapsulation.core_temp", self.encapsulation.core_temp),
            ("encapsulation.motor_temp", self.encapsulation.motor_temp),
            ("encapsulation.psu_temp", self.encapsulation.psu_temp),
            ("encapsulation.machine_temp", self.encapsulation.machine_temp),
            ("conforming.strands_temp", self.conforming.strands_temp),
            ("conforming.motor_temp", self.conforming.motor_temp),
            ("conforming.psu_temp", self.conforming.psu_temp),
            ("conforming.unit_temp", self.conforming.unit_temp),
            ("stranding.psu_temp", self.stranding.psu_temp),
            ("stranding.motor_temp", self.stranding.motor_temp),
        ]
    }

    /// Sensor values for one process, in wire order.
    fn process_values(&self, process: Process) -> Vec<(&'static str, f64)> {
        match process {
            Process::Pultrusion => vec![
                ("die_temp", self.pultrusion.die_temp),
                ("resin_temp", self.pultrusion.resin_temp),
                ("motor_temp", self.pultrusion.motor_temp),
            ],
            Process::Encapsulation => vec![
                ("core_temp", self.encapsulation.core_temp),
                ("motor_temp", self.encapsulation.motor_temp),
                ("psu_temp", self.encapsulation.psu_temp),
                ("machine_temp", self.encapsulation.machine_temp),
            ],
            Process::Conforming => vec![
                ("strands_temp", self.conforming.strands_temp),
                ("motor_temp", self.conforming.motor_temp),
                ("psu_temp", self.conforming.psu_temp),
                ("unit_temp", self.conforming.unit_temp),
            ],
            Process::Stranding => vec![
                ("psu_temp", self.stranding.psu_temp),
                ("motor_temp", self.stranding.motor_temp),
            ],
        }
    }
}
