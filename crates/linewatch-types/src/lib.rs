//! Shared type definitions for the Linewatch factory monitor.
//!
//! This crate is the single source of truth for the data model used across
//! the Linewatch workspace: metric readings, process blocks, factory
//! snapshots, alarm limits, and the wire-format upload payload.
//!
//! # Modules
//!
//! - [`reading`] -- Metric readings and the threshold status classifier
//! - [`process`] -- The four monitored processes and their reading blocks
//! - [`snapshot`] -- The full-factory snapshot replaced wholesale on ingest
//! - [`limits`] -- Per-metric alarm limits with built-in defaults
//! - [`wire`] -- Upload payload mirroring the producer's JSON shape

pub mod limits;
pub mod process;
pub mod reading;
pub mod snapshot;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use limits::LimitTable;
pub use process::{Process, ProcessBlock};
pub use reading::{classify, MetricReading, ProcessStatus, DEFAULT_UNIT};
pub use snapshot::FactorySnapshot;
pub use wire::{
    ConformingReadings, EncapsulationReadings, PultrusionReadings, StrandingReadings,
    UploadPayload, ValidationError,
};
