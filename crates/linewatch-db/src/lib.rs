//! Table-store layer for the Linewatch factory monitor.
//!
//! `PostgreSQL` is the historical store: every archive cycle flattens the
//! current factory snapshot into per-reading rows and batch-inserts them
//! into the `sensor_data` table. The live snapshot itself never lives
//! here -- freshness is served from the in-process snapshot store, and
//! this crate only records history.
//!
//! # Architecture
//!
//! ```text
//! Archive cycle (every interval)
//!   |
//!   +-- read current snapshot (in-process)
//!   +-- ArchiveRow::flatten()          --> one row per reading, 2 dp
//!   +-- SensorDataStore::batch_insert() --> sensor_data table, one txn
//! ```
//!
//! # Modules
//!
//! - [`table_store`] -- `PostgreSQL` connection pool and configuration
//! - [`sensor_store`] -- Batch row insertion and time-ranged querying
//! - [`archiver`] -- Interval-gated batch archiver state machine
//! - [`error`] -- Shared error types

pub mod archiver;
pub mod error;
pub mod sensor_store;
pub mod table_store;

// Re-export primary types for convenience.
pub use archiver::{ArchiveOutcome, ArchiveRow, Archiver};
pub use error::DbError;
pub use sensor_store::{SensorDataRow, SensorDataStore};
pub use table_store::{TableStoreConfig, TableStorePool};
