//! Monitor API server for the Linewatch factory monitor.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Ingestion endpoint** (`POST /api/upload`) accepting complete factory
//!   snapshots from a push producer
//! - **Poll endpoint** (`GET /api/status`) serving the latest snapshot plus
//!   its freshness timestamp to any number of polling clients
//! - **History endpoint** (`GET /api/history`) querying archived readings
//!   from the table store
//! - **Dashboard page** (`GET /`) polling the status endpoint at 1 s
//!
//! # Architecture
//!
//! All reads are served from the in-memory [`SnapshotStore`], a single
//! atomically-replaced slot. Consumers copy out under the lock and then
//! operate without it, so a slow poll response or a stalled archive write
//! never blocks ingestion. Last-write-wins: slow pollers may skip
//! intermediate snapshots -- freshness over completeness.
//!
//! [`SnapshotStore`]: state::SnapshotStore

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::spawn_server;
pub use state::{AppState, SnapshotStore, StoredSnapshot, WAITING_FOR_SIGNAL};
