//! Server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_server`] which launches the monitor HTTP server on a
//! background Tokio task. The engine binary calls this during startup so
//! the API runs concurrently with the simulation and archive loops.
//!
//! # Usage
//!
//! ```rust,ignore
//! use linewatch_server::startup::spawn_server;
//! use linewatch_server::state::AppState;
//! use linewatch_types::LimitTable;
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(LimitTable::default()));
//! let handle = spawn_server("0.0.0.0", 8000, state)?;
//! // The server is now running. The handle can be awaited on shutdown.
//! ```

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the monitor server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the monitor HTTP server on a background Tokio task.
///
/// Binds to `{host}:{port}` and serves ingestion, polling, history, and
/// the dashboard page. Returns a [`JoinHandle`] so the caller can manage
/// the server's lifecycle alongside the other loops.
///
/// The server runs until the Tokio runtime is shut down or the task is
/// aborted. The caller should hold the returned handle and abort or
/// await it during clean shutdown.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is not parseable.
/// Obvious misconfigurations are caught here before the background task
/// is spawned; the actual bind happens inside [`crate::server::start_server`].
pub fn spawn_server(
    host: &str,
    port: u16,
    state: Arc<AppState>,
) -> Result<JoinHandle<()>, StartupError> {
    let config = ServerConfig {
        host: host.to_owned(),
        port,
    };

    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr = addr_str.parse().map_err(|e| {
        StartupError::Server(ServerError::Bind(format!("invalid address {addr_str}: {e}")))
    })?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state).await {
            tracing::error!(error = %e, "Monitor server exited with error");
        }
    });

    tracing::info!(port, "Monitor server spawned on background task");

    Ok(handle)
}
