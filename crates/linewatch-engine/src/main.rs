//! Monitor binary for the Linewatch factory monitor.
//!
//! This is the main entry point that wires together the HTTP server,
//! the simulated reading source, and the batch archiver. It loads
//! configuration, initializes all subsystems, and runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `linewatch.yaml`
//! 3. Build the alarm-limit table with config overrides
//! 4. Connect to the table store (optional, archive degrades without it)
//! 5. Start the monitor HTTP server
//! 6. Spawn the archive loop
//! 7. Spawn the simulation loop
//! 8. Wait for Ctrl-C and shut down

mod config;
mod error;
mod simulator;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use linewatch_db::archiver::Archiver;
use linewatch_db::table_store::TableStorePool;
use linewatch_server::startup::spawn_server;
use linewatch_server::state::{AppState, SnapshotStore};
use linewatch_types::LimitTable;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::MonitorConfig;
use crate::error::EngineError;
use crate::simulator::{ReadingSource, SimulatedSource};

/// Default configuration file path, relative to the working directory.
const CONFIG_PATH: &str = "linewatch.yaml";

/// How often the archive loop wakes to check whether a cycle is due.
/// The archiver itself gates on its configured interval; ticking faster
/// here only bounds the wake-up latency.
const ARCHIVE_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Application entry point for the monitor.
///
/// Initializes all subsystems and runs until interrupted. Returns an
/// error code on startup failure.
///
/// # Errors
///
/// Returns an error if configuration loading or server startup fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("linewatch-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        archive_enabled = config.archive.enabled,
        archive_interval_secs = config.archive.interval_secs,
        simulation_enabled = config.simulation.enabled,
        "Configuration loaded"
    );

    // 3. Build the alarm-limit table.
    let mut limits = LimitTable::default();
    limits.apply_overrides(&config.limits);
    info!(override_count = config.limits.len(), "Limit table built");

    // 4. Connect to the table store. The monitor serves live data either
    //    way; without a pool the archiver no-ops and history returns 503.
    let pool = if config.archive.enabled {
        connect_table_store(config.archive.database_url.as_deref()).await
    } else {
        info!("Archiving disabled by configuration");
        None
    };

    // 5. Start the monitor HTTP server.
    let state = Arc::new(pool.as_ref().map_or_else(
        || AppState::new(limits.clone()),
        |p| AppState::with_archive(limits.clone(), p.clone()),
    ));
    let _server_handle = spawn_server(&config.server.host, config.server.port, Arc::clone(&state))
        .map_err(|e| EngineError::Server {
            message: format!("{e}"),
        })?;
    info!(port = config.server.port, "Monitor server started");

    // 6. Spawn the archive loop.
    if config.archive.enabled {
        let store = state.store.clone();
        let archiver = Archiver::new(
            pool.clone(),
            Duration::from_secs(config.archive.interval_secs),
        );
        tokio::spawn(run_archive_loop(archiver, store));
        info!(
            interval_secs = config.archive.interval_secs,
            "Archive loop started"
        );
    }

    // 7. Spawn the simulation loop.
    if config.simulation.enabled {
        let store = state.store.clone();
        let source = SimulatedSource::new(limits, config.simulation.seed);
        let tick = Duration::from_millis(config.simulation.tick_interval_ms);
        tokio::spawn(run_simulation_loop(source, store, tick));
        info!(
            tick_interval_ms = config.simulation.tick_interval_ms,
            seed = config.simulation.seed,
            "Simulation loop started"
        );
    } else {
        info!("Simulation disabled, awaiting pushed snapshots");
    }

    // 8. Wait for Ctrl-C.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    if let Some(p) = pool {
        p.close().await;
        info!("Table store pool closed");
    }

    Ok(())
}

/// Load `linewatch.yaml` if present, falling back to built-in defaults.
fn load_config() -> Result<MonitorConfig, EngineError> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        info!(path = CONFIG_PATH, "Loading configuration file");
        Ok(MonitorConfig::from_file(path)?)
    } else {
        info!(
            path = CONFIG_PATH,
            "No configuration file found, using defaults"
        );
        let mut config = MonitorConfig::default();
        config.archive.apply_env_overrides();
        Ok(config)
    }
}

/// Connect to the table store and run migrations.
///
/// Connection failures are logged and tolerated. The monitor keeps
/// serving live data; archive cycles report failure until a restart.
async fn connect_table_store(url: Option<&str>) -> Option<TableStorePool> {
    let Some(url) = url else {
        warn!("No table store URL configured, archiving disabled");
        return None;
    };

    match TableStorePool::connect_url(url).await {
        Ok(pool) => {
            if let Err(e) = pool.run_migrations().await {
                warn!(error = %e, "Table store migrations failed");
            }
            info!("Table store connected");
            Some(pool)
        }
        Err(e) => {
            warn!(error = %e, "Table store connection failed, archiving disabled");
            None
        }
    }
}

/// Archive loop. Wakes every [`ARCHIVE_POLL_INTERVAL`] and hands the
/// latest snapshot to the archiver, which applies its own interval gate.
async fn run_archive_loop(mut archiver: Archiver, store: SnapshotStore) {
    let mut ticker = tokio::time::interval(ARCHIVE_POLL_INTERVAL);
    loop {
        ticker.tick().await;
        if let Some(stored) = store.read().await {
            let outcome = archiver.try_archive(&stored.snapshot).await;
            tracing::trace!(?outcome, "Archive cycle");
        }
    }
}

/// Simulation loop. Generates a fresh snapshot every tick and publishes
/// it to the store, exactly as a push producer would.
async fn run_simulation_loop(
    mut source: SimulatedSource,
    store: SnapshotStore,
    tick: Duration,
) {
    let mut ticker = tokio::time::interval(tick);
    loop {
        ticker.tick().await;
        store.replace(source.produce()).await;
    }
}
