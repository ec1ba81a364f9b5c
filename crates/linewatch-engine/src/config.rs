//! Configuration loading and typed config structures for the monitor.
//!
//! The canonical configuration lives in `linewatch.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level monitor configuration.
///
/// Mirrors the structure of `linewatch.yaml`. All fields have defaults so
/// the monitor runs out of the box with no file at all.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonitorConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Batch-archiver settings.
    #[serde(default)]
    pub archive: ArchiveSection,

    /// Simulated reading source settings.
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Alarm-limit overrides, process name -> metric name -> limit.
    #[serde(default)]
    pub limits: BTreeMap<String, BTreeMap<String, f64>>,
}

impl MonitorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for infrastructure:
    /// - `DATABASE_URL` overrides `archive.database_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.archive.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.archive.apply_env_overrides();
        Ok(config)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Batch-archiver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArchiveSection {
    /// Whether the archive loop runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Table-store connection URL. When absent (and `DATABASE_URL` is
    /// unset) the archiver runs with no client and every cycle is a
    /// no-op failure.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Seconds between archive cycles.
    #[serde(default = "default_archive_interval_secs")]
    pub interval_secs: u64,
}

impl ArchiveSection {
    /// Apply environment-variable overrides for infrastructure URLs.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database_url = Some(url);
            }
        }
    }
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            database_url: None,
            interval_secs: default_archive_interval_secs(),
        }
    }
}

/// Simulated reading source configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSection {
    /// Whether the simulation loop runs. When disabled the monitor only
    /// accepts pushed snapshots.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Real-time milliseconds between generated snapshots.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Random seed for reproducible runs. Absent means seeded from the
    /// operating system.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

const fn default_true() -> bool {
    true
}

const fn default_archive_interval_secs() -> u64 {
    5
}

const fn default_tick_interval_ms() -> u64 {
    500
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = MonitorConfig::parse("{}").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.archive.interval_secs, 5);
        assert!(config.simulation.enabled);
        assert!(config.limits.is_empty());
    }

    #[test]
    fn yaml_overrides_selected_fields() {
        let yaml = r"
server:
  port: 9000
archive:
  interval_secs: 30
simulation:
  enabled: false
  seed: 42
limits:
  pultrusion:
    die_temp: 92.5
";
        let config = MonitorConfig::parse(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.archive.interval_secs, 30);
        assert!(!config.simulation.enabled);
        assert_eq!(config.simulation.seed, Some(42));
        assert_eq!(config.limits["pultrusion"]["die_temp"], 92.5);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(MonitorConfig::parse("server: [not a map").is_err());
    }
}
