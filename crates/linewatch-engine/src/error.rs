//! Error types for the monitor binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during monitor startup.

/// Top-level error for the monitor binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// HTTP server failed to start.
    #[error("server error: {message}")]
    Server {
        /// Description of the server failure.
        message: String,
    },
}
