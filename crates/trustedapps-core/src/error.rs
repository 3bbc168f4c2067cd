//! Error types for trusted-apps configuration.

use std::path::PathBuf;

/// Errors raised while loading or validating a [`crate::TrustedAppsConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid JSON or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Convenience result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
