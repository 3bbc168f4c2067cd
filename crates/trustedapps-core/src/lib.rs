//! Configuration for trusted-apps request authentication.
//!
//! This crate owns the configuration surface consumed by the signing and
//! verification core: the local provider identity, the local key pair, the
//! set of trusted peer applications and the URL normalization flag.
//! Configuration is read from a JSON document and may be overridden by
//! environment variables.

mod config;
mod error;

pub use config::{AppEntry, ShireConfig, TrustedAppsConfig, TrustedAppsSection};
pub use error::{ConfigError, ConfigResult};
