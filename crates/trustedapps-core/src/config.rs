//! Trusted-apps configuration model.
//!
//! The on-disk format is a JSON document:
//!
//! ```json
//! {
//!   "shire": { "providerId": "my-app" },
//!   "trustedApps": {
//!     "publicKey": "<base64 DER>",
//!     "privateKey": "<base64 DER>",
//!     "apps": { "other-app": { "publicKey": "<base64 DER>" } }
//!   },
//!   "allowMultipleProtocolsInURL": false
//! }
//! ```
//!
//! Environment variables override individual fields, see
//! [`TrustedAppsConfig::from_env`].

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Path of a JSON config file to load before applying overrides.
pub const ENV_CONFIG_PATH: &str = "TRUSTED_APPS_CONFIG";
/// Overrides `shire.providerId`.
pub const ENV_PROVIDER_ID: &str = "TRUSTED_APPS_PROVIDER_ID";
/// Overrides `trustedApps.publicKey`.
pub const ENV_PUBLIC_KEY: &str = "TRUSTED_APPS_PUBLIC_KEY";
/// Overrides `trustedApps.privateKey`.
pub const ENV_PRIVATE_KEY: &str = "TRUSTED_APPS_PRIVATE_KEY";
/// Overrides `allowMultipleProtocolsInURL`.
pub const ENV_ALLOW_MULTIPLE_PROTOCOLS: &str = "TRUSTED_APPS_ALLOW_MULTIPLE_PROTOCOLS";

/// Complete trusted-apps configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedAppsConfig {
    /// Local application identity.
    pub shire: ShireConfig,
    /// Local key pair and the peers this process trusts.
    pub trusted_apps: TrustedAppsSection,
    /// Repair `scheme:/host` into `scheme://host` when canonicalizing URLs.
    #[serde(rename = "allowMultipleProtocolsInURL", default)]
    pub allow_multiple_protocols_in_url: bool,
}

/// The `shire` section: who this process is.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShireConfig {
    /// Provider id this process signs outgoing requests as.
    pub provider_id: String,
}

/// The `trustedApps` section.
#[derive(Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedAppsSection {
    /// Base64 DER public key of this process.
    pub public_key: String,
    /// Base64 DER private key of this process.
    pub private_key: String,
    /// Peer applications keyed by provider id.
    #[serde(default)]
    pub apps: BTreeMap<String, AppEntry>,
}

impl fmt::Debug for TrustedAppsSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedAppsSection")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("apps", &self.apps)
            .finish()
    }
}

/// A configured peer application.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppEntry {
    /// Base64 DER public key of the peer.
    pub public_key: String,
}

impl TrustedAppsConfig {
    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded trusted apps config file");
        Self::from_json_str(&raw)
    }

    /// Load configuration from the process environment.
    ///
    /// If `TRUSTED_APPS_CONFIG` names a file it is loaded first; the
    /// `TRUSTED_APPS_PROVIDER_ID`, `TRUSTED_APPS_PUBLIC_KEY`,
    /// `TRUSTED_APPS_PRIVATE_KEY` and `TRUSTED_APPS_ALLOW_MULTIPLE_PROTOCOLS`
    /// variables are then applied on top.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        let mut config = match lookup(ENV_CONFIG_PATH) {
            Some(path) => {
                let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone().into(),
                    source,
                })?;
                serde_json::from_str(&raw)?
            }
            None => Self::default(),
        };

        if let Some(v) = lookup(ENV_PROVIDER_ID) {
            config.shire.provider_id = v;
        }
        if let Some(v) = lookup(ENV_PUBLIC_KEY) {
            config.trusted_apps.public_key = v;
        }
        if let Some(v) = lookup(ENV_PRIVATE_KEY) {
            config.trusted_apps.private_key = v;
        }
        if let Some(v) = lookup(ENV_ALLOW_MULTIPLE_PROTOCOLS) {
            config.allow_multiple_protocols_in_url = v == "1" || v.eq_ignore_ascii_case("true");
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the local identity is complete.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.shire.provider_id.trim().is_empty() {
            return Err(ConfigError::Invalid("shire.providerId is empty".to_owned()));
        }
        if self.trusted_apps.public_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "trustedApps.publicKey is empty".to_owned(),
            ));
        }
        if self.trusted_apps.private_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "trustedApps.privateKey is empty".to_owned(),
            ));
        }
        if let Some((id, _)) = self
            .trusted_apps
            .apps
            .iter()
            .find(|(_, app)| app.public_key.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "trustedApps.apps.{id}.publicKey is empty"
            )));
        }
        Ok(())
    }
}
