//! Trust registry: which provider ids this process accepts, and their keys.
//!
//! The registry is built once at startup and only read afterwards. It always
//! contains the local provider id mapped to the local public key, so a
//! process accepts requests it signed itself regardless of what the
//! configured app list says.

use std::collections::HashMap;
use std::sync::Arc;

use rsa::RsaPublicKey;
use tracing::{info, warn};

use crate::error::{TrustedAppsError, TrustedAppsResult};
use crate::keys::decode_public_key;

/// A peer application and its public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedApp {
    /// The provider id the peer signs as.
    pub provider_id: String,
    /// The peer's public key, as configured (base64 DER).
    pub encoded_public_key: String,
    /// The decoded public key.
    pub public_key: RsaPublicKey,
}

impl TrustedApp {
    /// Decode a trusted app from its configured key.
    ///
    /// # Errors
    ///
    /// Returns [`TrustedAppsError::KeyFormat`] naming the provider id if the
    /// key cannot be decoded.
    pub fn from_encoded(
        provider_id: impl Into<String>,
        encoded_public_key: impl Into<String>,
    ) -> TrustedAppsResult<Self> {
        let provider_id = provider_id.into();
        let encoded_public_key = encoded_public_key.into();
        let public_key = decode_public_key(&encoded_public_key).map_err(|e| {
            TrustedAppsError::KeyFormat(format!("trusted app {provider_id}: {e}"))
        })?;
        Ok(Self {
            provider_id,
            encoded_public_key,
            public_key,
        })
    }
}

/// Lookup of trusted applications by provider id.
///
/// Implementations must be read-only once requests are being served.
pub trait TrustedAppProvider: Send + Sync {
    /// Find the trusted app for `provider_id`, or `None` if it is unknown.
    fn lookup(&self, provider_id: &str) -> Option<Arc<TrustedApp>>;
}

/// In-memory trust registry.
///
/// Only [`TrustRegistry::initialize`] builds one, so it always holds the
/// local identity.
#[derive(Debug, Clone)]
pub struct TrustRegistry {
    apps: HashMap<String, Arc<TrustedApp>>,
}

impl TrustRegistry {
    /// Build the registry from configured apps and force-insert the local
    /// identity.
    ///
    /// An entry in `initial_apps` for `self_provider_id` is replaced by the
    /// local public key.
    ///
    /// # Errors
    ///
    /// Returns [`TrustedAppsError::KeyFormat`] if any key fails to decode.
    pub fn initialize<I, K, V>(
        self_provider_id: &str,
        self_public_key: &str,
        initial_apps: I,
    ) -> TrustedAppsResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut apps = HashMap::new();
        for (provider_id, public_key) in initial_apps {
            let provider_id = provider_id.into();
            if provider_id == self_provider_id {
                warn!(
                    provider_id = %provider_id,
                    "configured trusted app is replaced by the local identity"
                );
                continue;
            }
            let app = TrustedApp::from_encoded(provider_id.clone(), public_key)?;
            apps.insert(provider_id, Arc::new(app));
        }

        let own = TrustedApp::from_encoded(self_provider_id, self_public_key)?;
        apps.insert(self_provider_id.to_owned(), Arc::new(own));

        info!(
            self_provider_id,
            trusted_apps = apps.len(),
            "initialized trust registry"
        );

        Ok(Self { apps })
    }

    /// Number of trusted apps, including the local one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    /// Whether the registry is empty. Never true after [`Self::initialize`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

impl TrustedAppProvider for TrustRegistry {
    fn lookup(&self, provider_id: &str) -> Option<Arc<TrustedApp>> {
        self.apps.get(provider_id).cloned()
    }
}
