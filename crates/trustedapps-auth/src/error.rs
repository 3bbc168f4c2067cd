//! Error and rejection types.
//!
//! [`TrustedAppsError`] covers failures of the building blocks (decoding keys
//! and certificates, signing, configuration). [`Rejection`] is the closed set
//! of reasons a request carrying a certificate is refused; every variant has
//! a stable machine-readable [`Rejection::id`].

use trustedapps_core::ConfigError;

/// Errors raised by key, certificate and signing operations.
#[derive(Debug, thiserror::Error)]
pub enum TrustedAppsError {
    /// Key material is not valid base64, not valid DER, or not an RSA key.
    #[error("invalid key format: {0}")]
    KeyFormat(String),

    /// A certificate is not valid base64 or lacks the timestamp separator.
    #[error("invalid certificate format: {0}")]
    CertificateFormat(String),

    /// The signing primitive refused to sign the payload.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The configuration could not be loaded or is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convenience result type for trusted-apps operations.
pub type TrustedAppsResult<T> = Result<T, TrustedAppsError>;

/// Why a request that presented trusted-app headers was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// No certificate header, and the adapter requires one.
    #[error("No trusted apps certificate found")]
    NoCertificate,

    /// A certificate was presented without a provider id.
    #[error("Provider ID not found in request")]
    NoProviderId,

    /// The provider id is not in the trust registry.
    #[error("Unknown application: {0}")]
    UnknownApp(String),

    /// A certificate was presented without a signature.
    #[error("Missing signature in request")]
    NoSignature,

    /// The signature does not match the payload rebuilt for this URL, or the
    /// certificate could not be decoded.
    #[error("Bad signature for URL: {url}")]
    BadSignature {
        /// The canonical URL the signature was checked against.
        url: String,
    },
}

impl Rejection {
    /// Stable identifier reported to clients.
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::NoCertificate => "no-certificate",
            Self::NoProviderId => "no-provider-id",
            Self::UnknownApp(_) => "unknown-app",
            Self::NoSignature => "no-signature",
            Self::BadSignature { .. } => "bad-signature",
        }
    }

    /// Human-readable message reported to clients.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}
