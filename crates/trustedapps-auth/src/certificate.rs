//! Certificate codec.
//!
//! A certificate is the caller's identity claim, carried as a bearer token:
//!
//! ```text
//! base64( <timestamp> "\n" <username> )
//! ```
//!
//! Decoding splits on the first newline, so the timestamp must not contain
//! one. The username is everything after the separator and may contain
//! further newlines.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{TrustedAppsError, TrustedAppsResult};

const SEPARATOR: char = '\n';

/// A decoded certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// Issuance timestamp as sent by the caller. Never interpreted.
    pub timestamp: String,
    /// The username the caller acts on behalf of.
    pub username: String,
}

impl Certificate {
    /// Create a certificate from its fields.
    pub fn new(timestamp: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            username: username.into(),
        }
    }

    /// Encode this certificate for the wire.
    pub fn encode(&self) -> TrustedAppsResult<String> {
        encode_certificate(&self.timestamp, &self.username)
    }
}

/// Encode a timestamp and username into a certificate token.
///
/// # Errors
///
/// Returns [`TrustedAppsError::CertificateFormat`] if the timestamp contains
/// the newline separator, which would make the token decode differently.
///
/// # Examples
///
/// ```
/// use trustedapps_auth::certificate::encode_certificate;
///
/// let cert = encode_certificate("1445422338123", "bob").unwrap();
/// assert_eq!(cert, "MTQ0NTQyMjMzODEyMwpib2I=");
/// ```
pub fn encode_certificate(timestamp: &str, username: &str) -> TrustedAppsResult<String> {
    if timestamp.contains(SEPARATOR) {
        return Err(TrustedAppsError::CertificateFormat(
            "timestamp must not contain a newline".to_owned(),
        ));
    }
    Ok(BASE64.encode(format!("{timestamp}{SEPARATOR}{username}")))
}

/// Decode a certificate token.
///
/// # Errors
///
/// Returns [`TrustedAppsError::CertificateFormat`] if the token is not valid
/// base64, not UTF-8, or has no separator.
pub fn decode_certificate(certificate: &str) -> TrustedAppsResult<Certificate> {
    let raw = BASE64
        .decode(certificate.trim())
        .map_err(|e| TrustedAppsError::CertificateFormat(format!("invalid base64: {e}")))?;
    let text = String::from_utf8(raw)
        .map_err(|_| TrustedAppsError::CertificateFormat("not valid UTF-8".to_owned()))?;
    let (timestamp, username) = text
        .split_once(SEPARATOR)
        .ok_or_else(|| TrustedAppsError::CertificateFormat("missing separator".to_owned()))?;

    Ok(Certificate::new(timestamp, username))
}
