//! Key codec: transport-friendly encoded keys to RSA key objects.
//!
//! Keys travel as base64 of their DER encoding. Public keys are expected as
//! X.509 `SubjectPublicKeyInfo`, private keys as PKCS#8 `PrivateKeyInfo`;
//! the bare PKCS#1 structures are accepted as a fallback for both.
//!
//! ```text
//! base64 ──decode──> DER ──parse──> RsaPublicKey / RsaPrivateKey
//! ```

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

use crate::error::{TrustedAppsError, TrustedAppsResult};

/// Decode a base64 DER public key.
///
/// # Errors
///
/// Returns [`TrustedAppsError::KeyFormat`] if the input is not base64 or the
/// DER is neither an SPKI nor a PKCS#1 RSA public key.
pub fn decode_public_key(encoded: &str) -> TrustedAppsResult<RsaPublicKey> {
    let der = decode_base64(encoded)?;
    RsaPublicKey::from_public_key_der(&der)
        .or_else(|spki_err| {
            RsaPublicKey::from_pkcs1_der(&der).map_err(|_| {
                TrustedAppsError::KeyFormat(format!("malformed public key: {spki_err}"))
            })
        })
}

/// Decode a base64 DER private key.
///
/// # Errors
///
/// Returns [`TrustedAppsError::KeyFormat`] if the input is not base64 or the
/// DER is neither a PKCS#8 nor a PKCS#1 RSA private key.
pub fn decode_private_key(encoded: &str) -> TrustedAppsResult<RsaPrivateKey> {
    let der = decode_base64(encoded)?;
    RsaPrivateKey::from_pkcs8_der(&der).or_else(|pkcs8_err| {
        RsaPrivateKey::from_pkcs1_der(&der).map_err(|_| {
            TrustedAppsError::KeyFormat(format!("malformed private key: {pkcs8_err}"))
        })
    })
}

/// Encode a public key as base64 SPKI DER.
///
/// # Errors
///
/// Returns [`TrustedAppsError::KeyFormat`] if DER serialization fails.
pub fn encode_public_key(key: &RsaPublicKey) -> TrustedAppsResult<String> {
    let der = key
        .to_public_key_der()
        .map_err(|e| TrustedAppsError::KeyFormat(e.to_string()))?;
    Ok(BASE64.encode(der.as_bytes()))
}

/// Encode a private key as base64 PKCS#8 DER.
///
/// # Errors
///
/// Returns [`TrustedAppsError::KeyFormat`] if DER serialization fails.
pub fn encode_private_key(key: &RsaPrivateKey) -> TrustedAppsResult<String> {
    let der = key
        .to_pkcs8_der()
        .map_err(|e| TrustedAppsError::KeyFormat(e.to_string()))?;
    Ok(BASE64.encode(der.as_bytes()))
}

/// Base64 decode, ignoring embedded whitespace (keys are often wrapped).
fn decode_base64(encoded: &str) -> TrustedAppsResult<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(TrustedAppsError::KeyFormat("empty key".to_owned()));
    }
    BASE64
        .decode(compact.as_bytes())
        .map_err(|e| TrustedAppsError::KeyFormat(format!("invalid base64: {e}")))
}

/// The key pair a process signs its own outgoing requests with.
///
/// Built once at startup; there is no way to replace the keys of an
/// existing pair.
#[derive(Clone)]
pub struct KeyPair {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl KeyPair {
    /// Decode a key pair from its base64 DER parts.
    ///
    /// # Errors
    ///
    /// Returns [`TrustedAppsError::KeyFormat`] if either key is malformed or
    /// the public key does not belong to the private key.
    pub fn from_encoded(private_key: &str, public_key: &str) -> TrustedAppsResult<Self> {
        let private_key = decode_private_key(private_key)?;
        let public_key = decode_public_key(public_key)?;
        Self::new(private_key, public_key)
    }

    /// Build a key pair from parsed keys.
    ///
    /// # Errors
    ///
    /// Returns [`TrustedAppsError::KeyFormat`] if the keys do not match.
    pub fn new(private_key: RsaPrivateKey, public_key: RsaPublicKey) -> TrustedAppsResult<Self> {
        if RsaPublicKey::from(&private_key) != public_key {
            return Err(TrustedAppsError::KeyFormat(
                "public key does not match private key".to_owned(),
            ));
        }
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// The signing half.
    #[must_use]
    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// The verifying half.
    #[must_use]
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}
