//! Signature engine.
//!
//! The signed payload is the newline-joined triple
//!
//! ```text
//! <timestamp> "\n" <canonical-url> "\n" <username>
//! ```
//!
//! signed with RSASSA-PKCS1-v1_5 over SHA-1 and transported as standard
//! base64. The algorithm is fixed; there is no negotiation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use tracing::debug;

use crate::certificate::encode_certificate;
use crate::error::{TrustedAppsError, TrustedAppsResult};
use crate::headers::TrustedAppHeaders;
use crate::keys::{KeyPair, decode_public_key};

/// Name of the signature algorithm, as known to other implementations.
pub const SIGNATURE_ALGORITHM: &str = "RSA-SHA1";

/// Build the string that gets signed.
///
/// # Examples
///
/// ```
/// use trustedapps_auth::signature::build_payload;
///
/// assert_eq!(
///     build_payload("1445422338123", "https://example.com/x", "bob"),
///     "1445422338123\nhttps://example.com/x\nbob"
/// );
/// ```
#[must_use]
pub fn build_payload(timestamp: &str, url: &str, username: &str) -> String {
    format!("{timestamp}\n{url}\n{username}")
}

/// Sign a payload and return the base64 signature.
///
/// # Errors
///
/// Returns [`TrustedAppsError::Signing`] if the RSA primitive fails, which
/// only happens for keys too small to hold a SHA-1 digest.
pub fn sign_payload(payload: &str, private_key: &RsaPrivateKey) -> TrustedAppsResult<String> {
    sign_with(&SigningKey::<Sha1>::new(private_key.clone()), payload)
}

fn sign_with(signing_key: &SigningKey<Sha1>, payload: &str) -> TrustedAppsResult<String> {
    let signature: Signature = signing_key
        .try_sign(payload.as_bytes())
        .map_err(|e| TrustedAppsError::Signing(e.to_string()))?;
    Ok(BASE64.encode(signature.to_bytes()))
}

/// Check a base64 signature against a payload.
///
/// Returns `false` for any mismatch, including a signature that is not valid
/// base64 or has the wrong length.
#[must_use]
pub fn verify_payload(payload: &str, signature: &str, public_key: &RsaPublicKey) -> bool {
    let Ok(raw) = BASE64.decode(signature.trim()) else {
        debug!("signature is not valid base64");
        return false;
    };
    let Ok(signature) = Signature::try_from(raw.as_slice()) else {
        return false;
    };
    VerifyingKey::<Sha1>::new(public_key.clone())
        .verify(payload.as_bytes(), &signature)
        .is_ok()
}

/// Check a signature with a public key that is still in encoded form.
///
/// # Errors
///
/// Returns [`TrustedAppsError::KeyFormat`] if the public key cannot be
/// decoded. A mismatching signature is `Ok(false)`.
pub fn verify_with_encoded_key(
    payload: &str,
    signature: &str,
    encoded_public_key: &str,
) -> TrustedAppsResult<bool> {
    let public_key = decode_public_key(encoded_public_key)?;
    Ok(verify_payload(payload, signature, &public_key))
}

/// Signs outgoing requests with the process key pair.
#[derive(Clone)]
pub struct RequestSigner {
    key_pair: KeyPair,
    signing_key: SigningKey<Sha1>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_pair", &self.key_pair)
            .field("algorithm", &SIGNATURE_ALGORITHM)
            .finish()
    }
}

impl RequestSigner {
    /// Create a signer that owns `key_pair` for its whole lifetime.
    #[must_use]
    pub fn new(key_pair: KeyPair) -> Self {
        let signing_key = SigningKey::<Sha1>::new(key_pair.private_key().clone());
        Self {
            key_pair,
            signing_key,
        }
    }

    /// The key pair this signer uses.
    #[must_use]
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Sign the payload for `(timestamp, url, username)`.
    pub fn sign(&self, timestamp: &str, url: &str, username: &str) -> TrustedAppsResult<String> {
        sign_with(&self.signing_key, &build_payload(timestamp, url, username))
    }

    /// Produce the three header values a caller attaches to an outgoing
    /// request to `url` made on behalf of `username`.
    ///
    /// `url` must be exactly what the receiver will canonicalize the request
    /// to, see [`crate::canonical`].
    pub fn request_headers(
        &self,
        provider_id: &str,
        timestamp: &str,
        url: &str,
        username: &str,
    ) -> TrustedAppsResult<TrustedAppHeaders> {
        let certificate = encode_certificate(timestamp, username)?;
        let signature = self.sign(timestamp, url, username)?;
        debug!(provider_id, url, "signed outgoing request");
        Ok(TrustedAppHeaders {
            provider_id: provider_id.to_owned(),
            certificate,
            signature,
        })
    }
}
