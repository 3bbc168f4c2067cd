//! Per-request verification.
//!
//! [`TrustedAppsAuth`] owns the process identity (provider id and key pair)
//! and the trust registry. [`TrustedAppsAuth::verify`] runs the decision
//! procedure for one request:
//!
//! 1. No certificate header (or an empty one): [`VerifyOutcome::PassThrough`].
//!    Authentication is opt-in per request.
//! 2. Certificate without provider id: [`Rejection::NoProviderId`].
//! 3. Provider id not trusted, or not UTF-8: [`Rejection::UnknownApp`].
//! 4. No signature header: [`Rejection::NoSignature`].
//! 5. Certificate or signature undecodable, or signature mismatch for the
//!    canonical URL: [`Rejection::BadSignature`].
//! 6. Otherwise [`VerifyOutcome::Accepted`] with the certificate's username.
//!
//! The certificate timestamp is signed but never compared to the clock.

use std::fmt;
use std::sync::Arc;

use tracing::debug;
use trustedapps_core::{ConfigError, TrustedAppsConfig};

use crate::canonical::{RequestMeta, canonical_url};
use crate::certificate::decode_certificate;
use crate::error::{Rejection, TrustedAppsError, TrustedAppsResult};
use crate::headers::{
    HEADER_CERTIFICATE, HEADER_PROVIDER_ID, HEADER_SIGNATURE, HeaderField, TrustedAppHeaders,
    current_timestamp, header_field,
};
use crate::keys::KeyPair;
use crate::registry::{TrustRegistry, TrustedAppProvider};
use crate::signature::{RequestSigner, build_payload, verify_payload};

/// The identity attached to a request whose signature checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    /// Username taken from the certificate.
    pub usercode: String,
    /// The application that vouched for the user.
    pub provider_id: String,
}

/// Result of verifying one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The request was signed by a trusted app.
    Accepted(AuthenticatedIdentity),
    /// The request presented a certificate that did not check out.
    Rejected(Rejection),
    /// The request presented no certificate.
    PassThrough,
}

impl VerifyOutcome {
    /// Whether the outcome is [`VerifyOutcome::Rejected`].
    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Signing and verification for one process identity.
pub struct TrustedAppsAuth {
    provider_id: String,
    signer: RequestSigner,
    registry: Arc<dyn TrustedAppProvider>,
    allow_multiple_protocols: bool,
}

impl fmt::Debug for TrustedAppsAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedAppsAuth")
            .field("provider_id", &self.provider_id)
            .field("signer", &self.signer)
            .field("registry", &"...")
            .field("allow_multiple_protocols", &self.allow_multiple_protocols)
            .finish()
    }
}

impl TrustedAppsAuth {
    /// Build from configuration: decode the key pair and initialize the
    /// trust registry, trusting the local identity.
    ///
    /// # Errors
    ///
    /// Fails on incomplete configuration or any malformed key. Callers
    /// should treat this as fatal.
    pub fn from_config(config: &TrustedAppsConfig) -> TrustedAppsResult<Self> {
        config.validate()?;

        let section = &config.trusted_apps;
        let key_pair = KeyPair::from_encoded(&section.private_key, &section.public_key)?;
        let registry = TrustRegistry::initialize(
            &config.shire.provider_id,
            &section.public_key,
            section
                .apps
                .iter()
                .map(|(id, app)| (id.clone(), app.public_key.clone())),
        )?;

        Self::new(
            config.shire.provider_id.clone(),
            RequestSigner::new(key_pair),
            Arc::new(registry),
            config.allow_multiple_protocols_in_url,
        )
    }

    /// Build from parts, with a custom trusted-app lookup.
    ///
    /// # Errors
    ///
    /// Returns [`TrustedAppsError::Config`] unless `registry` resolves
    /// `provider_id` to the signer's own public key. A registry built by
    /// [`TrustRegistry::initialize`] always does.
    pub fn new(
        provider_id: impl Into<String>,
        signer: RequestSigner,
        registry: Arc<dyn TrustedAppProvider>,
        allow_multiple_protocols: bool,
    ) -> TrustedAppsResult<Self> {
        let provider_id = provider_id.into();
        match registry.lookup(&provider_id) {
            Some(own) if own.public_key == *signer.key_pair().public_key() => {}
            Some(_) => {
                return Err(TrustedAppsError::Config(ConfigError::Invalid(format!(
                    "trust registry key for local provider id {provider_id} does not match the signing key"
                ))));
            }
            None => {
                return Err(TrustedAppsError::Config(ConfigError::Invalid(format!(
                    "trust registry has no entry for local provider id {provider_id}"
                ))));
            }
        }
        Ok(Self {
            provider_id,
            signer,
            registry,
            allow_multiple_protocols,
        })
    }

    /// The local provider id.
    #[must_use]
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    /// The signer for outgoing requests.
    #[must_use]
    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Whether single-slash scheme repair is applied to canonical URLs.
    #[must_use]
    pub fn allow_multiple_protocols(&self) -> bool {
        self.allow_multiple_protocols
    }

    /// Canonical URL for a request under this instance's settings.
    #[must_use]
    pub fn canonical_url(&self, meta: &RequestMeta<'_>) -> String {
        canonical_url(meta, self.allow_multiple_protocols)
    }

    /// Verify a request from its `http` parts.
    #[must_use]
    pub fn verify_parts(&self, parts: &http::request::Parts, default_scheme: &str) -> VerifyOutcome {
        self.verify(&RequestMeta::from_parts(parts, default_scheme))
    }

    /// Verify one request.
    #[must_use]
    pub fn verify(&self, meta: &RequestMeta<'_>) -> VerifyOutcome {
        let certificate = match header_field(meta.headers, HEADER_CERTIFICATE) {
            HeaderField::Absent => return VerifyOutcome::PassThrough,
            HeaderField::Malformed(_) => None,
            HeaderField::Present(v) => Some(v),
        };

        let provider_id = match header_field(meta.headers, HEADER_PROVIDER_ID) {
            HeaderField::Absent => return reject(Rejection::NoProviderId),
            HeaderField::Malformed(raw) => {
                return reject(Rejection::UnknownApp(
                    String::from_utf8_lossy(raw).into_owned(),
                ));
            }
            HeaderField::Present(v) => v,
        };

        let Some(app) = self.registry.lookup(provider_id) else {
            return reject(Rejection::UnknownApp(provider_id.to_owned()));
        };

        let signature = match header_field(meta.headers, HEADER_SIGNATURE) {
            HeaderField::Absent => return reject(Rejection::NoSignature),
            HeaderField::Malformed(_) => None,
            HeaderField::Present(v) => Some(v),
        };

        let url = self.canonical_url(meta);

        let (Some(certificate), Some(signature)) = (certificate, signature) else {
            debug!(provider_id, "certificate or signature is not UTF-8");
            return reject(Rejection::BadSignature { url });
        };

        let cert = match decode_certificate(certificate) {
            Ok(cert) => cert,
            Err(e) => {
                debug!(provider_id, error = %e, "undecodable certificate");
                return reject(Rejection::BadSignature { url });
            }
        };

        let payload = build_payload(&cert.timestamp, &url, &cert.username);
        if !verify_payload(&payload, signature, &app.public_key) {
            return reject(Rejection::BadSignature { url });
        }

        debug!(provider_id, url = %url, usercode = %cert.username, "trusted app request verified");
        VerifyOutcome::Accepted(AuthenticatedIdentity {
            usercode: cert.username,
            provider_id: provider_id.to_owned(),
        })
    }

    /// Headers for an outgoing request to `url` on behalf of `username`,
    /// stamped with the current time.
    pub fn outbound_headers(&self, url: &str, username: &str) -> TrustedAppsResult<TrustedAppHeaders> {
        self.outbound_headers_at(&current_timestamp(), url, username)
    }

    /// Headers for an outgoing request with an explicit timestamp.
    pub fn outbound_headers_at(
        &self,
        timestamp: &str,
        url: &str,
        username: &str,
    ) -> TrustedAppsResult<TrustedAppHeaders> {
        self.signer
            .request_headers(&self.provider_id, timestamp, url, username)
    }
}

fn reject(rejection: Rejection) -> VerifyOutcome {
    debug!(reason = rejection.id(), "trusted app request rejected");
    VerifyOutcome::Rejected(rejection)
}

#[cfg(test)]
mod tests {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use http::{HeaderMap, HeaderValue};

    use super::*;
    use crate::registry::TrustedApp;
    use crate::testutil::{
        OTHER_PROVIDER_ID, OTHER_PUBLIC_KEY, SELF_PRIVATE_KEY, SELF_PROVIDER_ID, SELF_PUBLIC_KEY,
        VECTOR_CERTIFICATE, VECTOR_SIGNATURE, VECTOR_TIMESTAMP, VECTOR_URL, VECTOR_USERNAME,
        peer_config, test_config,
    };

    /// Lookup holding exactly one app.
    struct SingleApp(Arc<TrustedApp>);

    impl TrustedAppProvider for SingleApp {
        fn lookup(&self, provider_id: &str) -> Option<Arc<TrustedApp>> {
            (provider_id == self.0.provider_id).then(|| Arc::clone(&self.0))
        }
    }

    fn self_signer() -> RequestSigner {
        RequestSigner::new(KeyPair::from_encoded(SELF_PRIVATE_KEY, SELF_PUBLIC_KEY).unwrap())
    }

    fn auth() -> TrustedAppsAuth {
        TrustedAppsAuth::from_config(&test_config()).unwrap()
    }

    fn vector_headers(provider_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-requested-uri", HeaderValue::from_static(VECTOR_URL));
        TrustedAppHeaders {
            provider_id: provider_id.to_owned(),
            certificate: VECTOR_CERTIFICATE.to_owned(),
            signature: VECTOR_SIGNATURE.to_owned(),
        }
        .apply_to(&mut headers)
        .unwrap();
        headers
    }

    fn meta(headers: &HeaderMap) -> RequestMeta<'_> {
        RequestMeta {
            scheme: "https",
            headers,
            host: Some("example.com"),
            path_and_query: "/api/thing",
        }
    }

    #[test]
    fn test_should_accept_known_vector_from_self() {
        let headers = vector_headers(SELF_PROVIDER_ID);
        let outcome = auth().verify(&meta(&headers));
        assert_eq!(
            outcome,
            VerifyOutcome::Accepted(AuthenticatedIdentity {
                usercode: VECTOR_USERNAME.to_owned(),
                provider_id: SELF_PROVIDER_ID.to_owned(),
            })
        );
    }

    #[test]
    fn test_should_accept_composed_url_without_override_header() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.remove("x-requested-uri");
        let outcome = auth().verify(&meta(&headers));
        assert!(matches!(outcome, VerifyOutcome::Accepted(ref id) if id.usercode == "bob"));
    }

    #[test]
    fn test_should_accept_request_signed_by_peer() {
        let peer = TrustedAppsAuth::from_config(&peer_config()).unwrap();
        let signed = peer
            .outbound_headers_at("1700000000000", "https://example.com/api/thing", "alice")
            .unwrap();
        let mut headers = HeaderMap::new();
        signed.apply_to(&mut headers).unwrap();

        let outcome = auth().verify(&meta(&headers));
        assert_eq!(
            outcome,
            VerifyOutcome::Accepted(AuthenticatedIdentity {
                usercode: "alice".to_owned(),
                provider_id: OTHER_PROVIDER_ID.to_owned(),
            })
        );
    }

    #[test]
    fn test_should_pass_through_without_trusted_app_headers() {
        let headers = HeaderMap::new();
        assert_eq!(auth().verify(&meta(&headers)), VerifyOutcome::PassThrough);
    }

    #[test]
    fn test_should_pass_through_without_certificate_even_if_other_headers_present() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.remove("x-trusted-app-cert");
        assert_eq!(auth().verify(&meta(&headers)), VerifyOutcome::PassThrough);
    }

    #[test]
    fn test_should_reject_missing_provider_id() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.remove("x-trusted-app-providerid");
        assert_eq!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::NoProviderId)
        );
    }

    #[test]
    fn test_should_reject_unknown_app() {
        let headers = vector_headers("stranger");
        assert_eq!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::UnknownApp("stranger".to_owned()))
        );
    }

    #[test]
    fn test_should_check_trust_before_signature_presence() {
        let mut headers = vector_headers("stranger");
        headers.remove("x-trusted-app-signature");
        let outcome = auth().verify(&meta(&headers));
        assert!(matches!(
            outcome,
            VerifyOutcome::Rejected(Rejection::UnknownApp(_))
        ));
    }

    #[test]
    fn test_should_reject_missing_signature() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.remove("x-trusted-app-signature");
        assert_eq!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::NoSignature)
        );
    }

    #[test]
    fn test_should_reject_tampered_signature() {
        let mut raw = BASE64.decode(VECTOR_SIGNATURE).unwrap();
        raw[0] ^= 0x80;
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.insert(
            "x-trusted-app-signature",
            HeaderValue::from_str(&BASE64.encode(raw)).unwrap(),
        );
        assert_eq!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::BadSignature {
                url: VECTOR_URL.to_owned()
            })
        );
    }

    #[test]
    fn test_should_reject_signature_claimed_by_wrong_app() {
        let headers = vector_headers(OTHER_PROVIDER_ID);
        assert!(auth().verify(&meta(&headers)).is_rejected());
    }

    #[test]
    fn test_should_reject_signature_for_different_url() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.insert(
            "x-requested-uri",
            HeaderValue::from_static("https://example.com/api/other"),
        );
        assert!(matches!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::BadSignature { .. })
        ));
    }

    #[test]
    fn test_should_reject_malformed_certificate_as_bad_signature() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.insert("x-trusted-app-cert", HeaderValue::from_static("%%%"));
        assert!(matches!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::BadSignature { .. })
        ));
    }

    #[test]
    fn test_should_reject_non_utf8_certificate_as_bad_signature() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.insert(
            "x-trusted-app-cert",
            HeaderValue::from_bytes(b"MTQ\xff").unwrap(),
        );
        assert_eq!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::BadSignature {
                url: VECTOR_URL.to_owned()
            })
        );
    }

    #[test]
    fn test_should_reject_non_utf8_signature_as_bad_signature() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.insert(
            "x-trusted-app-signature",
            HeaderValue::from_bytes(b"R3\xfe").unwrap(),
        );
        assert!(matches!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::BadSignature { .. })
        ));
    }

    #[test]
    fn test_should_reject_non_utf8_provider_id_as_unknown_app() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        headers.insert(
            "x-trusted-app-providerid",
            HeaderValue::from_bytes(b"shire\xff").unwrap(),
        );
        assert!(matches!(
            auth().verify(&meta(&headers)),
            VerifyOutcome::Rejected(Rejection::UnknownApp(id)) if id.starts_with("shire")
        ));
    }

    #[test]
    fn test_should_reject_certificate_for_different_user() {
        let mut headers = vector_headers(SELF_PROVIDER_ID);
        let forged = crate::certificate::encode_certificate(VECTOR_TIMESTAMP, "admin").unwrap();
        headers.insert(
            "x-trusted-app-cert",
            HeaderValue::from_str(&forged).unwrap(),
        );
        assert!(auth().verify(&meta(&headers)).is_rejected());
    }

    #[test]
    fn test_should_apply_protocol_repair_consistently() {
        let mut config = test_config();
        config.allow_multiple_protocols_in_url = true;
        let auth = TrustedAppsAuth::from_config(&config).unwrap();

        let signed = auth
            .outbound_headers_at(VECTOR_TIMESTAMP, "https://example.com/x", "bob")
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-requested-uri",
            HeaderValue::from_static("https:/example.com/x"),
        );
        signed.apply_to(&mut headers).unwrap();

        assert!(matches!(
            auth.verify(&meta(&headers)),
            VerifyOutcome::Accepted(_)
        ));
        assert!(self::auth().verify(&meta(&headers)).is_rejected());
    }

    #[test]
    fn test_should_stamp_outbound_headers_with_current_time() {
        let auth = auth();
        let headers = auth.outbound_headers(VECTOR_URL, "bob").unwrap();
        assert_eq!(headers.provider_id, SELF_PROVIDER_ID);
        let cert = decode_certificate(&headers.certificate).unwrap();
        assert!(cert.timestamp.parse::<i64>().unwrap() > 1_600_000_000_000);
        assert_eq!(cert.username, "bob");
    }

    #[test]
    fn test_should_fail_construction_with_broken_key() {
        let mut config = test_config();
        config.trusted_apps.private_key = "bm90LWEta2V5".to_owned();
        assert!(TrustedAppsAuth::from_config(&config).is_err());
    }

    #[test]
    fn test_should_fail_construction_with_incomplete_config() {
        let mut config = test_config();
        config.shire.provider_id = String::new();
        assert!(matches!(
            TrustedAppsAuth::from_config(&config),
            Err(crate::error::TrustedAppsError::Config(_))
        ));
    }

    #[test]
    fn test_should_refuse_registry_without_local_identity() {
        let peer = TrustedApp::from_encoded(OTHER_PROVIDER_ID, OTHER_PUBLIC_KEY).unwrap();
        let result = TrustedAppsAuth::new(
            SELF_PROVIDER_ID,
            self_signer(),
            Arc::new(SingleApp(Arc::new(peer))),
            false,
        );
        assert!(matches!(
            result,
            Err(crate::error::TrustedAppsError::Config(_))
        ));
    }

    #[test]
    fn test_should_refuse_registry_with_foreign_key_for_local_identity() {
        let impostor = TrustedApp::from_encoded(SELF_PROVIDER_ID, OTHER_PUBLIC_KEY).unwrap();
        let result = TrustedAppsAuth::new(
            SELF_PROVIDER_ID,
            self_signer(),
            Arc::new(SingleApp(Arc::new(impostor))),
            false,
        );
        assert!(matches!(
            result,
            Err(crate::error::TrustedAppsError::Config(_))
        ));
    }

    #[test]
    fn test_should_build_from_custom_registry_with_local_identity() {
        let own = TrustedApp::from_encoded(SELF_PROVIDER_ID, SELF_PUBLIC_KEY).unwrap();
        let auth = TrustedAppsAuth::new(
            SELF_PROVIDER_ID,
            self_signer(),
            Arc::new(SingleApp(Arc::new(own))),
            false,
        )
        .unwrap();
        let headers = vector_headers(SELF_PROVIDER_ID);
        assert!(matches!(
            auth.verify(&meta(&headers)),
            VerifyOutcome::Accepted(_)
        ));
    }

    #[test]
    fn test_should_verify_from_http_parts() {
        let mut builder = http::Request::builder()
            .uri("/api/thing")
            .header("host", "example.com");
        for (name, value) in [
            ("x-trusted-app-providerid", SELF_PROVIDER_ID),
            ("x-trusted-app-cert", VECTOR_CERTIFICATE),
            ("x-trusted-app-signature", VECTOR_SIGNATURE),
        ] {
            builder = builder.header(name, value);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        assert!(matches!(
            auth().verify_parts(&parts, "https"),
            VerifyOutcome::Accepted(_)
        ));
        assert!(auth().verify_parts(&parts, "http").is_rejected());
    }
}
