//! Certificate-based app-to-app request authentication.
//!
//! A calling application proves who it is by attaching three headers to each
//! request: its provider id, a certificate naming the user it acts for, and
//! an RSA signature over the certificate fields and the request URL. The
//! receiving application looks the provider id up in its trust registry and
//! checks the signature with that provider's public key.
//!
//! # Usage
//!
//! ```rust,no_run
//! use trustedapps_auth::{TrustedAppsAuth, VerifyOutcome};
//! use trustedapps_core::TrustedAppsConfig;
//!
//! let config = TrustedAppsConfig::from_env().unwrap();
//! let auth = TrustedAppsAuth::from_config(&config).unwrap();
//!
//! // Caller side: headers for an outgoing request.
//! let headers = auth.outbound_headers("https://peer.example.com/api/x", "bob").unwrap();
//!
//! // Receiver side: check an incoming request.
//! let (parts, ()) = http::Request::builder()
//!     .uri("/api/x")
//!     .header("host", "peer.example.com")
//!     .body(())
//!     .unwrap()
//!     .into_parts();
//! match auth.verify_parts(&parts, "https") {
//!     VerifyOutcome::Accepted(identity) => println!("hello {}", identity.usercode),
//!     VerifyOutcome::Rejected(reason) => println!("{}: {reason}", reason.id()),
//!     VerifyOutcome::PassThrough => println!("anonymous"),
//! }
//! # let _ = headers;
//! ```
//!
//! # Modules
//!
//! - [`keys`] - Base64 DER key decoding and the process key pair
//! - [`certificate`] - Certificate token encoding and decoding
//! - [`signature`] - Signed payload construction, RSA-SHA1 sign and verify
//! - [`registry`] - Trusted app lookup with self-trust
//! - [`canonical`] - Canonical URL derivation
//! - [`verify`] - Per-request verification
//! - [`headers`] - Header names and the outbound header bundle
//! - [`error`] - Error and rejection types

pub mod canonical;
pub mod certificate;
pub mod error;
pub mod headers;
pub mod keys;
pub mod registry;
pub mod signature;
pub mod verify;

#[cfg(any(test, feature = "test-util"))]
pub mod testutil;

pub use canonical::{RequestMeta, canonical_url};
pub use certificate::{Certificate, decode_certificate, encode_certificate};
pub use error::{Rejection, TrustedAppsError, TrustedAppsResult};
pub use headers::TrustedAppHeaders;
pub use keys::KeyPair;
pub use registry::{TrustRegistry, TrustedApp, TrustedAppProvider};
pub use signature::RequestSigner;
pub use verify::{AuthenticatedIdentity, TrustedAppsAuth, VerifyOutcome};
