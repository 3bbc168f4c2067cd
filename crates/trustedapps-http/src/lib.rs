//! hyper middleware for trusted-app request authentication.
//!
//! [`TrustedAppsService`](service::TrustedAppsService) wraps any hyper
//! service, verifies the `X-Trusted-App-*` headers of each request and
//! either forwards it (with the authenticated identity in its extensions)
//! or answers with a rejection in the configured
//! [`RejectionStyle`](response::RejectionStyle).

pub mod response;
pub mod service;

/// Response body of the middleware and the services it wraps.
pub type TrustedAppsBody = http_body_util::Full<bytes::Bytes>;

pub use response::{RejectionStyle, rejection_response};
pub use service::{TrustedAppsHttpConfig, TrustedAppsService};
