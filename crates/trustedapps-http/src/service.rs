//! Trusted-apps middleware implementing the hyper `Service` trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, warn};
use trustedapps_auth::headers::{HEADER_STATUS, STATUS_OK};
use trustedapps_auth::{Rejection, TrustedAppsAuth, VerifyOutcome};

use crate::TrustedAppsBody;
use crate::response::{RejectionStyle, rejection_response};

/// Configuration for the trusted-apps middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedAppsHttpConfig {
    /// Scheme used in the canonical URL when the request URI has none.
    pub default_scheme: String,
    /// Reject requests without a certificate instead of passing them on.
    pub require_certificate: bool,
    /// How rejected requests are answered.
    pub rejection: RejectionStyle,
}

impl Default for TrustedAppsHttpConfig {
    fn default() -> Self {
        Self {
            default_scheme: "http".to_owned(),
            require_certificate: false,
            rejection: RejectionStyle::Json,
        }
    }
}

/// Middleware that verifies trusted-app headers before calling `inner`.
///
/// Accepted requests reach `inner` with an
/// [`AuthenticatedIdentity`](trustedapps_auth::AuthenticatedIdentity) in
/// their extensions, and the response gets `X-Trusted-App-Status: OK`.
/// Requests without a certificate reach `inner` untouched unless
/// [`TrustedAppsHttpConfig::require_certificate`] is set. Rejected requests
/// never reach `inner`.
#[derive(Debug)]
pub struct TrustedAppsService<S> {
    inner: S,
    auth: Arc<TrustedAppsAuth>,
    config: Arc<TrustedAppsHttpConfig>,
}

impl<S> TrustedAppsService<S> {
    /// Wrap `inner` with trusted-app verification.
    pub fn new(inner: S, auth: Arc<TrustedAppsAuth>, config: TrustedAppsHttpConfig) -> Self {
        Self {
            inner,
            auth,
            config: Arc::new(config),
        }
    }

    /// Run verification for request parts, applying strict mode.
    fn outcome(&self, parts: &http::request::Parts) -> VerifyOutcome {
        match self.auth.verify_parts(parts, &self.config.default_scheme) {
            VerifyOutcome::PassThrough if self.config.require_certificate => {
                VerifyOutcome::Rejected(Rejection::NoCertificate)
            }
            outcome => outcome,
        }
    }
}

impl<S: Clone> Clone for TrustedAppsService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            auth: Arc::clone(&self.auth),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S, B> hyper::service::Service<http::Request<B>> for TrustedAppsService<S>
where
    S: hyper::service::Service<http::Request<B>, Response = http::Response<TrustedAppsBody>>,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
{
    type Response = http::Response<TrustedAppsBody>;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let (mut parts, body) = req.into_parts();

        match self.outcome(&parts) {
            VerifyOutcome::Rejected(rejection) => {
                warn!(
                    method = %parts.method,
                    uri = %parts.uri,
                    reason = rejection.id(),
                    "rejected trusted app request"
                );
                let response = rejection_response(self.config.rejection, &rejection);
                Box::pin(async move { Ok(response) })
            }
            VerifyOutcome::Accepted(identity) => {
                debug!(
                    usercode = %identity.usercode,
                    provider_id = %identity.provider_id,
                    "trusted app request accepted"
                );
                parts.extensions.insert(identity);
                let fut = self.inner.call(http::Request::from_parts(parts, body));
                Box::pin(async move {
                    let mut response = fut.await?;
                    response
                        .headers_mut()
                        .insert(HEADER_STATUS, http::HeaderValue::from_static(STATUS_OK));
                    Ok(response)
                })
            }
            VerifyOutcome::PassThrough => {
                Box::pin(self.inner.call(http::Request::from_parts(parts, body)))
            }
        }
    }
}
