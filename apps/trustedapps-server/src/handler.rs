//! The `whoami` handler served behind the trusted-apps middleware.

use std::convert::Infallible;
use std::future::{Ready, ready};

use serde::Serialize;
use trustedapps_auth::AuthenticatedIdentity;
use trustedapps_http::TrustedAppsBody;
use trustedapps_http::response::json_response;

/// Reports the identity the middleware attached to the request, if any.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhoamiHandler;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Whoami<'a> {
    authenticated: bool,
    usercode: Option<&'a str>,
    provider_id: Option<&'a str>,
    path: &'a str,
}

impl<B> hyper::service::Service<http::Request<B>> for WhoamiHandler {
    type Response = http::Response<TrustedAppsBody>;
    type Error = Infallible;
    type Future = Ready<Result<Self::Response, Self::Error>>;

    fn call(&self, req: http::Request<B>) -> Self::Future {
        let identity = req.extensions().get::<AuthenticatedIdentity>();
        let body = Whoami {
            authenticated: identity.is_some(),
            usercode: identity.map(|id| id.usercode.as_str()),
            provider_id: identity.map(|id| id.provider_id.as_str()),
            path: req.uri().path(),
        };
        let json = serde_json::to_vec(&body).expect("JSON serialization of whoami cannot fail");
        ready(Ok(json_response(json)))
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use hyper::service::Service;

    use super::*;

    async fn call(req: http::Request<()>) -> serde_json::Value {
        let resp = WhoamiHandler.call(req).await.unwrap();
        assert_eq!(resp.status(), http::StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_should_report_anonymous_request() {
        let req = http::Request::builder().uri("/me").body(()).unwrap();
        let json = call(req).await;
        assert_eq!(json["authenticated"], false);
        assert!(json["usercode"].is_null());
        assert_eq!(json["path"], "/me");
    }

    #[tokio::test]
    async fn test_should_report_authenticated_identity() {
        let mut req = http::Request::builder().uri("/me").body(()).unwrap();
        req.extensions_mut().insert(AuthenticatedIdentity {
            usercode: "bob".to_owned(),
            provider_id: "shire".to_owned(),
        });
        let json = call(req).await;
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["usercode"], "bob");
        assert_eq!(json["providerId"], "shire");
    }
}
