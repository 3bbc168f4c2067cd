//! Rejection responses.
//!
//! Two conventions are supported for refusing a request, selected by
//! [`RejectionStyle`]:
//!
//! - [`RejectionStyle::Json`] answers `401 Unauthorized` with a structured
//!   body:
//!
//!   ```json
//!   {
//!     "success": false,
//!     "status": "Unauthorized",
//!     "errors": [{ "id": "bad-signature", "message": "Bad signature for URL: ..." }]
//!   }
//!   ```
//!
//! - [`RejectionStyle::Assert`] answers `403 Forbidden` with the message as
//!   plain text.
//!
//! Both set `X-Trusted-App-Status: Error`.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use trustedapps_auth::Rejection;
use trustedapps_auth::headers::{HEADER_STATUS, STATUS_ERROR};

use crate::TrustedAppsBody;

/// Content type of structured rejection bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type of plain rejection bodies.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// How rejected requests are answered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RejectionStyle {
    /// `401` with a JSON error list.
    #[default]
    Json,
    /// `403` with a plain-text message.
    Assert,
}

impl RejectionStyle {
    /// The status code used for rejections in this style.
    #[must_use]
    pub fn status(self) -> http::StatusCode {
        match self {
            Self::Json => http::StatusCode::UNAUTHORIZED,
            Self::Assert => http::StatusCode::FORBIDDEN,
        }
    }
}

impl fmt::Display for RejectionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Assert => f.write_str("assert"),
        }
    }
}

/// Error returned when parsing an unknown [`RejectionStyle`].
#[derive(Debug, thiserror::Error)]
#[error("unknown rejection style '{0}', expected 'json' or 'assert'")]
pub struct ParseRejectionStyleError(String);

impl FromStr for RejectionStyle {
    type Err = ParseRejectionStyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "assert" => Ok(Self::Assert),
            _ => Err(ParseRejectionStyleError(s.to_owned())),
        }
    }
}

#[derive(Serialize)]
struct RejectionBody<'a> {
    success: bool,
    status: &'a str,
    errors: [RejectionEntry<'a>; 1],
}

#[derive(Serialize)]
struct RejectionEntry<'a> {
    id: &'a str,
    message: String,
}

/// Serialize a rejection into the structured JSON body.
#[must_use]
pub fn rejection_to_json(rejection: &Rejection) -> Vec<u8> {
    let body = RejectionBody {
        success: false,
        status: "Unauthorized",
        errors: [RejectionEntry {
            id: rejection.id(),
            message: rejection.message(),
        }],
    };
    serde_json::to_vec(&body).expect("JSON serialization of rejection cannot fail")
}

/// Build the response for a rejected request.
#[must_use]
pub fn rejection_response(
    style: RejectionStyle,
    rejection: &Rejection,
) -> http::Response<TrustedAppsBody> {
    let (content_type, body) = match style {
        RejectionStyle::Json => (
            JSON_CONTENT_TYPE,
            TrustedAppsBody::from(rejection_to_json(rejection)),
        ),
        RejectionStyle::Assert => (
            TEXT_CONTENT_TYPE,
            TrustedAppsBody::from(rejection.message()),
        ),
    };

    http::Response::builder()
        .status(style.status())
        .header("content-type", content_type)
        .header(HEADER_STATUS, STATUS_ERROR)
        .body(body)
        .expect("valid rejection response")
}

/// Build a `200 OK` JSON response.
#[must_use]
pub fn json_response(json: Vec<u8>) -> http::Response<TrustedAppsBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("content-type", JSON_CONTENT_TYPE)
        .body(TrustedAppsBody::from(json))
        .expect("valid JSON response")
}
