//! Canonical URL construction.
//!
//! The URL is part of the signed payload, so signer and verifier must derive
//! the exact same string:
//!
//! 1. If the request carries `X-Requested-URI`, its value is used verbatim.
//! 2. Otherwise the URL is `<scheme>://<host><path-and-query>`.
//! 3. With `allowMultipleProtocolsInURL` set, the first `scheme:/x` (single
//!    slash) is repaired to `scheme://x`. Some upstream rewriters collapse
//!    the double slash.

use std::borrow::Cow;
use std::sync::LazyLock;

use http::HeaderMap;
use regex::Regex;

use crate::headers::{HEADER_REQUESTED_URI, header_str};

static SINGLE_SLASH_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]+):/([^/])").expect("static regex is valid"));

/// The request attributes the canonical URL is derived from.
#[derive(Debug, Clone, Copy)]
pub struct RequestMeta<'a> {
    /// Protocol the request arrived over, without `://`.
    pub scheme: &'a str,
    /// Request headers.
    pub headers: &'a HeaderMap,
    /// Host the request was addressed to, if known.
    pub host: Option<&'a str>,
    /// Request path including the query string.
    pub path_and_query: &'a str,
}

impl<'a> RequestMeta<'a> {
    /// Extract request metadata from `http` request parts.
    ///
    /// The scheme comes from the request URI when it is absolute, otherwise
    /// `default_scheme` is used (origin-form requests carry no scheme). The
    /// host comes from the `Host` header, falling back to the URI authority.
    #[must_use]
    pub fn from_parts(parts: &'a http::request::Parts, default_scheme: &'a str) -> Self {
        let scheme = parts.uri.scheme_str().unwrap_or(default_scheme);
        let host = header_str(&parts.headers, http::header::HOST.as_str())
            .or_else(|| parts.uri.authority().map(http::uri::Authority::as_str));
        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or("/", http::uri::PathAndQuery::as_str);

        Self {
            scheme,
            headers: &parts.headers,
            host,
            path_and_query,
        }
    }
}

/// Derive the canonical URL for a request.
///
/// # Examples
///
/// ```
/// use trustedapps_auth::canonical::{RequestMeta, canonical_url};
///
/// let headers = http::HeaderMap::new();
/// let meta = RequestMeta {
///     scheme: "https",
///     headers: &headers,
///     host: Some("example.com"),
///     path_and_query: "/x?y=1",
/// };
/// assert_eq!(canonical_url(&meta, false), "https://example.com/x?y=1");
/// ```
#[must_use]
pub fn canonical_url(meta: &RequestMeta<'_>, allow_multiple_protocols: bool) -> String {
    let url = match header_str(meta.headers, HEADER_REQUESTED_URI) {
        Some(requested) => requested.to_owned(),
        None => format!(
            "{}://{}{}",
            meta.scheme,
            meta.host.unwrap_or_default(),
            meta.path_and_query
        ),
    };

    if allow_multiple_protocols {
        normalize_protocols(&url).into_owned()
    } else {
        url
    }
}

/// Repair the first `scheme:/x` into `scheme://x`.
///
/// # Examples
///
/// ```
/// use trustedapps_auth::canonical::normalize_protocols;
///
/// assert_eq!(normalize_protocols("https:/example.com/x"), "https://example.com/x");
/// assert_eq!(normalize_protocols("https://example.com/x"), "https://example.com/x");
/// ```
#[must_use]
pub fn normalize_protocols(url: &str) -> Cow<'_, str> {
    SINGLE_SLASH_SCHEME.replace(url, "${1}://${2}")
}
