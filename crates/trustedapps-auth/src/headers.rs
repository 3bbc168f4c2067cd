//! Header names and the outbound header bundle.

use http::{HeaderMap, HeaderValue};

/// Request header carrying the caller's provider id.
pub const HEADER_PROVIDER_ID: &str = "X-Trusted-App-ProviderID";
/// Request header carrying the certificate.
pub const HEADER_CERTIFICATE: &str = "X-Trusted-App-Cert";
/// Request header carrying the signature.
pub const HEADER_SIGNATURE: &str = "X-Trusted-App-Signature";

/// Response header set to `OK` or `Error`.
pub const HEADER_STATUS: &str = "X-Trusted-App-Status";
/// Reserved response header for an error code. Not emitted.
pub const HEADER_ERROR_CODE: &str = "X-Trusted-App-Error-Code";
/// Reserved response header for an error message. Not emitted.
pub const HEADER_ERROR_MESSAGE: &str = "X-Trusted-App-Error-Message";

/// Overrides the URL the receiver reconstructs for signature checking.
pub const HEADER_REQUESTED_URI: &str = "X-Requested-URI";

/// Value of [`HEADER_STATUS`] on success.
pub const STATUS_OK: &str = "OK";
/// Value of [`HEADER_STATUS`] on rejection.
pub const STATUS_ERROR: &str = "Error";

/// The three header values a caller attaches to an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedAppHeaders {
    /// Value for [`HEADER_PROVIDER_ID`].
    pub provider_id: String,
    /// Value for [`HEADER_CERTIFICATE`].
    pub certificate: String,
    /// Value for [`HEADER_SIGNATURE`].
    pub signature: String,
}

impl TrustedAppHeaders {
    /// Header name/value pairs, in wire order.
    #[must_use]
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (HEADER_PROVIDER_ID, self.provider_id.as_str()),
            (HEADER_CERTIFICATE, self.certificate.as_str()),
            (HEADER_SIGNATURE, self.signature.as_str()),
        ]
    }

    /// Insert the three headers into `headers`, replacing earlier values.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider id is not a valid header value.
    /// Certificates and signatures are base64 and always valid.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), http::header::InvalidHeaderValue> {
        for (name, value) in self.pairs() {
            headers.insert(name, HeaderValue::from_str(value)?);
        }
        Ok(())
    }
}

/// The current time as a certificate timestamp: Unix epoch milliseconds.
#[must_use]
pub fn current_timestamp() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// A request header as seen by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField<'a> {
    /// Not sent, or sent empty.
    Absent,
    /// Sent, but not valid UTF-8.
    Malformed(&'a [u8]),
    /// Sent with a UTF-8 value.
    Present(&'a str),
}

/// Look up a header, keeping "absent" apart from "present but unreadable".
#[must_use]
pub fn header_field<'a>(headers: &'a HeaderMap, name: &str) -> HeaderField<'a> {
    match headers.get(name) {
        None => HeaderField::Absent,
        Some(v) if v.is_empty() => HeaderField::Absent,
        Some(v) => std::str::from_utf8(v.as_bytes())
            .map_or(HeaderField::Malformed(v.as_bytes()), HeaderField::Present),
    }
}

/// Read a header as UTF-8, treating non-UTF-8 and empty values as absent.
#[must_use]
pub fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    match header_field(headers, name) {
        HeaderField::Present(v) => Some(v),
        HeaderField::Absent | HeaderField::Malformed(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TrustedAppHeaders {
        TrustedAppHeaders {
            provider_id: "shire".to_owned(),
            certificate: "MTQ0NTQyMjMzODEyMwpib2I=".to_owned(),
            signature: "c2ln".to_owned(),
        }
    }

    #[test]
    fn test_should_apply_headers_to_map() {
        let mut map = HeaderMap::new();
        sample().apply_to(&mut map).unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(header_str(&map, HEADER_PROVIDER_ID), Some("shire"));
        assert_eq!(
            header_str(&map, "x-trusted-app-cert"),
            Some("MTQ0NTQyMjMzODEyMwpib2I=")
        );
        assert_eq!(header_str(&map, HEADER_SIGNATURE), Some("c2ln"));
    }

    #[test]
    fn test_should_reject_invalid_provider_id_header_value() {
        let mut headers = sample();
        headers.provider_id = "bad\nid".to_owned();
        assert!(headers.apply_to(&mut HeaderMap::new()).is_err());
    }

    #[test]
    fn test_should_treat_empty_header_as_absent() {
        let mut map = HeaderMap::new();
        map.insert("x-trusted-app-cert", HeaderValue::from_static(""));
        assert_eq!(header_str(&map, HEADER_CERTIFICATE), None);
    }

    #[test]
    fn test_should_distinguish_absent_from_malformed_header() {
        let mut map = HeaderMap::new();
        assert_eq!(header_field(&map, HEADER_CERTIFICATE), HeaderField::Absent);

        map.insert(
            "x-trusted-app-cert",
            HeaderValue::from_bytes(b"MTQ\xff").unwrap(),
        );
        assert_eq!(
            header_field(&map, HEADER_CERTIFICATE),
            HeaderField::Malformed(b"MTQ\xff")
        );
        assert_eq!(header_str(&map, HEADER_CERTIFICATE), None);

        map.insert("x-trusted-app-providerid", HeaderValue::from_static("shire"));
        assert_eq!(
            header_field(&map, HEADER_PROVIDER_ID),
            HeaderField::Present("shire")
        );
    }

    #[test]
    fn test_should_produce_millisecond_timestamp() {
        let ts = current_timestamp();
        assert!(ts.len() >= 13);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }
}
