//! Fixed RSA fixtures for tests.
//!
//! Two unrelated 1024-bit key pairs, encoded the way they appear in
//! configuration (base64 DER), plus a known-answer RSA-SHA1 signature made
//! with an independent implementation.

use trustedapps_core::{AppEntry, ShireConfig, TrustedAppsConfig, TrustedAppsSection};

/// Provider id used for the local process in tests.
pub const SELF_PROVIDER_ID: &str = "shire";

/// Provider id of the peer application in tests.
pub const OTHER_PROVIDER_ID: &str = "other-app";

/// Local private key, PKCS#8.
pub const SELF_PRIVATE_KEY: &str = "MIICdwIBADANBgkqhkiG9w0BAQEFAASCAmEwggJdAgEAAoGBAJ7IBU0PaeQpCG8eU534bDwTCbaM7aqcEGkUiAyQ4Mn759S8xcetJ0dSMc8qndaK4phvAZZPHFd9yMEDMR8UQr9S69xRNhK3eg4JSuonHi1MR4EytlFpyy8tieQCfOig7whX7Qi1r0Oe97+J+COphnagKSa/J2/v03PcBZ9njzcNAgMBAAECgYEAkE7EGpxWpinw42TRpDIC1LqMyl/dJYE/nPEvERSfaJPMyNlke6zQlQ6L/HgECdgiR14kOCLgZFgKm/k1rMRyQBgYsy21usPv9s2fgZPvNW/lZcrkGKDECY9Yf7IYWc8HzCwfFcDuxGi3RYy5JR6LNRghyvaQMJahFqHm69HKBkECQQDO4/uuJgHljviGfeBoPRwKNu+S4h2TS/hZe7pWKXJLD1l4i1o9cpfGIY/b20l+0BdMEUAcOvYW9SPIPs2B+j9RAkEAxHiblpuN5YtDC6AfmDhHvRp6HPpJ85dhWLUm0i/H6eBFY0oaeBAWQz9HcZGJ2h2OKF/5IiOBq5Pp75/Ap5Nk/QJBAIoNYPy0yeE3RKjhx+Nmm5ZJUBWwIlIOiHqVcCJcZ7KkXGxueFm2ZIZGEOuA6QrgqhsNC72KrnllPGo7VgBcTvECQDVIuHm6Kluszzwh6y+vY9VnjuK5BsFntuEGEEdE6iUFzAvHlzIkusT2LnwgipB7H4jXrouRsaNE9FcmrmtEUEkCQH9F6TKKuRC2YyleZd8A5gqLPETywSdebVQMJsk6qQDpE9g5xN/h5DsyNlsYQzgo392su3LVrDK+/BEH4YHk4/0=";

/// Local private key, PKCS#1.
pub const SELF_PRIVATE_KEY_PKCS1: &str = "MIICXQIBAAKBgQCeyAVND2nkKQhvHlOd+Gw8Ewm2jO2qnBBpFIgMkODJ++fUvMXHrSdHUjHPKp3WiuKYbwGWTxxXfcjBAzEfFEK/UuvcUTYSt3oOCUrqJx4tTEeBMrZRacsvLYnkAnzooO8IV+0Ita9Dnve/ifgjqYZ2oCkmvydv79Nz3AWfZ483DQIDAQABAoGBAJBOxBqcVqYp8ONk0aQyAtS6jMpf3SWBP5zxLxEUn2iTzMjZZHus0JUOi/x4BAnYIkdeJDgi4GRYCpv5NazEckAYGLMttbrD7/bNn4GT7zVv5WXK5BigxAmPWH+yGFnPB8wsHxXA7sRot0WMuSUeizUYIcr2kDCWoRah5uvRygZBAkEAzuP7riYB5Y74hn3gaD0cCjbvkuIdk0v4WXu6VilySw9ZeItaPXKXxiGP29tJftAXTBFAHDr2FvUjyD7Ngfo/UQJBAMR4m5abjeWLQwugH5g4R70aehz6SfOXYVi1JtIvx+ngRWNKGngQFkM/R3GRidodjihf+SIjgauT6e+fwKeTZP0CQQCKDWD8tMnhN0So4cfjZpuWSVAVsCJSDoh6lXAiXGeypFxsbnhZtmSGRhDrgOkK4KobDQu9iq55ZTxqO1YAXE7xAkA1SLh5uipbrM88Iesvr2PVZ47iuQbBZ7bhBhBHROolBcwLx5cyJLrE9i58IIqQex+I166LkbGjRPRXJq5rRFBJAkB/RekyirkQtmMpXmXfAOYKizxE8sEnXm1UDCbJOqkA6RPYOcTf4eQ7MjZbGEM4KN/drLty1awyvvwRB+GB5OP9";

/// Local public key, SPKI.
pub const SELF_PUBLIC_KEY: &str = "MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQCeyAVND2nkKQhvHlOd+Gw8Ewm2jO2qnBBpFIgMkODJ++fUvMXHrSdHUjHPKp3WiuKYbwGWTxxXfcjBAzEfFEK/UuvcUTYSt3oOCUrqJx4tTEeBMrZRacsvLYnkAnzooO8IV+0Ita9Dnve/ifgjqYZ2oCkmvydv79Nz3AWfZ483DQIDAQAB";

/// Local public key, PKCS#1.
pub const SELF_PUBLIC_KEY_PKCS1: &str = "MIGJAoGBAJ7IBU0PaeQpCG8eU534bDwTCbaM7aqcEGkUiAyQ4Mn759S8xcetJ0dSMc8qndaK4phvAZZPHFd9yMEDMR8UQr9S69xRNhK3eg4JSuonHi1MR4EytlFpyy8tieQCfOig7whX7Qi1r0Oe97+J+COphnagKSa/J2/v03PcBZ9njzcNAgMBAAE=";

/// Peer private key, PKCS#8.
pub const OTHER_PRIVATE_KEY: &str = "MIICeAIBADANBgkqhkiG9w0BAQEFAASCAmIwggJeAgEAAoGBAPOX2o8v2b+ynEcYsedtQgFpSzOolGHgMdFifS5YnbOrZ7k6Eum08vlQs/IplW1ac/ZdfTUVIvk4kFkl32Q7N/VmZ1ierNbggovO2tOyW0KfBJSteKvXbMOTLSrXH9QbrjifSAvpSH7ts6ebKtzFBYiu/6QVb4WSed0IO7F3HShlAgMBAAECgYEAlB0sds4In8gRwCUi324OqV8Fq+aAOrcgc4loRkr5sOqzCexm3ZX5+2B32fIw+qn6Qr37yNAOUO10z8/4cjCTx8KHpzRrAdISgXqfJ0YaOTTdHsPXYKuG24GAzEV1astTlRcW2on1l2TjuLzOryICK16GF1TDdfxU6LXwzkxivuECQQD767bL+Z64587c+6ncwcfCMWhntk6lzSyDpm3f2f1x0PKmfGoNSCFyuicGHYXfO+SUSGBfLFYw/ZYESqg86AwJAkEA94mekmlGUdXbXocHn6OYnNzqHAAsxl38RBgRqwM0XotD3EJfxJPonsHH3MHD0qDr9IVPeceKA/Y91gsap7cIfQJAZwWJNrc5WqKprSNZ3sZ8W4T7Dla2qQVT6+62xjGOfOoXIVCFyjKyQwmvhcezBIyouJ80khc+lEBQBidFz8qRiQJBANqmjBQlu4CT16bivUAswKRmmsBLA0HhSPBZFlophXuxpiqL0o4QXFzHLKR532BQ1rtxeedG80lWm/5SZqQYj/0CQQC60wxtyXCtcq9A7gjJZqgr9U5HDDRF21dIMZORtpsg6DHWQYiMxAh9QLoYCITz3kdxgW3U49faxM3aK8ice1wL";

/// Peer public key, SPKI.
pub const OTHER_PUBLIC_KEY: &str = "MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQDzl9qPL9m/spxHGLHnbUIBaUszqJRh4DHRYn0uWJ2zq2e5OhLptPL5ULPyKZVtWnP2XX01FSL5OJBZJd9kOzf1ZmdYnqzW4IKLztrTsltCnwSUrXir12zDky0q1x/UG644n0gL6Uh+7bOnmyrcxQWIrv+kFW+FknndCDuxdx0oZQIDAQAB";

/// Timestamp of the known-answer vector.
pub const VECTOR_TIMESTAMP: &str = "1445422338123";

/// URL of the known-answer vector.
pub const VECTOR_URL: &str = "https://example.com/api/thing";

/// Username of the known-answer vector.
pub const VECTOR_USERNAME: &str = "bob";

/// Certificate for [`VECTOR_TIMESTAMP`] / [`VECTOR_USERNAME`].
pub const VECTOR_CERTIFICATE: &str = "MTQ0NTQyMjMzODEyMwpib2I=";

/// RSA-SHA1 signature of the vector payload with [`SELF_PRIVATE_KEY`].
pub const VECTOR_SIGNATURE: &str = "Gt946sIOoqaj53zawro95GQB+B3i30uBm5ZCHWxmaqmcMXGT49tZnNzd2h8j9RdX8BWqYNPp2E+s4sj4zNkIyWYOO5izXs0Wf5Fbag+zuizPAkpY/znKbP4wYR55+uw/cJzVMOI+TZcuLeSab424HaOOSEyZE9ZQPqO1DiU71Yg=";

/// A configuration for [`SELF_PROVIDER_ID`] that trusts [`OTHER_PROVIDER_ID`].
#[must_use]
pub fn test_config() -> TrustedAppsConfig {
    TrustedAppsConfig {
        shire: ShireConfig {
            provider_id: SELF_PROVIDER_ID.to_owned(),
        },
        trusted_apps: TrustedAppsSection {
            public_key: SELF_PUBLIC_KEY.to_owned(),
            private_key: SELF_PRIVATE_KEY.to_owned(),
            apps: [(
                OTHER_PROVIDER_ID.to_owned(),
                AppEntry {
                    public_key: OTHER_PUBLIC_KEY.to_owned(),
                },
            )]
            .into_iter()
            .collect(),
        },
        allow_multiple_protocols_in_url: false,
    }
}

/// The configuration the peer application would run with: it signs as
/// [`OTHER_PROVIDER_ID`] and trusts [`SELF_PROVIDER_ID`].
#[must_use]
pub fn peer_config() -> TrustedAppsConfig {
    TrustedAppsConfig {
        shire: ShireConfig {
            provider_id: OTHER_PROVIDER_ID.to_owned(),
        },
        trusted_apps: TrustedAppsSection {
            public_key: OTHER_PUBLIC_KEY.to_owned(),
            private_key: OTHER_PRIVATE_KEY.to_owned(),
            apps: [(
                SELF_PROVIDER_ID.to_owned(),
                AppEntry {
                    public_key: SELF_PUBLIC_KEY.to_owned(),
                },
            )]
            .into_iter()
            .collect(),
        },
        allow_multiple_protocols_in_url: false,
    }
}
