//! Server settings from environment variables.

use anyhow::{Context, Result};
use trustedapps_http::{RejectionStyle, TrustedAppsHttpConfig};

/// Process-level settings that are not part of the trusted-apps identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub gateway_listen: String,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Scheme for canonical URLs of origin-form requests.
    pub scheme: String,
    /// How rejections are answered.
    pub rejection: RejectionStyle,
    /// Reject requests that carry no certificate.
    pub require_certificate: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            gateway_listen: "0.0.0.0:4580".to_owned(),
            log_level: "info".to_owned(),
            scheme: "http".to_owned(),
            rejection: RejectionStyle::Json,
            require_certificate: false,
        }
    }
}

impl ServerConfig {
    /// Load settings from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("GATEWAY_LISTEN") {
            config.gateway_listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("TRUSTED_APPS_SCHEME") {
            config.scheme = v;
        }
        if let Some(v) = lookup("TRUSTED_APPS_REJECTION") {
            config.rejection = v.parse().context("invalid TRUSTED_APPS_REJECTION")?;
        }
        if let Some(v) = lookup("TRUSTED_APPS_REQUIRE_CERT") {
            config.require_certificate = v == "1" || v.eq_ignore_ascii_case("true");
        }

        Ok(config)
    }

    /// Middleware settings derived from this configuration.
    pub fn http_config(&self) -> TrustedAppsHttpConfig {
        TrustedAppsHttpConfig {
            default_scheme: self.scheme.clone(),
            require_certificate: self.require_certificate,
            rejection: self.rejection,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_should_use_defaults_without_env() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.gateway_listen, "0.0.0.0:4580");
    }

    #[test]
    fn test_should_read_all_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GATEWAY_LISTEN", "127.0.0.1:9000"),
            ("LOG_LEVEL", "debug"),
            ("TRUSTED_APPS_SCHEME", "https"),
            ("TRUSTED_APPS_REJECTION", "assert"),
            ("TRUSTED_APPS_REQUIRE_CERT", "true"),
        ]))
        .unwrap();
        assert_eq!(config.gateway_listen, "127.0.0.1:9000");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.scheme, "https");
        assert_eq!(config.rejection, RejectionStyle::Assert);
        assert!(config.require_certificate);
    }

    #[test]
    fn test_should_fail_on_unknown_rejection_style() {
        let err = ServerConfig::from_lookup(lookup(&[("TRUSTED_APPS_REJECTION", "teapot")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("teapot"));
    }

    #[test]
    fn test_should_build_http_config() {
        let config = ServerConfig {
            scheme: "https".to_owned(),
            require_certificate: true,
            ..ServerConfig::default()
        };
        let http = config.http_config();
        assert_eq!(http.default_scheme, "https");
        assert!(http.require_certificate);
        assert_eq!(http.rejection, RejectionStyle::Json);
    }
}
