//! Trusted Apps demo server.
//!
//! Serves a `whoami` endpoint behind the trusted-apps middleware, so peers
//! can check that their signed requests are accepted. With `--sign` it
//! prints the headers this process would attach to an outgoing request.
//!
//! # Usage
//!
//! ```text
//! TRUSTED_APPS_CONFIG=trusted-apps.json trustedapps-server
//! TRUSTED_APPS_CONFIG=trusted-apps.json trustedapps-server --sign https://peer/api/x bob
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATEWAY_LISTEN` | `0.0.0.0:4580` | Bind address |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |
//! | `TRUSTED_APPS_CONFIG` | *(unset)* | Path to the JSON trusted-apps configuration |
//! | `TRUSTED_APPS_PROVIDER_ID` | *(unset)* | Overrides `shire.providerId` |
//! | `TRUSTED_APPS_PUBLIC_KEY` | *(unset)* | Overrides `trustedApps.publicKey` |
//! | `TRUSTED_APPS_PRIVATE_KEY` | *(unset)* | Overrides `trustedApps.privateKey` |
//! | `TRUSTED_APPS_ALLOW_MULTIPLE_PROTOCOLS` | `false` | Repair `scheme:/host` URLs |
//! | `TRUSTED_APPS_SCHEME` | `http` | Scheme for canonical URLs |
//! | `TRUSTED_APPS_REJECTION` | `json` | `json` (401) or `assert` (403) |
//! | `TRUSTED_APPS_REQUIRE_CERT` | `false` | Reject requests without a certificate |

mod config;
mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as HttpConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trustedapps_auth::{TrustedAppHeaders, TrustedAppsAuth};
use trustedapps_core::TrustedAppsConfig;
use trustedapps_http::TrustedAppsService;

use crate::config::ServerConfig;
use crate::handler::WhoamiHandler;

/// Server version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Build the process identity from the environment. Any failure is fatal.
fn load_auth() -> Result<TrustedAppsAuth> {
    let config = TrustedAppsConfig::from_env().context("failed to load trusted apps config")?;
    TrustedAppsAuth::from_config(&config).context("failed to initialize trusted apps")
}

/// Parse `--sign <url> <username>` from the command line.
fn sign_args(args: &[String]) -> Result<Option<(&str, &str)>> {
    let Some(pos) = args.iter().position(|a| a == "--sign") else {
        return Ok(None);
    };
    match (args.get(pos + 1), args.get(pos + 2)) {
        (Some(url), Some(username)) => Ok(Some((url.as_str(), username.as_str()))),
        _ => anyhow::bail!("usage: trustedapps-server --sign <url> <username>"),
    }
}

/// Render outbound headers as `Name: value` lines.
fn format_headers(headers: &TrustedAppHeaders) -> String {
    headers
        .pairs()
        .iter()
        .map(|(name, value)| format!("{name}: {value}\n"))
        .collect()
}

/// Run the accept loop, serving connections until a shutdown signal is received.
async fn serve(listener: TcpListener, service: TrustedAppsService<WhoamiHandler>) -> Result<()> {
    let graceful = hyper_util::server::graceful::GracefulShutdown::new();
    let http = HttpConnBuilder::new(TokioExecutor::new());

    let shutdown = async {
        tokio::signal::ctrl_c().await.ok();
        info!("received shutdown signal, draining connections");
    };

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept connection");
                        continue;
                    }
                };

                let svc = service.clone();
                let conn = http.serve_connection(TokioIo::new(stream), svc);
                let conn = graceful.watch(conn.into_owned());

                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        error!(peer_addr = %peer_addr, error = %e, "connection error");
                    }
                });
            }

            () = &mut shutdown => {
                info!("shutting down gracefully");
                break;
            }
        }
    }

    graceful.shutdown().await;
    info!("all connections drained, exiting");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if let Some((url, username)) = sign_args(&args)? {
        let auth = load_auth()?;
        let headers = auth
            .outbound_headers(url, username)
            .context("failed to sign request")?;
        print!("{}", format_headers(&headers));
        return Ok(());
    }

    let config = ServerConfig::from_env()?;

    init_tracing(&config.log_level)?;

    let auth = load_auth()?;

    info!(
        gateway_listen = %config.gateway_listen,
        provider_id = %auth.provider_id(),
        scheme = %config.scheme,
        rejection = %config.rejection,
        require_certificate = config.require_certificate,
        allow_multiple_protocols = auth.allow_multiple_protocols(),
        version = VERSION,
        "starting Trusted Apps server",
    );

    let service = TrustedAppsService::new(WhoamiHandler, Arc::new(auth), config.http_config());

    let addr: SocketAddr = config
        .gateway_listen
        .parse()
        .with_context(|| format!("invalid bind address: {}", config.gateway_listen))?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(%addr, "listening for connections");

    serve(listener, service).await
}

#[cfg(test)]
mod tests {
    use trustedapps_auth::testutil::{
        SELF_PROVIDER_ID, VECTOR_CERTIFICATE, VECTOR_SIGNATURE, VECTOR_TIMESTAMP, VECTOR_URL,
        VECTOR_USERNAME, test_config,
    };

    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_should_parse_sign_args() {
        let argv = args(&["trustedapps-server", "--sign", "https://a/b", "bob"]);
        assert_eq!(sign_args(&argv).unwrap(), Some(("https://a/b", "bob")));
    }

    #[test]
    fn test_should_skip_sign_mode_without_flag() {
        let argv = args(&["trustedapps-server"]);
        assert_eq!(sign_args(&argv).unwrap(), None);
    }

    #[test]
    fn test_should_require_url_and_username_for_sign() {
        let argv = args(&["trustedapps-server", "--sign", "https://a/b"]);
        assert!(sign_args(&argv).is_err());
    }

    #[test]
    fn test_should_format_signed_headers() {
        let auth = TrustedAppsAuth::from_config(&test_config()).unwrap();
        let headers = auth
            .outbound_headers_at(VECTOR_TIMESTAMP, VECTOR_URL, VECTOR_USERNAME)
            .unwrap();
        let text = format_headers(&headers);
        assert_eq!(
            text,
            format!(
                "X-Trusted-App-ProviderID: {SELF_PROVIDER_ID}\n\
                 X-Trusted-App-Cert: {VECTOR_CERTIFICATE}\n\
                 X-Trusted-App-Signature: {VECTOR_SIGNATURE}\n"
            )
        );
    }
}
