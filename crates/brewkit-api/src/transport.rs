// Gateway connection settings and reqwest client construction.
//
// Core never builds HTTP clients itself; it hands a `GatewayConfig` to
// `RestGateway::new` and gets back a ready client.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::live::ReconnectConfig;

const USER_AGENT: &str = concat!("brewkit/", env!("CARGO_PKG_VERSION"));

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
}

/// Everything needed to talk to a document store.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// REST base URL, e.g. `http://localhost:8080/v1`.
    pub url: Url,
    /// Live-query base URL. Derived from `url` (`http` → `ws`) when unset.
    pub live_url: Option<Url>,
    pub tls: TlsMode,
    /// Request timeout.
    pub timeout: Duration,
    /// Backoff policy for live-query reconnects.
    pub reconnect: ReconnectConfig,
}

impl GatewayConfig {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            live_url: None,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Resolve the live-query base URL.
    pub fn resolved_live_url(&self) -> Result<Url, Error> {
        if let Some(ref url) = self.live_url {
            return Ok(url.clone());
        }
        live_url_from(&self.url)
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        if let TlsMode::CustomCa(path) = &self.tls {
            let cert_pem = std::fs::read(path)
                .map_err(|e| Error::ClientBuild(format!("failed to read CA cert: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&cert_pem)
                .map_err(|e| Error::ClientBuild(format!("invalid CA cert: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        builder
            .build()
            .map_err(|e| Error::ClientBuild(e.to_string()))
    }
}

/// Swap `http(s)` for `ws(s)`, keeping host, port, and path.
pub(crate) fn live_url_from(base: &Url) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "https" => "wss",
        "http" => "ws",
        "ws" | "wss" => return Ok(base.clone()),
        other => {
            return Err(Error::WebSocketConnect(format!(
                "cannot derive a live-query URL from scheme '{other}'"
            )));
        }
    };
    let rest = &base.as_str()[base.scheme().len()..];
    Ok(Url::parse(&format!("{scheme}{rest}"))?)
}
