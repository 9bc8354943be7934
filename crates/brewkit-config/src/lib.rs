//! Shared configuration for brewkit tools.
//!
//! A TOML file in the platform config dir, overridable through
//! `BREWKIT_`-prefixed environment variables (`BREWKIT_GATEWAY__URL`),
//! translated into `brewkit_api::GatewayConfig` and
//! `brewkit_core::StoreConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use brewkit_api::GatewayConfig;
use brewkit_api::transport::TlsMode;
use brewkit_core::{DEFAULT_STORE_NAME, DEFAULT_TEMPERATURES, StoreConfig};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub store: StoreSection,
}

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewaySection {
    /// REST base URL, e.g. "http://localhost:8080/v1".
    #[serde(default = "default_url")]
    pub url: String,

    /// Live-query base URL. Derived from `url` when unset.
    pub live_url: Option<String>,

    /// Extra CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            url: default_url(),
            live_url: None,
            ca_cert: None,
            timeout: default_timeout(),
        }
    }
}

fn default_url() -> String {
    "http://localhost:8080/v1".into()
}
fn default_timeout() -> u64 {
    30
}

/// Store behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreSection {
    /// Key the in-progress selection is saved under.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Ordered temperature names.
    #[serde(default = "default_temperatures")]
    pub temperatures: Vec<String>,

    /// Save the in-progress name and temperature between runs.
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            name: default_store_name(),
            temperatures: default_temperatures(),
            persist: default_persist(),
        }
    }
}

fn default_store_name() -> String {
    DEFAULT_STORE_NAME.into()
}
fn default_temperatures() -> Vec<String> {
    DEFAULT_TEMPERATURES.iter().map(|t| (*t).to_owned()).collect()
}
fn default_persist() -> bool {
    true
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "brewkit", "brewkit")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the persisted selection lives.
pub fn state_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share").join("state.json"),
        |dirs| dirs.data_dir().join("state.json"),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("brewkit");
    p
}

// ── Loading ─────────────────────────────────────────────────────────

/// Load config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load config from `path` + environment. A missing file yields defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BREWKIT_").split("__"))
        .extract()?;

    config.validate()?;
    Ok(config)
}

// ── Saving ──────────────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Validation & translation ────────────────────────────────────────

impl Config {
    /// Check everything that can be checked without a network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gateway_url()?;
        self.live_url()?;

        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "store.name".into(),
                reason: "must not be empty".into(),
            });
        }

        brewkit_core::validate_temperature_names(&self.store.temperatures).map_err(|e| {
            ConfigError::Validation {
                field: "store.temperatures".into(),
                reason: e.to_string(),
            }
        })
    }

    fn gateway_url(&self) -> Result<Url, ConfigError> {
        parse_url("gateway.url", &self.gateway.url, &["http", "https"])
    }

    fn live_url(&self) -> Result<Option<Url>, ConfigError> {
        self.gateway
            .live_url
            .as_deref()
            .map(|raw| parse_url("gateway.live_url", raw, &["ws", "wss"]))
            .transpose()
    }

    /// Build the gateway connection settings.
    pub fn to_gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        let mut config = GatewayConfig::new(self.gateway_url()?);
        config.live_url = self.live_url()?;
        config.timeout = Duration::from_secs(self.gateway.timeout);
        if let Some(ref ca) = self.gateway.ca_cert {
            config.tls = TlsMode::CustomCa(ca.clone());
        }
        Ok(config)
    }

    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            temperatures: self.store.temperatures.clone(),
            store_name: self.store.name.clone(),
        }
    }
}

fn parse_url(field: &str, raw: &str, schemes: &[&str]) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    if !schemes.contains(&url.scheme()) {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected {} URL, got {}", schemes.join("/"), url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.gateway.url, "http://localhost:8080/v1");
        assert_eq!(config.store.name, "BeverageStore");
        assert_eq!(config.store.temperatures, vec!["Cold", "Hot", "Iced"]);
        assert!(config.store.persist);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
[gateway]
url = "https://docs.example.com/v1"
timeout = 5

[store]
temperatures = ["Warm", "Frozen"]
persist = false
"#,
        );

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.store.temperatures, vec!["Warm", "Frozen"]);
        assert_eq!(config.store.name, "BeverageStore");

        let gateway = config.to_gateway_config().unwrap();
        assert_eq!(gateway.url.as_str(), "https://docs.example.com/v1");
        assert_eq!(gateway.timeout, Duration::from_secs(5));
        assert_eq!(
            gateway.resolved_live_url().unwrap().as_str(),
            "wss://docs.example.com/v1"
        );

        let store = config.to_store_config();
        assert_eq!(store.temperatures.len(), 2);
    }

    #[test]
    fn duplicate_temperatures_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "[store]\ntemperatures = [\"Hot\", \"HOT\"]\n");

        match load_config_from(&path).unwrap_err() {
            ConfigError::Validation { field, .. } => assert_eq!(field, "store.temperatures"),
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn live_url_must_be_websocket() {
        let mut config = Config::default();
        config.gateway.live_url = Some("http://localhost:9000".into());

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gateway.live_url"));
    }

    #[test]
    fn bad_gateway_url_is_rejected() {
        let mut config = Config::default();
        config.gateway.url = "not a url".into();
        assert!(config.to_gateway_config().is_err());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.toml");

        let mut config = Config::default();
        config.gateway.live_url = Some("ws://localhost:8081/v1".into());
        config.store.name = "Counter".into();
        save_config_to(&config, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), config);
    }
}
