//! Config subcommand handlers.

use std::path::PathBuf;

use brewkit_config::{self as config, Config};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn resolve_path(global: &GlobalOpts) -> PathBuf {
    global.config.clone().unwrap_or_else(config::config_path)
}

fn detail(cfg: &Config) -> String {
    output::detail_lines(&[
        ("gateway.url", cfg.gateway.url.clone()),
        (
            "gateway.live_url",
            cfg.gateway.live_url.clone().unwrap_or_else(|| "(derived)".into()),
        ),
        (
            "gateway.ca_cert",
            cfg.gateway
                .ca_cert
                .as_ref()
                .map_or_else(|| "(system roots)".into(), |p| p.display().to_string()),
        ),
        ("gateway.timeout", format!("{}s", cfg.gateway.timeout)),
        ("store.name", cfg.store.name.clone()),
        ("store.temperatures", cfg.store.temperatures.join(", ")),
        ("store.persist", cfg.store.persist.to_string()),
    ])
}

fn parse_bool(key: &str, value: &str) -> Result<bool, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: "must be 'true' or 'false'".into(),
    })
}

fn apply(cfg: &mut Config, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "gateway.url" | "url" => cfg.gateway.url = value,
        "gateway.live_url" | "live_url" | "live-url" => {
            cfg.gateway.live_url = (!value.is_empty()).then_some(value);
        }
        "gateway.ca_cert" | "ca_cert" | "ca-cert" => {
            cfg.gateway.ca_cert = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        "gateway.timeout" | "timeout" => {
            cfg.gateway.timeout = value.parse().map_err(|_| CliError::Validation {
                field: key.into(),
                reason: "must be a number (seconds)".into(),
            })?;
        }
        "store.name" => cfg.store.name = value,
        "store.temperatures" | "temperatures" => {
            cfg.store.temperatures = value
                .split(',')
                .map(|t| t.trim().to_owned())
                .filter(|t| !t.is_empty())
                .collect();
        }
        "store.persist" | "persist" => cfg.store.persist = parse_bool(key, &value)?,
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: gateway.url, gateway.live_url, \
                     gateway.ca_cert, gateway.timeout, store.name, store.temperatures, store.persist"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let path = resolve_path(global);

    match args.command {
        ConfigCommand::Init { url, force } => {
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            let mut cfg = Config::default();
            if let Some(url) = url {
                cfg.gateway.url = url;
            }
            cfg.validate()?;
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Configuration written to {}", path.display());
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = config::load_config_from(&path)?;
            let out = output::render_single(global.output, &cfg, detail, |_| {
                path.display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_from(&path)?;
            apply(&mut cfg, &key, value)?;
            cfg.validate()?;
            config::save_config_to(&cfg, &path)?;
            if !global.quiet {
                eprintln!("✓ Set {key}");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_known_keys() {
        let mut cfg = Config::default();
        apply(&mut cfg, "gateway.url", "https://docs.example.com/v1".into())
            .unwrap_or_else(|e| panic!("{e}"));
        apply(&mut cfg, "store.temperatures", "Warm, Iced".into())
            .unwrap_or_else(|e| panic!("{e}"));
        apply(&mut cfg, "persist", "false".into()).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(cfg.gateway.url, "https://docs.example.com/v1");
        assert_eq!(cfg.store.temperatures, vec!["Warm", "Iced"]);
        assert!(!cfg.store.persist);
    }

    #[test]
    fn empty_live_url_clears_it() {
        let mut cfg = Config::default();
        cfg.gateway.live_url = Some("ws://localhost:8080/v1".into());
        apply(&mut cfg, "gateway.live_url", String::new()).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cfg.gateway.live_url, None);
    }

    #[test]
    fn unknown_and_malformed_values_are_rejected() {
        let mut cfg = Config::default();
        assert!(matches!(
            apply(&mut cfg, "gateway.password", "x".into()),
            Err(CliError::Validation { .. })
        ));
        assert!(apply(&mut cfg, "gateway.timeout", "soon".into()).is_err());
    }
}
