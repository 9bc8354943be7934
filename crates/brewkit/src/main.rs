mod cli;
mod commands;
mod demo;
mod error;
mod output;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use brewkit_api::{Gateway, RestGateway};
use brewkit_config::Config;
use brewkit_core::{BeverageStore, FileKeyValueStore, KeyValueStore};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a store
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "brewkit", &mut std::io::stdout());
            Ok(())
        }

        // All other commands go through a store
        cmd => {
            let cfg = load_config(&cli.global)?;
            let timeout = Duration::from_secs(cfg.gateway.timeout);

            if cli.global.demo {
                tracing::debug!("using in-memory demo store");
                let store = BeverageStore::new(demo::gateway(), cfg.to_store_config())?;
                return run_store(cmd, &store, "demo", &cli.global, timeout).await;
            }

            let gateway = RestGateway::new(&cfg.to_gateway_config()?).map_err(|e| {
                CliError::InitFailed {
                    url: cfg.gateway.url.clone(),
                    reason: e.to_string(),
                }
            })?;
            let store = build_store(gateway, &cfg, &cli.global)?;
            run_store(cmd, &store, &cfg.gateway.url, &cli.global, timeout).await
        }
    }
}

/// Load the config file (or `--config`), then apply flag overrides.
fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut cfg = match &global.config {
        Some(path) => brewkit_config::load_config_from(path)?,
        None => brewkit_config::load_config()?,
    };

    if let Some(url) = &global.url {
        cfg.gateway.url.clone_from(url);
    }
    if let Some(timeout) = global.timeout {
        cfg.gateway.timeout = timeout;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn build_store<G: Gateway>(
    gateway: G,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<BeverageStore<G>, CliError> {
    if global.no_persist || !cfg.store.persist {
        return Ok(BeverageStore::new(gateway, cfg.to_store_config())?);
    }

    let path = brewkit_config::state_path();
    tracing::debug!(path = %path.display(), "persisting selection");
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(path));
    Ok(BeverageStore::with_persistence(
        gateway,
        cfg.to_store_config(),
        kv,
    )?)
}

async fn run_store<G: Gateway>(
    cmd: Command,
    store: &BeverageStore<G>,
    source: &str,
    global: &GlobalOpts,
    timeout: Duration,
) -> Result<(), CliError> {
    tracing::debug!(command = ?cmd, source, "dispatching command");
    let result = commands::dispatch(cmd, store, source, global, timeout).await;
    store.shutdown().await;
    result
}
