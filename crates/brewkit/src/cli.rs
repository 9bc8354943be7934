//! Clap derive structures for the `brewkit` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// brewkit -- build, save, and browse beverages
#[derive(Debug, Parser)]
#[command(
    name = "brewkit",
    version,
    about = "Build beverages and browse the saved collection",
    long_about = "Pick a base, creamer, syrup, and temperature, name the combination,\n\
        and save it to a shared document store. Saved beverages stream back\n\
        live, newest first.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "BREWKIT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Document store URL (overrides config)
    #[arg(long, short = 'u', env = "BREWKIT_URL", global = true)]
    pub url: Option<String>,

    /// Use a built-in in-memory store with sample data
    #[arg(long, env = "BREWKIT_DEMO", global = true)]
    pub demo: bool,

    /// Do not restore or save the in-progress selection
    #[arg(long, global = true)]
    pub no_persist: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BREWKIT_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "BREWKIT_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List available bases, creamers, syrups, and temperatures
    #[command(alias = "opts")]
    Options(OptionsArgs),

    /// Make, list, and inspect saved beverages
    #[command(alias = "bev", alias = "b")]
    Beverages(BeveragesArgs),

    /// Show or edit the in-progress beverage
    Draft(DraftArgs),

    /// Stream saved-beverage updates until interrupted
    Watch(WatchArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Options ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct OptionsArgs {
    /// Only list one kind
    pub kind: Option<OptionKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OptionKind {
    Bases,
    Creamers,
    Syrups,
    #[value(alias = "temps")]
    Temperatures,
}

// ── Beverages ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BeveragesArgs {
    #[command(subcommand)]
    pub command: BeveragesCommand,
}

#[derive(Debug, Subcommand)]
pub enum BeveragesCommand {
    /// List saved beverages, newest first
    #[command(alias = "ls")]
    List,

    /// Show a saved beverage's recipe
    Show {
        /// Beverage ID
        id: String,
    },

    /// Save a new beverage from the current selection
    Make(MakeArgs),
}

#[derive(Debug, Args)]
pub struct MakeArgs {
    /// Beverage name (defaults to the draft name)
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Return once the write succeeds instead of waiting for the saved list
    #[arg(long)]
    pub no_wait: bool,
}

/// Component choices, by id or case-insensitive name.
#[derive(Debug, Args)]
pub struct SelectionArgs {
    /// Base (id or name)
    #[arg(long)]
    pub base: Option<String>,

    /// Creamer (id or name)
    #[arg(long)]
    pub creamer: Option<String>,

    /// Syrup (id or name)
    #[arg(long)]
    pub syrup: Option<String>,

    /// Temperature (id or name)
    #[arg(long, short = 't')]
    pub temp: Option<String>,
}

// ── Draft ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DraftArgs {
    #[command(subcommand)]
    pub command: Option<DraftCommand>,
}

#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Show the in-progress beverage (default)
    Show,

    /// Set the draft name and/or temperature
    Set {
        /// Beverage name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Temperature (id or name)
        #[arg(long, short = 't')]
        temp: Option<String>,
    },

    /// Restore default selections and clear the name
    Reset,
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many updates
    #[arg(long)]
    pub count: Option<usize>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with defaults
    Init {
        /// Document store URL
        #[arg(long)]
        url: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a single value (e.g. `gateway.url`, `store.temperatures`)
    Set {
        /// Dotted key
        key: String,
        /// New value (comma-separated for lists)
        value: String,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
