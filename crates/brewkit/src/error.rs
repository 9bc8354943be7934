//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use brewkit_config::ConfigError;
use brewkit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Store ────────────────────────────────────────────────────────

    #[error("Could not load options from {url}")]
    #[diagnostic(
        code(brewkit::init_failed),
        help(
            "Check that the document store is running and reachable.\n\
             Reason: {reason}\n\
             Try: brewkit --demo options"
        )
    )]
    InitFailed { url: String, reason: String },

    #[error("Access to the document store was denied")]
    #[diagnostic(
        code(brewkit::permission_denied),
        help("The store rejected the request: {message}")
    )]
    PermissionDenied { message: String },

    #[error("Failed to save beverage")]
    #[diagnostic(code(brewkit::save_failed), help("{message}"))]
    SaveFailed { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(brewkit::not_found),
        help("Run: brewkit {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(brewkit::rejected))]
    Rejected { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(brewkit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(brewkit::config),
        help("Inspect the effective configuration with: brewkit config show")
    )]
    Config(#[from] ConfigError),

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(brewkit::config_exists), help("Pass --force to overwrite it."))]
    ConfigExists { path: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Timed out after {seconds}s waiting for {what}")]
    #[diagnostic(
        code(brewkit::timeout),
        help("Increase the timeout with --timeout or check the live-query endpoint.")
    )]
    Timeout { what: String, seconds: u64 },

    // ── Everything else ──────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(brewkit::store))]
    Store { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(brewkit::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InitFailed { .. } => exit_code::CONNECTION,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Rejected { .. }
            | Self::Validation { .. }
            | Self::Config(_)
            | Self::ConfigExists { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => Self::Rejected { message },

            CoreError::Write(brewkit_api::Error::PermissionDenied { message }) => {
                Self::PermissionDenied { message }
            }

            CoreError::Write(source) => Self::SaveFailed {
                message: source.to_string(),
            },

            CoreError::InvalidReferenceData { message } => Self::Validation {
                field: "store.temperatures".into(),
                reason: message,
            },

            other => Self::Store {
                message: other.to_string(),
            },
        }
    }
}
