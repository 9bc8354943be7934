// ── Core error types ──
//
// Store-level errors. Consumers never see HTTP statuses or frame parsing
// failures directly; gateway errors are wrapped with the operation they
// interrupted.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Store lifecycle ──────────────────────────────────────────────
    /// An option collection could not be loaded during `init()`.
    #[error("failed to load {collection}: {source}")]
    Initialization {
        collection: String,
        #[source]
        source: brewkit_api::Error,
    },

    /// The live query reported an error. Non-fatal.
    #[error("beverage subscription error: {0}")]
    Subscription(#[source] brewkit_api::Error),

    // ── User actions ─────────────────────────────────────────────────
    /// Local validation rejected an action before it reached the gateway.
    #[error("{message}")]
    Validation { message: String },

    /// The gateway rejected a beverage write.
    #[error("failed to save beverage: {0}")]
    Write(#[source] brewkit_api::Error),

    // ── Data errors ──────────────────────────────────────────────────
    /// A document did not match the expected shape.
    #[error("malformed document {collection}/{id}: {source}")]
    Decode {
        collection: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded into document fields.
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    /// The static reference list is unusable.
    #[error("invalid reference data: {message}")]
    InvalidReferenceData { message: String },

    // ── Local persistence ────────────────────────────────────────────
    #[error("persistence error: {message}")]
    Persistence { message: String },

    // ── Pass-through ─────────────────────────────────────────────────
    #[error(transparent)]
    Gateway(#[from] brewkit_api::Error),
}

impl CoreError {
    /// Whether retrying the same action might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Initialization { source, .. } => source.is_transient(),
            Self::Subscription(e) | Self::Write(e) | Self::Gateway(e) => e.is_transient(),
            _ => false,
        }
    }
}
