use thiserror::Error;

/// Top-level error type for the `brewkit-api` crate.
///
/// Covers every failure mode of the document store surfaces: HTTP
/// transport, response status, payload decoding, and the live-query
/// WebSocket. `brewkit-core` maps these into store-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built (TLS backend, bad header, ...).
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Response status ─────────────────────────────────────────────
    /// The store refused the request (HTTP 401 / 403).
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// The collection or document does not exist (HTTP 404).
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Any other non-success HTTP status.
    #[error("Document store error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Live queries ────────────────────────────────────────────────
    /// WebSocket connection failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// WebSocket closed unexpectedly.
    #[error("WebSocket closed (code {code}): {reason}")]
    WebSocketClosed { code: u16, reason: String },

    /// The store reported an error on an open live query.
    #[error("Live query error: {message}")]
    Listen { message: String },

    // ── In-process store ────────────────────────────────────────────
    /// The store is unavailable (used by `MemoryGateway` failure injection).
    #[error("Document store unavailable: {message}")]
    Unavailable { message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::WebSocketConnect(_) | Self::Unavailable { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::NotFound { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Status {
            status: 503,
            message: "overloaded".into(),
        };
        assert!(err.is_transient());

        let err = Error::Status {
            status: 400,
            message: "bad request".into(),
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn permission_denied_is_not_transient() {
        let err = Error::PermissionDenied {
            message: "missing rules".into(),
        };
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Permission denied: missing rules");
    }

    #[test]
    fn not_found_detection() {
        let err = Error::NotFound {
            path: "/collections/bases/documents".into(),
        };
        assert!(err.is_not_found());
        assert!(!Error::Unavailable { message: "x".into() }.is_not_found());
    }
}
