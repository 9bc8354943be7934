//! Live queries over WebSocket with auto-reconnect.
//!
//! The store pushes a full ordered snapshot of the collection on connect and
//! after every change. Frames are JSON:
//!
//! ```json
//! { "type": "snapshot", "documents": [ { "id": "...", "fields": { } } ] }
//! { "type": "error", "message": "..." }
//! ```
//!
//! Connection failures are reported on the query as [`LiveEvent::Error`]
//! and the loop reconnects with exponential backoff + jitter until the
//! query is cancelled or dropped.

use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::document::{Document, ListenQuery};
use crate::error::Error;
use crate::gateway::{LiveEvent, LiveQuery};

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for live-query reconnection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── Entry point ──────────────────────────────────────────────────────

/// Build the listen endpoint for `query` under `live_base`.
pub(crate) fn listen_url(live_base: &Url, query: &ListenQuery) -> Result<Url, Error> {
    let base = live_base.as_str().trim_end_matches('/');
    let mut url = Url::parse(&format!(
        "{base}/collections/{}/listen",
        query.collection
    ))?;
    url.query_pairs_mut()
        .append_pair("orderBy", &query.order_by)
        .append_pair("direction", query.direction.as_str());
    Ok(url)
}

/// Spawn the reconnect loop and hand back the query handle.
pub(crate) fn spawn_live_query(url: Url, reconnect: ReconnectConfig) -> LiveQuery {
    let cancel = CancellationToken::new();
    let (tx, query) = LiveQuery::channel(cancel.clone());

    tokio::spawn(async move {
        live_loop(url, tx, reconnect, cancel).await;
    });

    query
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read → on error, report + backoff → reconnect.
async fn live_loop(
    url: Url,
    tx: mpsc::Sender<LiveEvent>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, &tx, &cancel) => result,
        };

        match result {
            // Clean disconnect: reconnect immediately.
            Ok(()) => {
                if cancel.is_cancelled() || tx.is_closed() {
                    break;
                }
                tracing::info!("live query disconnected cleanly, reconnecting");
                attempt = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "live query error");
                if tx.send(LiveEvent::Error(e)).await.is_err() {
                    break;
                }

                if let Some(max) = reconnect.max_retries {
                    if attempt >= max {
                        tracing::error!(
                            max_retries = max,
                            "live query reconnection limit reached, giving up"
                        );
                        break;
                    }
                }

                let delay = calculate_backoff(attempt, &reconnect);
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }

                attempt = attempt.saturating_add(1);
            }
        }
    }

    tracing::debug!(url = %url, "live query loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish a single WebSocket connection and forward frames until it drops.
async fn connect_and_read(
    url: &Url,
    tx: &mpsc::Sender<LiveEvent>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "opening live query");

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()))?;

    let (ws_stream, _response) = tokio_tungstenite::connect_async(ClientRequestBuilder::new(uri))
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::debug!("live query connected");

    let (_write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return Ok(()),
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        let Some(event) = parse_frame(text.as_str()) else { continue };
                        if tx.send(event).await.is_err() {
                            // Receiver gone: nobody is listening any more.
                            return Ok(());
                        }
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        return match frame {
                            Some(cf) if cf.code != tungstenite::protocol::frame::coding::CloseCode::Normal => {
                                Err(Error::WebSocketClosed {
                                    code: cf.code.into(),
                                    reason: cf.reason.to_string(),
                                })
                            }
                            _ => Ok(()),
                        };
                    }
                    Some(Err(e)) => return Err(Error::WebSocketConnect(e.to_string())),
                    None => {
                        tracing::info!("live query stream ended");
                        return Ok(());
                    }
                    // Ping / Pong / Binary / Frame: tungstenite answers pings itself.
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

// ── Frame parsing ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ListenFrame {
    Snapshot {
        #[serde(default)]
        documents: Vec<Document>,
    },
    Error {
        message: String,
    },
}

/// Parse a text frame. Unknown or malformed frames are dropped.
fn parse_frame(text: &str) -> Option<LiveEvent> {
    match serde_json::from_str::<ListenFrame>(text) {
        Ok(ListenFrame::Snapshot { documents }) => {
            tracing::trace!(count = documents.len(), "live snapshot received");
            Some(LiveEvent::Snapshot(documents))
        }
        Ok(ListenFrame::Error { message }) => Some(LiveEvent::Error(Error::Listen { message })),
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse live query frame");
            None
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_reconnect_config() {
        let config = ReconnectConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = ReconnectConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = ReconnectConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = calculate_backoff(10, &config);
        assert!(
            d10 <= Duration::from_millis(12_500),
            "delay at attempt 10 ({d10:?}) should be capped near max_delay"
        );
    }

    #[test]
    fn listen_url_carries_ordering() {
        let base: Url = "ws://localhost:8080/v1/".parse().unwrap();
        let query = ListenQuery::newest_first("beverages", "createdAt");
        let url = listen_url(&base, &query).unwrap();
        assert_eq!(
            url.as_str(),
            "ws://localhost:8080/v1/collections/beverages/listen?orderBy=createdAt&direction=desc"
        );
    }

    #[test]
    fn parse_snapshot_frame() {
        let text = r#"{
            "type": "snapshot",
            "documents": [
                { "id": "b2", "fields": { "name": "Late", "createdAt": 2 } },
                { "id": "b1", "fields": { "name": "Early", "createdAt": 1 } }
            ]
        }"#;

        let Some(LiveEvent::Snapshot(docs)) = parse_frame(text) else {
            panic!("expected a snapshot event");
        };
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "b2");
        assert_eq!(docs[1].fields["name"], "Early");
    }

    #[test]
    fn parse_error_frame() {
        let text = r#"{ "type": "error", "message": "permission denied" }"#;
        let Some(LiveEvent::Error(Error::Listen { message })) = parse_frame(text) else {
            panic!("expected a listen error");
        };
        assert_eq!(message, "permission denied");
    }

    #[test]
    fn unknown_frames_are_dropped() {
        assert!(parse_frame(r#"{ "type": "heartbeat" }"#).is_none());
        assert!(parse_frame("not json").is_none());
    }
}
