// ── In-process document store ──
//
// Behaves like the remote store from the caller's point of view: ordered
// listings, overwrite-by-id writes, and live queries that push a fresh
// snapshot after every write. Also records call counts and supports
// failure injection so store behaviour can be exercised without a network.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::document::{Direction, Document, Fields, ListenQuery};
use crate::error::Error;
use crate::gateway::{Gateway, LiveEvent, LiveQuery};

/// A registered live query.
struct Listener {
    query: ListenQuery,
    tx: mpsc::Sender<LiveEvent>,
    cancel: CancellationToken,
}

#[derive(Default)]
struct MemoryState {
    /// Collection name -> documents in insertion order.
    collections: HashMap<String, Vec<Document>>,
    listeners: Vec<Listener>,
    /// Collections whose reads fail, with the failure message.
    failing_reads: HashMap<String, String>,
    failing_writes: Option<String>,
    failing_listen: Option<String>,
    list_calls: HashMap<String, usize>,
    write_calls: usize,
    latency: Option<Duration>,
}

/// In-memory [`Gateway`] implementation. Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct MemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl std::fmt::Debug for MemoryGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryGateway")
            .field("collections", &state.collections.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Seeding ──────────────────────────────────────────────────────

    /// Insert or overwrite a document without counting it as a client write.
    pub fn seed(&self, collection: &str, id: &str, fields: Fields) {
        let mut state = self.lock();
        upsert(&mut state, collection, Document::new(id, fields));
        notify(&mut state, collection);
    }

    /// Snapshot of a collection in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    // ── Failure injection ────────────────────────────────────────────

    /// Make every read of `collection` fail with `message`.
    pub fn fail_reads(&self, collection: &str, message: &str) {
        self.lock()
            .failing_reads
            .insert(collection.to_owned(), message.to_owned());
    }

    /// Make writes fail with `message`, or succeed again with `None`.
    pub fn fail_writes(&self, message: Option<&str>) {
        self.lock().failing_writes = message.map(str::to_owned);
    }

    /// Make opening live queries fail with `message`, or succeed again with `None`.
    pub fn fail_listen(&self, message: Option<&str>) {
        self.lock().failing_listen = message.map(str::to_owned);
    }

    /// Undo all injected failures.
    pub fn heal(&self) {
        let mut state = self.lock();
        state.failing_reads.clear();
        state.failing_writes = None;
        state.failing_listen = None;
    }

    /// Push an error to every open live query on `collection`.
    pub fn push_listen_error(&self, collection: &str, message: &str) {
        let mut state = self.lock();
        state.listeners.retain(|l| !l.cancel.is_cancelled() && !l.tx.is_closed());
        for listener in state.listeners.iter().filter(|l| l.query.collection == collection) {
            let event = LiveEvent::Error(Error::Listen {
                message: message.to_owned(),
            });
            if listener.tx.try_send(event).is_err() {
                warn!(collection, "live query buffer full, dropping error");
            }
        }
    }

    /// Delay every operation by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    // ── Call accounting ──────────────────────────────────────────────

    /// Number of `list_documents` calls made against `collection`.
    pub fn list_calls(&self, collection: &str) -> usize {
        self.lock().list_calls.get(collection).copied().unwrap_or(0)
    }

    /// Number of `set_document` calls made (successful or not).
    pub fn write_calls(&self) -> usize {
        self.lock().write_calls
    }

    /// Number of live queries still open.
    pub fn open_listeners(&self) -> usize {
        let mut state = self.lock();
        state.listeners.retain(|l| !l.cancel.is_cancelled() && !l.tx.is_closed());
        state.listeners.len()
    }

    async fn simulate_latency(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Gateway for MemoryGateway {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, Error> {
        self.simulate_latency().await;

        let mut state = self.lock();
        *state.list_calls.entry(collection.to_owned()).or_default() += 1;

        if let Some(message) = state.failing_reads.get(collection) {
            return Err(Error::Unavailable {
                message: message.clone(),
            });
        }

        let docs = state
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();
        debug!(collection, count = docs.len(), "listed documents");
        Ok(docs)
    }

    async fn set_document(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error> {
        self.simulate_latency().await;

        let mut state = self.lock();
        state.write_calls += 1;

        if let Some(ref message) = state.failing_writes {
            return Err(Error::Unavailable {
                message: message.clone(),
            });
        }

        upsert(&mut state, collection, Document::new(id, fields));
        notify(&mut state, collection);
        Ok(())
    }

    async fn listen(&self, query: ListenQuery) -> Result<LiveQuery, Error> {
        self.simulate_latency().await;

        let mut state = self.lock();
        if let Some(ref message) = state.failing_listen {
            return Err(Error::Unavailable {
                message: message.clone(),
            });
        }

        let cancel = CancellationToken::new();
        let (tx, live) = LiveQuery::channel(cancel.clone());

        // Initial snapshot goes out before any later change can.
        let initial = ordered_snapshot(&state, &query);
        if tx.try_send(LiveEvent::Snapshot(initial)).is_err() {
            warn!(collection = %query.collection, "failed to deliver initial snapshot");
        }

        state.listeners.push(Listener { query, tx, cancel });
        Ok(live)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Overwrite a document in place, or append it.
fn upsert(state: &mut MemoryState, collection: &str, doc: Document) {
    let docs = state.collections.entry(collection.to_owned()).or_default();
    match docs.iter_mut().find(|d| d.id == doc.id) {
        Some(existing) => *existing = doc,
        None => docs.push(doc),
    }
}

/// Push a fresh snapshot to every open query on `collection`.
fn notify(state: &mut MemoryState, collection: &str) {
    state.listeners.retain(|l| !l.cancel.is_cancelled() && !l.tx.is_closed());

    for listener in state.listeners.iter().filter(|l| l.query.collection == collection) {
        let snapshot = ordered_snapshot(state, &listener.query);
        if listener.tx.try_send(LiveEvent::Snapshot(snapshot)).is_err() {
            warn!(collection, "live query buffer full, dropping snapshot");
        }
    }
}

fn ordered_snapshot(state: &MemoryState, query: &ListenQuery) -> Vec<Document> {
    let mut docs = state
        .collections
        .get(&query.collection)
        .cloned()
        .unwrap_or_default();

    // Stable sort keeps insertion order among equal keys.
    docs.sort_by(|a, b| {
        let ord = compare_values(a.fields.get(&query.order_by), b.fields.get(&query.order_by));
        match query.direction {
            Direction::Asc => ord,
            Direction::Desc => ord.reverse(),
        }
    });
    docs
}

/// Total order over JSON scalars: missing < numbers < strings < everything else.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(_) => 3,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .unwrap_or_default()
                .total_cmp(&y.as_f64().unwrap_or_default()),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn list_preserves_insertion_order_and_counts_calls() {
        let gw = MemoryGateway::new();
        gw.seed("bases", "coffee", fields(json!({ "name": "Coffee" })));
        gw.seed("bases", "tea", fields(json!({ "name": "Tea" })));

        let docs = gw.list_documents("bases").await.unwrap();
        assert_eq!(docs.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), ["coffee", "tea"]);
        assert_eq!(gw.list_calls("bases"), 1);
        assert_eq!(gw.list_calls("syrups"), 0);
    }

    #[tokio::test]
    async fn set_document_overwrites_same_id() {
        let gw = MemoryGateway::new();
        gw.set_document("beverages", "b1", fields(json!({ "name": "One" })))
            .await
            .unwrap();
        gw.set_document("beverages", "b1", fields(json!({ "name": "Uno" })))
            .await
            .unwrap();

        let docs = gw.documents("beverages");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields["name"], "Uno");
        assert_eq!(gw.write_calls(), 2);
    }

    #[tokio::test]
    async fn listen_pushes_ordered_snapshots() {
        let gw = MemoryGateway::new();
        gw.seed("beverages", "old", fields(json!({ "createdAt": 1 })));

        let mut live = gw
            .listen(ListenQuery::newest_first("beverages", "createdAt"))
            .await
            .unwrap();

        let Some(LiveEvent::Snapshot(initial)) = live.next().await else {
            panic!("expected initial snapshot");
        };
        assert_eq!(initial.len(), 1);

        gw.set_document("beverages", "new", fields(json!({ "createdAt": 5 })))
            .await
            .unwrap();

        let Some(LiveEvent::Snapshot(next)) = live.next().await else {
            panic!("expected pushed snapshot");
        };
        assert_eq!(next.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), ["new", "old"]);
    }

    #[tokio::test]
    async fn injected_failures_surface_as_unavailable() {
        let gw = MemoryGateway::new();
        gw.fail_reads("creamers", "offline");
        gw.fail_writes(Some("read-only"));

        let err = gw.list_documents("creamers").await.unwrap_err();
        assert!(matches!(err, Error::Unavailable { ref message } if message == "offline"));
        assert!(gw.list_documents("bases").await.is_ok());

        let err = gw
            .set_document("beverages", "b1", Fields::new())
            .await
            .unwrap_err();
        assert!(err.is_transient());

        gw.heal();
        assert!(gw.list_documents("creamers").await.is_ok());
    }

    #[tokio::test]
    async fn dropped_query_is_unregistered() {
        let gw = MemoryGateway::new();
        let live = gw
            .listen(ListenQuery::newest_first("beverages", "createdAt"))
            .await
            .unwrap();
        assert_eq!(gw.open_listeners(), 1);

        drop(live);
        assert_eq!(gw.open_listeners(), 0);
    }

    #[test]
    fn numbers_sort_before_strings_and_missing_first() {
        assert_eq!(compare_values(Some(&json!(2)), Some(&json!(10))), Ordering::Less);
        assert_eq!(compare_values(None, Some(&json!(1))), Ordering::Less);
        assert_eq!(compare_values(Some(&json!(1.5)), Some(&json!("a"))), Ordering::Less);
    }
}
