// ── Gateway abstraction ──
//
// The seam between the store and whatever document database backs it.
// Implementations must be shareable across tasks; the returned futures
// are `Send` so the store can drive them from spawned tasks.

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::document::{Document, Fields, ListenQuery};
use crate::error::Error;

/// Capacity of the per-query event channel.
pub(crate) const LIVE_CHANNEL_CAPACITY: usize = 64;

/// Operations the beverage store consumes from the document store.
pub trait Gateway: Send + Sync + 'static {
    /// Fetch every document in `collection`, in store-provided order.
    fn list_documents(
        &self,
        collection: &str,
    ) -> impl Future<Output = Result<Vec<Document>, Error>> + Send;

    /// Create or overwrite `collection/{id}` with `fields`.
    fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Open a standing ordered query.
    ///
    /// The first event is the current snapshot; every later change to the
    /// collection produces another full snapshot.
    fn listen(&self, query: ListenQuery) -> impl Future<Output = Result<LiveQuery, Error>> + Send;
}

/// One delivery on a live query.
#[derive(Debug)]
pub enum LiveEvent {
    /// Full ordered listing of the collection.
    Snapshot(Vec<Document>),
    /// A non-fatal error. The query stays open.
    Error(Error),
}

/// Handle to an open live query.
///
/// Dropping the handle cancels the background feed.
#[derive(Debug)]
pub struct LiveQuery {
    events: mpsc::Receiver<LiveEvent>,
    cancel: CancellationToken,
}

impl LiveQuery {
    pub(crate) fn new(events: mpsc::Receiver<LiveEvent>, cancel: CancellationToken) -> Self {
        Self { events, cancel }
    }

    /// Build a query handle plus the sender half that feeds it.
    pub(crate) fn channel(cancel: CancellationToken) -> (mpsc::Sender<LiveEvent>, Self) {
        let (tx, rx) = mpsc::channel(LIVE_CHANNEL_CAPACITY);
        (tx, Self::new(rx, cancel))
    }

    /// Wait for the next event. Returns `None` once the feed has ended.
    pub async fn next(&mut self) -> Option<LiveEvent> {
        self.events.recv().await
    }

    /// Stop the background feed.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for LiveQuery {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
