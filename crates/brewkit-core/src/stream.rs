// ── Reactive streams ──
//
// Subscription types vended by the store. The UI holds one of these and
// re-renders whenever `changed()` resolves.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Beverage;
use crate::store::StoreState;

/// Saved beverages, newest first, as one immutable snapshot.
pub type BeverageSnapshot = Arc<Vec<Arc<Beverage>>>;

/// A subscription to the saved-beverage list.
///
/// Every server push replaces the list wholesale, so consumers always see
/// a complete snapshot rather than individual inserts.
pub struct BeverageStream {
    seen: BeverageSnapshot,
    receiver: watch::Receiver<BeverageSnapshot>,
}

impl BeverageStream {
    pub(crate) fn new(mut receiver: watch::Receiver<BeverageSnapshot>) -> Self {
        let seen = receiver.borrow_and_update().clone();
        Self { seen, receiver }
    }

    /// The list as of subscription, or as of the last `changed()`.
    pub fn current(&self) -> &BeverageSnapshot {
        &self.seen
    }

    /// The list right now.
    pub fn latest(&self) -> BeverageSnapshot {
        self.receiver.borrow().clone()
    }

    /// Whether the latest list holds `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.receiver.borrow().iter().any(|b| b.id == id)
    }

    /// Wait for the next push. `None` once the listener has let go of the list.
    pub async fn changed(&mut self) -> Option<BeverageSnapshot> {
        self.receiver.changed().await.ok()?;
        self.seen = self.receiver.borrow_and_update().clone();
        Some(Arc::clone(&self.seen))
    }

    /// Convert into a `Stream` yielding the current list, then every push.
    pub fn into_stream(self) -> WatchStream<BeverageSnapshot> {
        WatchStream::new(self.receiver)
    }
}

/// A subscription to the store's selection and status fields.
pub struct StateStream {
    receiver: watch::Receiver<StoreState>,
}

impl StateStream {
    pub(crate) fn new(receiver: watch::Receiver<StoreState>) -> Self {
        Self { receiver }
    }

    /// Latest state (cloned).
    pub fn latest(&self) -> StoreState {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<StoreState> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until `predicate` holds, returning the matching state.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&StoreState) -> bool) -> Option<StoreState> {
        let state = self.receiver.wait_for(predicate).await.ok()?;
        Some(state.clone())
    }

    /// Convert into a `Stream` of states.
    pub fn into_stream(self) -> WatchStream<StoreState> {
        WatchStream::new(self.receiver)
    }
}
