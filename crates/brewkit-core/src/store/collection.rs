// ── Saved-beverage collection ──
//
// Split into a writer half, moved into the listener task, and a reader
// half kept by the store. Only the listener can change the list.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::Beverage;
use crate::stream::{BeverageSnapshot, BeverageStream};

/// Write access to the saved-beverage list.
pub(crate) struct SavedBeverages {
    snapshot: watch::Sender<BeverageSnapshot>,
    last_sync: watch::Sender<Option<DateTime<Utc>>>,
}

/// Read access to the saved-beverage list.
#[derive(Clone)]
pub(crate) struct SavedBeveragesReader {
    snapshot: watch::Receiver<BeverageSnapshot>,
    last_sync: watch::Receiver<Option<DateTime<Utc>>>,
}

/// Create an empty, never-synced collection.
pub(crate) fn saved_beverages() -> (SavedBeverages, SavedBeveragesReader) {
    let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Vec::new()));
    let (sync_tx, sync_rx) = watch::channel(None);

    (
        SavedBeverages {
            snapshot: snapshot_tx,
            last_sync: sync_tx,
        },
        SavedBeveragesReader {
            snapshot: snapshot_rx,
            last_sync: sync_rx,
        },
    )
}

impl SavedBeverages {
    /// Replace the whole list with a server snapshot, keeping its order.
    pub(crate) fn replace(&self, beverages: Vec<Beverage>) {
        let snapshot: Vec<Arc<Beverage>> = beverages.into_iter().map(Arc::new).collect();
        // `send_replace` updates unconditionally, even with zero receivers.
        self.snapshot.send_replace(Arc::new(snapshot));
        self.last_sync.send_replace(Some(Utc::now()));
    }

    /// Drop the local copy. The next server snapshot repopulates it.
    pub(crate) fn clear(&self) {
        self.snapshot.send_replace(Arc::new(Vec::new()));
    }
}

impl SavedBeveragesReader {
    pub(crate) fn snapshot(&self) -> BeverageSnapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn find(&self, id: &str) -> Option<Arc<Beverage>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|b| b.id == id)
            .map(Arc::clone)
    }

    pub(crate) fn subscribe(&self) -> BeverageStream {
        BeverageStream::new(self.snapshot.clone())
    }

    pub(crate) fn last_sync(&self) -> Option<DateTime<Utc>> {
        *self.last_sync.borrow()
    }

    /// Wait until at least one server snapshot has been applied.
    /// Returns `false` if the writer went away first.
    pub(crate) async fn wait_synced(&self) -> bool {
        let mut rx = self.last_sync.clone();
        rx.wait_for(Option::is_some).await.is_ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Component, Temperature};

    fn beverage(id: &str, created_at: i64) -> Beverage {
        let c = Component {
            id: "x".into(),
            name: "X".into(),
            color: "#000".into(),
        };
        Beverage {
            id: id.into(),
            name: id.to_uppercase(),
            base: c.clone(),
            creamer: c.clone(),
            syrup: c,
            temperature: Temperature {
                id: 1,
                name: "Hot".into(),
                value: "hot".into(),
            },
            created_at,
        }
    }

    #[test]
    fn replace_keeps_server_order() {
        let (writer, reader) = saved_beverages();
        writer.replace(vec![beverage("new", 2), beverage("old", 1)]);

        let snap = reader.snapshot();
        assert_eq!(snap[0].id, "new");
        assert_eq!(snap[1].id, "old");
        assert!(reader.last_sync().is_some());
        assert_eq!(reader.find("old").unwrap().created_at, 1);
    }

    #[test]
    fn clear_empties_but_keeps_sync_time() {
        let (writer, reader) = saved_beverages();
        writer.replace(vec![beverage("a", 1)]);
        writer.clear();

        assert!(reader.snapshot().is_empty());
        assert!(reader.find("a").is_none());
        assert!(reader.last_sync().is_some());
    }

    #[tokio::test]
    async fn wait_synced_fails_when_writer_dropped() {
        let (writer, reader) = saved_beverages();
        drop(writer);
        assert!(!reader.wait_synced().await);
    }
}
