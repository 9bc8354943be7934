// ── BeverageStore ──
//
// Owns the selection state, runs one-time initialization against the
// gateway, and keeps a listener task attached to the saved-beverage query.

use std::sync::{Arc, Mutex, PoisonError};

use brewkit_api::{Gateway, ListenQuery};
use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::collection::{SavedBeverages, SavedBeveragesReader, saved_beverages};
use super::listener::{COMMAND_CHANNEL_SIZE, ListenerCommand, beverage_listener_task};
use super::state::{Alert, StoreState, StoreStatus};
use super::{BEVERAGES, CREATED_AT};
use crate::config::StoreConfig;
use crate::convert::{component_from_document, to_fields};
use crate::error::CoreError;
use crate::model::{Base, Beverage, Component, ComponentKind, Creamer, Syrup, Temperature};
use crate::persist::{KeyValueStore, PersistedSelection};
use crate::reference::{format_temperatures, validate_temperature_names};
use crate::stream::{BeverageSnapshot, BeverageStream, StateStream};

const ALERT_CHANNEL_SIZE: usize = 16;

type InitFuture = BoxFuture<'static, bool>;

/// Handle to a beverage store.
///
/// Cheaply cloneable; clones share state, the init attempt, and the
/// listener task. Construct one per application and pass it to the UI.
pub struct BeverageStore<G: Gateway> {
    inner: Arc<StoreInner<G>>,
}

impl<G: Gateway> Clone for BeverageStore<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct StoreInner<G> {
    gateway: G,
    config: StoreConfig,
    state: Arc<watch::Sender<StoreState>>,
    saved: SavedBeveragesReader,
    alert_tx: broadcast::Sender<Alert>,
    command_tx: mpsc::Sender<ListenerCommand>,
    /// Handed to the listener task when it starts.
    listener_parts: Mutex<Option<ListenerParts>>,
    /// The running listener; joining it yields the list writer back.
    listener_task: tokio::sync::Mutex<Option<JoinHandle<SavedBeverages>>>,
    /// Writer returned by a stopped listener.
    idle_writer: Mutex<Option<SavedBeverages>>,
    /// Weak so an attempt nobody awaits any more is dropped with its store.
    init_flight: tokio::sync::Mutex<Option<WeakShared<InitFuture>>>,
    persistence: Option<Arc<dyn KeyValueStore>>,
    cancel: CancellationToken,
}

struct ListenerParts {
    saved: SavedBeverages,
    commands: mpsc::Receiver<ListenerCommand>,
}

/// Clears `is_loading` however initialization exits.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<StoreState>,
}

impl<'a> LoadingGuard<'a> {
    fn begin(state: &'a watch::Sender<StoreState>) -> Self {
        state.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.is_loading = false);
    }
}

impl<G: Gateway> BeverageStore<G> {
    /// Create a store without local persistence. Does not touch the
    /// gateway; call [`init()`](Self::init) for that.
    pub fn new(gateway: G, config: StoreConfig) -> Result<Self, CoreError> {
        Self::build(gateway, config, None)
    }

    /// Create a store that restores and saves the in-progress name and
    /// temperature through `persistence`, keyed by the store name.
    pub fn with_persistence(
        gateway: G,
        config: StoreConfig,
        persistence: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        Self::build(gateway, config, Some(persistence))
    }

    fn build(
        gateway: G,
        config: StoreConfig,
        persistence: Option<Arc<dyn KeyValueStore>>,
    ) -> Result<Self, CoreError> {
        validate_temperature_names(&config.temperatures)?;
        let mut initial = StoreState::new(format_temperatures(&config.temperatures));

        if let Some(kv) = persistence.as_deref() {
            hydrate(&mut initial, kv, &config.store_name);
        }

        let (state, _) = watch::channel(initial);
        let (saved_writer, saved) = saved_beverages();
        let (alert_tx, _) = broadcast::channel(ALERT_CHANNEL_SIZE);
        let (command_tx, commands) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Ok(Self {
            inner: Arc::new(StoreInner {
                gateway,
                config,
                state: Arc::new(state),
                saved,
                alert_tx,
                command_tx,
                listener_parts: Mutex::new(Some(ListenerParts {
                    saved: saved_writer,
                    commands,
                })),
                listener_task: tokio::sync::Mutex::new(None),
                idle_writer: Mutex::new(None),
                init_flight: tokio::sync::Mutex::new(None),
                persistence,
                cancel: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    // ── Initialization ───────────────────────────────────────────────

    /// Load the option collections, pick defaults, and start listening to
    /// saved beverages.
    ///
    /// Returns `true` once initialized; later calls return `true` without
    /// contacting the gateway. Concurrent callers share one attempt; if every
    /// caller gives up on it, the attempt is dropped. On failure the message
    /// lands in `error` and the next call retries.
    pub async fn init(&self) -> bool {
        if self.is_initialized() {
            debug!("store already initialized, skipping");
            return true;
        }

        let flight = {
            let mut slot = self.inner.init_flight.lock().await;
            if let Some(flight) = slot.as_ref().and_then(WeakShared::upgrade) {
                debug!("joining in-flight initialization");
                flight
            } else {
                let store = self.clone();
                let flight: Shared<InitFuture> = async move {
                    let ok = store.run_init().await;
                    store.inner.init_flight.lock().await.take();
                    ok
                }
                .boxed()
                .shared();
                *slot = flight.downgrade();
                flight
            }
        };

        flight.await
    }

    async fn run_init(&self) -> bool {
        if self.is_initialized() {
            return true;
        }

        let _loading = LoadingGuard::begin(&self.inner.state);
        info!("initializing beverage store");

        match self.load_options().await {
            Ok(()) => {
                self.inner.state.send_modify(|s| s.is_initialized = true);
                info!("beverage store initialized");
                true
            }
            Err(e) => {
                warn!(error = %e, "beverage store initialization failed");
                let message = e.to_string();
                self.inner.state.send_modify(|s| s.error = Some(message));
                false
            }
        }
    }

    async fn load_options(&self) -> Result<(), CoreError> {
        for kind in ComponentKind::ALL {
            let components = self.fetch_components(kind).await?;
            debug!(%kind, count = components.len(), "loaded options");
            self.inner
                .state
                .send_modify(|s| s.set_components(kind, components));
        }

        self.inner
            .state
            .send_modify(StoreState::apply_default_components);

        self.setup_beverage_listener().await
    }

    async fn fetch_components(&self, kind: ComponentKind) -> Result<Vec<Component>, CoreError> {
        let collection = kind.collection();
        let docs = self
            .inner
            .gateway
            .list_documents(collection)
            .await
            .map_err(|source| CoreError::Initialization {
                collection: collection.to_owned(),
                source,
            })?;

        docs.into_iter()
            .map(|doc| component_from_document(collection, doc))
            .collect()
    }

    /// Open the saved-beverage query and hand it to the listener task.
    ///
    /// At most one listener ever runs per store; once its parts have been
    /// taken this is a no-op.
    async fn setup_beverage_listener(&self) -> Result<(), CoreError> {
        if !self.listener_parts_available() {
            return Ok(());
        }

        let query = ListenQuery::newest_first(BEVERAGES, CREATED_AT);
        let live = self
            .inner
            .gateway
            .listen(query)
            .await
            .map_err(|source| CoreError::Initialization {
                collection: BEVERAGES.to_owned(),
                source,
            })?;

        let parts = self
            .inner
            .listener_parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(ListenerParts { saved, commands }) = parts else {
            return Ok(());
        };

        let handle = tokio::spawn(beverage_listener_task(
            live,
            saved,
            Arc::clone(&self.inner.state),
            commands,
            self.inner.cancel.child_token(),
        ));
        *self.inner.listener_task.lock().await = Some(handle);
        debug!("beverage listener started");
        Ok(())
    }

    fn listener_parts_available(&self) -> bool {
        self.inner
            .listener_parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    // ── Actions ──────────────────────────────────────────────────────

    /// Save the current selection as a new beverage.
    ///
    /// Validation failures and gateway rejections raise an [`Alert`]. The
    /// saved list is not touched; the live query delivers the new record.
    pub async fn make_beverage(&self) -> Result<Beverage, CoreError> {
        let draft = self.inner.state.borrow().draft();
        let draft = match draft {
            Ok(draft) => draft,
            Err(e) => {
                debug!(error = %e, "beverage rejected");
                self.alert(e.to_string());
                return Err(e);
            }
        };

        let beverage = Beverage::new(
            draft.name,
            draft.base,
            draft.creamer,
            draft.syrup,
            draft.temperature,
        );
        let fields = to_fields(&beverage)?;

        match self
            .inner
            .gateway
            .set_document(BEVERAGES, &beverage.id, fields)
            .await
        {
            Ok(()) => {
                info!(id = %beverage.id, name = %beverage.name, "saved beverage");
                self.inner.state.send_modify(|s| s.beverage_name.clear());
                self.persist_selection();
                Ok(beverage)
            }
            Err(e) => {
                warn!(id = %beverage.id, error = %e, "failed to save beverage");
                self.alert(format!("Failed to save beverage: {e}"));
                let err = CoreError::Write(e);
                let message = err.to_string();
                self.inner.state.send_modify(|s| s.error = Some(message));
                Err(err)
            }
        }
    }

    /// Load a saved beverage's components into the current selection.
    ///
    /// Returns `false`, changing nothing, when `id` is not in the local list.
    pub fn show_beverage(&self, id: &str) -> bool {
        let Some(beverage) = self.inner.saved.find(id) else {
            debug!(id, "show_beverage: unknown id");
            return false;
        };

        self.inner.state.send_modify(|s| {
            s.selected_beverage_id = Some(beverage.id.clone());
            s.current_base = Some(beverage.base.clone());
            s.current_creamer = Some(beverage.creamer.clone());
            s.current_syrup = Some(beverage.syrup.clone());
            s.current_temp = Some(beverage.temperature.clone());
        });
        self.persist_selection();
        true
    }

    pub fn set_base(&self, base: Base) {
        self.inner.state.send_modify(|s| s.current_base = Some(base));
    }

    pub fn set_creamer(&self, creamer: Creamer) {
        self.inner
            .state
            .send_modify(|s| s.current_creamer = Some(creamer));
    }

    pub fn set_syrup(&self, syrup: Syrup) {
        self.inner.state.send_modify(|s| s.current_syrup = Some(syrup));
    }

    pub fn set_temperature(&self, temperature: Temperature) {
        self.inner
            .state
            .send_modify(|s| s.current_temp = Some(temperature));
        self.persist_selection();
    }

    pub fn set_beverage_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.inner.state.send_modify(|s| s.beverage_name = name);
        self.persist_selection();
    }

    /// Drop the local copy of saved beverages and the selected pointer.
    ///
    /// The gateway and the live query are untouched; the next push, if the
    /// listener is still running, repopulates the list.
    pub async fn clear_local_beverages(&self) {
        self.inner
            .state
            .send_modify(|s| s.selected_beverage_id = None);

        if self.clear_idle_writer() {
            return;
        }

        let (ack, done) = oneshot::channel();
        let served = self
            .inner
            .command_tx
            .send(ListenerCommand::Clear { ack })
            .await
            .is_ok()
            && done.await.is_ok();
        if served {
            return;
        }

        // The listener exited without serving the command: take its writer back.
        self.join_listener().await;
        if !self.clear_idle_writer() {
            warn!("saved beverages writer lost, local list not cleared");
        }
    }

    /// Clear through a writer no task owns. `false` while the listener holds it.
    fn clear_idle_writer(&self) -> bool {
        if let Some(parts) = self
            .inner
            .listener_parts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            parts.saved.clear();
            return true;
        }

        match self
            .inner
            .idle_writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(writer) => {
                writer.clear();
                true
            }
            None => false,
        }
    }

    /// Restore default selections and clear the name and selected pointer.
    /// Loaded option lists are kept.
    pub fn reset(&self) {
        self.inner.state.send_modify(StoreState::reset_selection);
        self.persist_selection();
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Current state (cloned).
    pub fn state(&self) -> StoreState {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> StoreStatus {
        self.inner.state.borrow().status()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.borrow().is_initialized
    }

    /// Subscribe to selection and status changes.
    pub fn subscribe(&self) -> StateStream {
        StateStream::new(self.inner.state.subscribe())
    }

    /// Saved beverages, newest first, as last pushed by the live query.
    pub fn saved_beverages(&self) -> BeverageSnapshot {
        self.inner.saved.snapshot()
    }

    /// Subscribe to the saved-beverage list.
    pub fn subscribe_beverages(&self) -> BeverageStream {
        self.inner.saved.subscribe()
    }

    /// Blocking user-facing messages raised by actions.
    pub fn alerts(&self) -> broadcast::Receiver<Alert> {
        self.inner.alert_tx.subscribe()
    }

    /// When the saved list last received a server snapshot.
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.inner.saved.last_sync()
    }

    /// Wait for the first server snapshot of saved beverages.
    ///
    /// Returns `false` if the listener stopped before one arrived.
    pub async fn synced(&self) -> bool {
        self.inner.saved.wait_synced().await
    }

    // ── Shutdown ─────────────────────────────────────────────────────

    /// Stop the listener task and wait for it to exit.
    ///
    /// The store stays readable afterwards but receives no more pushes.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.join_listener().await;
        debug!("beverage store shut down");
    }

    /// Wait for a cancelled listener to exit and keep the writer it returns.
    async fn join_listener(&self) {
        let mut task = self.inner.listener_task.lock().await;
        let Some(handle) = task.take() else {
            return;
        };

        match handle.await {
            Ok(writer) => {
                *self
                    .inner
                    .idle_writer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(writer);
            }
            Err(e) => warn!(error = %e, "beverage listener task failed"),
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn alert(&self, message: String) {
        // No subscribers is fine; the caller also gets the error.
        let _ = self.inner.alert_tx.send(Alert { message });
    }

    fn persist_selection(&self) {
        let Some(kv) = self.inner.persistence.as_deref() else {
            return;
        };

        let selection = {
            let state = self.inner.state.borrow();
            PersistedSelection {
                beverage_name: state.beverage_name.clone(),
                current_temp: state.current_temp.clone(),
            }
        };

        if let Err(e) = selection.save(kv, &self.inner.config.store_name) {
            warn!(error = %e, "failed to persist selection");
        }
    }
}

/// Apply a previously saved selection. Bad or stale data is ignored.
fn hydrate(state: &mut StoreState, kv: &dyn KeyValueStore, key: &str) {
    let selection = match PersistedSelection::load(kv, key) {
        Ok(Some(selection)) => selection,
        Ok(None) => return,
        Err(e) => {
            warn!(error = %e, "ignoring saved selection");
            return;
        }
    };

    state.beverage_name = selection.beverage_name;
    match selection.current_temp {
        Some(temp) if state.temps.contains(&temp) => state.current_temp = Some(temp),
        Some(temp) => debug!(name = %temp.name, "saved temperature no longer offered"),
        None => {}
    }
    debug!(key, "restored saved selection");
}

impl<G: Gateway> std::fmt::Debug for BeverageStore<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BeverageStore")
            .field("store_name", &self.inner.config.store_name)
            .field("status", &self.status())
            .field("saved", &self.inner.saved.snapshot().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use brewkit_api::MemoryGateway;
    use serde_json::json;

    use super::*;

    fn gateway() -> MemoryGateway {
        let gw = MemoryGateway::new();
        for (collection, id, name) in [
            ("bases", "black-tea", "Black Tea"),
            ("creamers", "milk", "Milk"),
            ("syrups", "vanilla", "Vanilla"),
        ] {
            let fields = json!({ "name": name, "color": "#6f4e37" });
            gw.seed(collection, id, fields.as_object().cloned().unwrap());
        }
        gw
    }

    #[tokio::test]
    async fn abandoned_init_releases_the_store() {
        let gw = gateway();
        gw.set_latency(Some(Duration::from_secs(60)));
        let store = BeverageStore::new(gw, StoreConfig::default()).unwrap();
        let weak = Arc::downgrade(&store.inner);

        let attempt = tokio::time::timeout(Duration::from_millis(20), store.init()).await;
        assert!(attempt.is_err());
        assert!(!store.state().is_loading);

        drop(store);
        assert!(weak.upgrade().is_none());
    }

    #[tokio::test]
    async fn init_after_abandoned_attempt_starts_fresh() {
        let gw = gateway();
        gw.set_latency(Some(Duration::from_secs(60)));
        let store = BeverageStore::new(gw.clone(), StoreConfig::default()).unwrap();

        let attempt = tokio::time::timeout(Duration::from_millis(20), store.init()).await;
        assert!(attempt.is_err());

        gw.set_latency(None);
        assert!(store.init().await);
        assert!(store.is_initialized());
        store.shutdown().await;
    }
}
