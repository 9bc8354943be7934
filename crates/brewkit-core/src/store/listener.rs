// ── Beverage listener task ──
//
// Single writer of the saved-beverage list. Snapshots from the live query
// replace the list; store actions that need to touch it send a command.

use std::sync::Arc;

use brewkit_api::{Document, LiveEvent, LiveQuery};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::collection::SavedBeverages;
use super::state::StoreState;
use super::BEVERAGES;
use crate::convert::beverage_from_document;
use crate::error::CoreError;
use crate::model::Beverage;

pub(crate) const COMMAND_CHANNEL_SIZE: usize = 16;

/// Requests the store makes of the listener.
#[derive(Debug)]
pub(crate) enum ListenerCommand {
    /// Empty the local list. `ack` fires once it is empty.
    Clear { ack: oneshot::Sender<()> },
}

/// Drive the live query until cancelled, then hand the writer back.
///
/// Commands win over live events so a clear requested before a push is
/// applied before it. When the live feed ends the task keeps serving
/// commands; the list simply stops receiving pushes. Commands still queued
/// at cancellation are applied before the task returns.
pub(crate) async fn beverage_listener_task(
    mut live: LiveQuery,
    saved: SavedBeverages,
    state: Arc<watch::Sender<StoreState>>,
    mut commands: mpsc::Receiver<ListenerCommand>,
    cancel: CancellationToken,
) -> SavedBeverages {
    let mut live_open = true;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            command = commands.recv() => {
                let Some(command) = command else { break };
                apply(&saved, command);
            }
            event = live.next(), if live_open => match event {
                Some(LiveEvent::Snapshot(docs)) => {
                    let beverages = decode_snapshot(docs);
                    trace!(count = beverages.len(), "beverage snapshot");
                    saved.replace(beverages);
                }
                Some(LiveEvent::Error(e)) => {
                    let err = CoreError::Subscription(e);
                    warn!(error = %err, "beverage subscription error");
                    let message = err.to_string();
                    state.send_modify(|s| s.error = Some(message));
                }
                None => {
                    debug!("beverage live query ended");
                    live_open = false;
                }
            },
        }
    }

    live.cancel();
    commands.close();
    while let Ok(command) = commands.try_recv() {
        apply(&saved, command);
    }
    debug!("beverage listener stopped");
    saved
}

fn apply(saved: &SavedBeverages, command: ListenerCommand) {
    match command {
        ListenerCommand::Clear { ack } => {
            saved.clear();
            debug!("cleared local beverages");
            let _ = ack.send(());
        }
    }
}

/// Decode a snapshot, skipping documents that do not fit.
fn decode_snapshot(docs: Vec<Document>) -> Vec<Beverage> {
    docs.into_iter()
        .filter_map(|doc| match beverage_from_document(BEVERAGES, doc) {
            Ok(beverage) => Some(beverage),
            Err(e) => {
                warn!(error = %e, "skipping malformed beverage");
                None
            }
        })
        .collect()
}
