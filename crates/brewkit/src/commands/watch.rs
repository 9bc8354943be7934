//! `watch`: print every saved-beverage snapshot until interrupted.

use std::time::Duration;

use brewkit_api::Gateway;
use brewkit_core::BeverageStore;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::{beverages, util};

pub async fn handle<G: Gateway>(
    store: &BeverageStore<G>,
    source: &str,
    args: WatchArgs,
    global: &GlobalOpts,
    timeout: Duration,
) -> Result<(), CliError> {
    util::ensure_ready(store, source).await?;
    util::wait_synced(store, timeout).await?;

    let mut saved = store.subscribe_beverages();
    let mut state = store.subscribe();
    let mut last_error = state.latest().error;
    let mut printed = 0_usize;
    let mut snapshot = saved.current().clone();

    loop {
        let out = output::render_list(global.output, snapshot.as_slice(), beverages::row, |b| {
            b.id.clone()
        })?;
        output::print_output(&out, global.quiet);
        printed += 1;
        if args.count.is_some_and(|n| printed >= n) {
            return Ok(());
        }

        // Wait for the next list, reporting listener errors as they appear.
        snapshot = loop {
            tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("interrupted");
                    return Ok(());
                }
                next = saved.changed() => match next {
                    Some(next) => break next,
                    None => {
                        return Err(CliError::Store {
                            message: "beverage listener stopped".into(),
                        });
                    }
                },
                Some(s) = state.changed() => {
                    if s.error != last_error {
                        if let Some(e) = &s.error {
                            tracing::warn!(error = %e, "live query reported an error");
                        }
                        last_error = s.error;
                    }
                }
            }
        };
    }
}
