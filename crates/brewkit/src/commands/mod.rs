//! Command dispatch: bridges CLI args -> store actions -> output formatting.

pub mod beverages;
pub mod config_cmd;
pub mod draft;
pub mod options;
pub mod util;
pub mod watch;

use std::time::Duration;

use brewkit_api::Gateway;
use brewkit_core::BeverageStore;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
///
/// `source` names where the store's data comes from, for error messages.
pub async fn dispatch<G: Gateway>(
    cmd: Command,
    store: &BeverageStore<G>,
    source: &str,
    global: &GlobalOpts,
    timeout: Duration,
) -> Result<(), CliError> {
    match cmd {
        Command::Options(args) => options::handle(store, source, args, global).await,
        Command::Beverages(args) => beverages::handle(store, source, args, global, timeout).await,
        Command::Draft(args) => draft::handle(store, source, args, global).await,
        Command::Watch(args) => watch::handle(store, source, args, global, timeout).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
