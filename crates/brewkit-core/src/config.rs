// ── Store configuration ──
//
// Built by the config crate (or tests) and handed to `BeverageStore`.
// Core never reads config files.

use crate::reference::DEFAULT_TEMPERATURES;

/// Key the store's persisted selection is saved under by default.
pub const DEFAULT_STORE_NAME: &str = "BeverageStore";

/// Configuration for a single [`BeverageStore`](crate::BeverageStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Ordered temperature names; position defines each temperature's id.
    pub temperatures: Vec<String>,
    /// Persistence key for the saved selection.
    pub store_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            temperatures: DEFAULT_TEMPERATURES.iter().map(|t| (*t).to_owned()).collect(),
            store_name: DEFAULT_STORE_NAME.into(),
        }
    }
}
