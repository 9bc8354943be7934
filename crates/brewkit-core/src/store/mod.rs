// ── Beverage store ──
//
// State, the listener task that keeps the saved list in sync, and the
// store handle that ties them to a gateway.

mod beverage_store;
pub(crate) mod collection;
pub(crate) mod listener;
mod state;

pub use beverage_store::BeverageStore;
pub use state::{Alert, StoreState, StoreStatus};

/// Collection holding saved beverages.
pub const BEVERAGES: &str = "beverages";

/// Field the saved-beverage query orders by, newest first.
pub const CREATED_AT: &str = "createdAt";
