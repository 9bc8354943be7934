// brewkit-core: Beverage store between brewkit-api and consumers (CLI/UI).
//
// The store owns selection state, loads option collections once, and keeps
// a background listener attached to the saved-beverage query.

pub mod config;
mod convert;
pub mod error;
pub mod model;
pub mod persist;
pub mod reference;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_STORE_NAME, StoreConfig};
pub use error::CoreError;
pub use persist::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, PersistedSelection};
pub use reference::{DEFAULT_TEMPERATURES, format_temperatures, validate_temperature_names};
pub use store::{Alert, BEVERAGES, BeverageStore, CREATED_AT, StoreState, StoreStatus};
pub use stream::{BeverageSnapshot, BeverageStream, StateStream};

pub use model::{Base, Beverage, Component, ComponentKind, Creamer, Syrup, Temperature};
