// ── Domain model ──
//
// Canonical types shared by the store, the listener, and consumers.

mod beverage;
mod component;
mod temperature;

pub use beverage::Beverage;
pub use component::{Base, Component, ComponentKind, Creamer, Syrup};
pub use temperature::Temperature;
