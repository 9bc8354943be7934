// ── Selectable components ──
//
// Bases, creamers, and syrups share one shape; the collection they were
// loaded from is what tells them apart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A selectable beverage component, as loaded from its collection.
///
/// Identity is `id`, assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    pub color: String,
}

pub type Base = Component;
pub type Creamer = Component;
pub type Syrup = Component;

/// Which option collection a component belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Base,
    Creamer,
    Syrup,
}

impl ComponentKind {
    pub const ALL: [Self; 3] = [Self::Base, Self::Creamer, Self::Syrup];

    /// Name of the backing collection in the document store.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Base => "bases",
            Self::Creamer => "creamers",
            Self::Syrup => "syrups",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Base => "base",
            Self::Creamer => "creamer",
            Self::Syrup => "syrup",
        })
    }
}
