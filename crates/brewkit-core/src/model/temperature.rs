use serde::{Deserialize, Serialize};

/// A serving temperature derived from the static reference list.
///
/// `id` is the 1-based position in that list; `value` is the lowercased name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Temperature {
    pub id: u32,
    pub name: String,
    pub value: String,
}
