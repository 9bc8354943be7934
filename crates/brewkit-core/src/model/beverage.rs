// ── Saved beverage ──
//
// Built locally on save, then owned by the document store. Local copies
// only ever come back through the live query.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Base, Creamer, Syrup, Temperature};

/// A named combination of components.
///
/// Serialized with camelCase field names (`createdAt`) to match the
/// documents other clients write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beverage {
    /// Client-generated UUID; doubles as the document id.
    pub id: String,
    pub name: String,
    pub base: Base,
    pub creamer: Creamer,
    pub syrup: Syrup,
    pub temperature: Temperature,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl Beverage {
    /// Build a new beverage with a fresh id and the current timestamp.
    ///
    /// The id exists before the write so a retried save overwrites the
    /// same document instead of creating a duplicate.
    pub fn new(
        name: impl Into<String>,
        base: Base,
        creamer: Creamer,
        syrup: Syrup,
        temperature: Temperature,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            base,
            creamer,
            syrup,
            temperature,
            created_at: Utc::now().timestamp_millis(),
        }
    }
}
