// ── Wire-level document types ──
//
// A document is a store-assigned id plus an open map of fields. The
// store never interprets fields beyond the one a live query orders by.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Open field map carried by every document.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A single document as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-side identifier, unique within its collection.
    pub id: String,

    /// The document body.
    #[serde(default)]
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Sort direction for a live query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered, standing query over one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenQuery {
    pub collection: String,
    pub order_by: String,
    pub direction: Direction,
}

impl ListenQuery {
    /// Listen to `collection` ordered by `order_by`, newest first.
    pub fn newest_first(collection: impl Into<String>, order_by: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            order_by: order_by.into(),
            direction: Direction::Desc,
        }
    }
}
