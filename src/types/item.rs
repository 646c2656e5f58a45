//! Shopping list item types

use serde::{Deserialize, Serialize};

/// A single shopping list item.
///
/// `position` is a 1-based rank within the owning list; the ordering
/// engine keeps positions dense (exactly `1..=n` for n items).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: i64,
    pub list_id: i64,
    /// May be empty; empty names render as visual separators.
    pub name: String,
    pub quantity: i64,
    pub completed: bool,
    pub position: i64,
}

/// Request payload for creating or updating an item.
#[derive(Clone, Debug, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub completed: bool,
    /// Target position; 0 or absent appends at the end of the list.
    #[serde(default)]
    pub position: i64,
}

fn default_quantity() -> i64 {
    1
}
