//! Shopping list metadata types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for one shopping list. Lists are renamed but never deleted.
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for `PUT /lists/:id`.
#[derive(Clone, Debug, Deserialize)]
pub struct ListRename {
    pub name: String,
}
