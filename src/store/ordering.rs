//! The ordering engine
//!
//! Sole writer of the `position` column. Positions within a list are
//! 1-based and dense: after every successful mutation they are exactly
//! `1..=n` for n items. Each operation runs inside one transaction so a
//! partially shifted index is never observable; SQLite's writer lock
//! serializes concurrent mutations of the same list.
//!
//! Policy notes:
//! - `insert_item_at` clamps targets beyond `count + 1` to an append.
//! - `delete_item` renumbers the tail, keeping the index gap-free.
//! - `move_item` clamps the target into `[1, count]`.

use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::types::{Item, ItemDraft};

use super::Store;

/// Outcome of [`Store::move_item`]: the item in its final state plus
/// the position it moved away from (`from_position == item.position`
/// for a no-op move).
#[derive(Clone, Debug)]
pub struct MoveResult {
    pub item: Item,
    pub from_position: i64,
}

impl Store {
    /// Create an item at the end of the list.
    pub async fn append_item(&self, list_id: i64, draft: &ItemDraft) -> Result<Item> {
        let mut tx = self.pool().begin().await?;

        Self::ensure_list(&mut tx, list_id).await?;
        let next: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM items WHERE list_id = ?",
        )
        .bind(list_id)
        .fetch_one(&mut *tx)
        .await?;

        let item = Self::insert_row(&mut tx, list_id, draft, next).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Create an item at `position`, shifting the tail of the list up
    /// by one. Targets beyond `count + 1` are clamped to an append;
    /// positions below 1 are rejected.
    pub async fn insert_item_at(
        &self,
        list_id: i64,
        draft: &ItemDraft,
        position: i64,
    ) -> Result<Item> {
        if position < 1 {
            return Err(StoreError::InvalidPosition(position));
        }

        let mut tx = self.pool().begin().await?;

        Self::ensure_list(&mut tx, list_id).await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE list_id = ?")
            .bind(list_id)
            .fetch_one(&mut *tx)
            .await?;
        let position = position.min(count + 1);

        sqlx::query(
            "UPDATE items SET position = position + 1 WHERE list_id = ? AND position >= ?",
        )
        .bind(list_id)
        .bind(position)
        .execute(&mut *tx)
        .await?;

        let item = Self::insert_row(&mut tx, list_id, draft, position).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Move an item to `new_position` within its list, closing the gap
    /// it leaves behind and opening one at the target. Moving an item
    /// onto its current position is a no-op.
    pub async fn move_item(&self, item_id: i64, new_position: i64) -> Result<MoveResult> {
        if new_position < 1 {
            return Err(StoreError::InvalidPosition(new_position));
        }

        let mut tx = self.pool().begin().await?;

        let from_position = Self::reposition(&mut tx, item_id, new_position).await?;

        let item = Self::fetch_row(&mut tx, item_id).await?;
        tx.commit().await?;
        Ok(MoveResult {
            item,
            from_position,
        })
    }

    /// Update an item's fields and, when `position` is given, move it,
    /// all inside one transaction so no partial update can be observed.
    pub async fn update_item(
        &self,
        item_id: i64,
        name: &str,
        quantity: i64,
        completed: bool,
        position: Option<i64>,
    ) -> Result<Item> {
        if let Some(position) = position {
            if position < 1 {
                return Err(StoreError::InvalidPosition(position));
            }
        }

        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            "UPDATE items SET name = ?, quantity = ?, completed = ? WHERE id = ?",
        )
        .bind(name)
        .bind(quantity)
        .bind(completed)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("item"));
        }

        if let Some(position) = position {
            Self::reposition(&mut tx, item_id, position).await?;
        }

        let item = Self::fetch_row(&mut tx, item_id).await?;
        tx.commit().await?;
        Ok(item)
    }

    /// Shift-then-place inside the caller's transaction. Clamps the
    /// target into `[1, count]` and returns the position moved from.
    async fn reposition(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        item_id: i64,
        new_position: i64,
    ) -> Result<i64> {
        let current: Option<(i64, i64)> =
            sqlx::query_as("SELECT list_id, position FROM items WHERE id = ?")
                .bind(item_id)
                .fetch_optional(&mut **tx)
                .await?;
        let (list_id, from_position) = current.ok_or(StoreError::NotFound("item"))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE list_id = ?")
            .bind(list_id)
            .fetch_one(&mut **tx)
            .await?;
        let new_position = new_position.min(count);

        if new_position == from_position {
            return Ok(from_position);
        }

        if new_position > from_position {
            // Moving down the list: pull the skipped items up by one.
            sqlx::query(
                "UPDATE items SET position = position - 1 \
                 WHERE list_id = ? AND position > ? AND position <= ?",
            )
            .bind(list_id)
            .bind(from_position)
            .bind(new_position)
            .execute(&mut **tx)
            .await?;
        } else {
            // Moving up the list: push the skipped items down by one.
            sqlx::query(
                "UPDATE items SET position = position + 1 \
                 WHERE list_id = ? AND position >= ? AND position < ?",
            )
            .bind(list_id)
            .bind(new_position)
            .bind(from_position)
            .execute(&mut **tx)
            .await?;
        }

        sqlx::query("UPDATE items SET position = ? WHERE id = ?")
            .bind(new_position)
            .bind(item_id)
            .execute(&mut **tx)
            .await?;

        Ok(from_position)
    }

    /// Delete an item and renumber the tail of its list, returning the
    /// deleted row. Positions stay dense afterwards.
    pub async fn delete_item(&self, item_id: i64) -> Result<Item> {
        let mut tx = self.pool().begin().await?;

        let item = Self::fetch_row(&mut tx, item_id).await?;
        sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            "UPDATE items SET position = position - 1 WHERE list_id = ? AND position > ?",
        )
        .bind(item.list_id)
        .bind(item.position)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Remove every item of a list in one statement, returning how many
    /// rows were deleted.
    pub async fn clear_list(&self, list_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM items WHERE list_id = ?")
            .bind(list_id)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected())
    }

    /// Lists are created implicitly on first use.
    async fn ensure_list(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        list_id: i64,
    ) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            "INSERT OR IGNORE INTO lists (id, name, created_at, updated_at) \
             VALUES (?, 'Shopping List', ?, ?)",
        )
        .bind(list_id)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn insert_row(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        list_id: i64,
        draft: &ItemDraft,
        position: i64,
    ) -> Result<Item> {
        let result = sqlx::query(
            "INSERT INTO items (list_id, name, quantity, completed, position) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(list_id)
        .bind(&draft.name)
        .bind(draft.quantity)
        .bind(draft.completed)
        .bind(position)
        .execute(&mut **tx)
        .await?;

        Self::fetch_row(tx, result.last_insert_rowid()).await
    }

    async fn fetch_row(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        item_id: i64,
    ) -> Result<Item> {
        sqlx::query_as::<_, Item>(
            "SELECT id, list_id, name, quantity, completed, position FROM items WHERE id = ?",
        )
        .bind(item_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or(StoreError::NotFound("item"))
    }
}
