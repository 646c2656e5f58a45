//! SQLite-backed persistence for lists and items
//!
//! The [`Store`] owns the connection pool and exposes every query the
//! handlers need. Position bookkeeping lives in the [`ordering`]
//! submodule, which is the only code allowed to write the `position`
//! column.

mod ordering;

pub use ordering::MoveResult;

use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::error::{Result, StoreError};
use crate::types::{Item, List};

/// SQLite-backed store for shopping lists and their items.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Wrap an existing pool (used by tests with `sqlite::memory:`).
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for the given connection string.
    ///
    /// The pool holds a single connection: SQLite allows one writer at
    /// a time, and a lone connection serializes the ordering engine's
    /// read-shift-write transactions without `SQLITE_BUSY` on the
    /// deferred-to-write lock upgrade. It also keeps `sqlite::memory:`
    /// databases coherent, which exist per connection.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the schema if it does not exist yet.
    pub async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL DEFAULT 'Shopping List',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                list_id INTEGER NOT NULL DEFAULT 1,
                name TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                completed BOOLEAN NOT NULL DEFAULT 0,
                position INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (list_id) REFERENCES lists (id)
            );

            CREATE INDEX IF NOT EXISTS idx_items_list_position
                ON items(list_id, position);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Seed the default list plus a few sample items, but only on a
    /// completely empty database.
    pub async fn seed_sample_data(&self) -> Result<()> {
        let item_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;
        if item_count > 0 {
            return Ok(());
        }

        let list_id = self.default_list_id().await?;
        let samples: [(&str, i64, bool); 4] = [
            ("Milk", 1, false),
            ("Bread", 2, false),
            ("Eggs", 12, false),
            ("Apples", 6, true),
        ];
        for (position, (name, quantity, completed)) in samples.into_iter().enumerate() {
            sqlx::query(
                "INSERT INTO items (list_id, name, quantity, completed, position) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(list_id)
            .bind(name)
            .bind(quantity)
            .bind(completed)
            .bind(position as i64 + 1)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Id of the first list, creating the default list when none exists.
    pub async fn default_list_id(&self) -> Result<i64> {
        let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM lists ORDER BY id LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO lists (name, created_at, updated_at) VALUES ('Shopping List', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// All lists, oldest first.
    pub async fn lists(&self) -> Result<Vec<List>> {
        let lists = sqlx::query_as::<_, List>(
            "SELECT id, name, created_at, updated_at FROM lists ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    pub async fn get_list(&self, list_id: i64) -> Result<List> {
        sqlx::query_as::<_, List>(
            "SELECT id, name, created_at, updated_at FROM lists WHERE id = ?",
        )
        .bind(list_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("list"))
    }

    pub async fn rename_list(&self, list_id: i64, name: &str) -> Result<List> {
        let updated = sqlx::query("UPDATE lists SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(Utc::now())
            .bind(list_id)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("list"));
        }
        self.get_list(list_id).await
    }

    /// Items of a list in display order. Position is the primary key of
    /// the ordering; id breaks ties deterministically.
    pub async fn items(&self, list_id: i64) -> Result<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, list_id, name, quantity, completed, position \
             FROM items WHERE list_id = ? ORDER BY position, id",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn get_item(&self, item_id: i64) -> Result<Item> {
        sqlx::query_as::<_, Item>(
            "SELECT id, list_id, name, quantity, completed, position FROM items WHERE id = ?",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound("item"))
    }

    /// Flip an item's completed flag, returning the new state.
    pub async fn toggle_item(&self, item_id: i64) -> Result<Item> {
        let updated = sqlx::query("UPDATE items SET completed = NOT completed WHERE id = ?")
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound("item"));
        }
        self.get_item(item_id).await
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::memory_store;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_init_and_default_list() {
        let (store, list_id) = memory_store().await;
        let list = store.get_list(list_id).await.unwrap();
        assert_eq!(list.name, "Shopping List");

        // Idempotent: a second call returns the same list.
        assert_eq!(store.default_list_id().await.unwrap(), list_id);
    }

    #[tokio::test]
    async fn test_seed_sample_data_once() {
        let (store, list_id) = memory_store().await;
        store.seed_sample_data().await.unwrap();
        store.seed_sample_data().await.unwrap();

        let items = store.items(list_id).await.unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0].name, "Milk");
        let positions: Vec<i64> = items.iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_rename_list() {
        let (store, list_id) = memory_store().await;
        let before = store.get_list(list_id).await.unwrap();

        let renamed = store.rename_list(list_id, "Groceries").await.unwrap();
        assert_eq!(renamed.name, "Groceries");
        assert!(renamed.updated_at >= before.updated_at);
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let (store, _) = memory_store().await;
        assert!(matches!(
            store.get_item(999).await,
            Err(StoreError::NotFound("item"))
        ));
        assert!(matches!(
            store.get_list(999).await,
            Err(StoreError::NotFound("list"))
        ));
        assert!(matches!(
            store.toggle_item(999).await,
            Err(StoreError::NotFound("item"))
        ));
    }

    #[tokio::test]
    async fn test_file_backed_store_persists_across_reconnect() {
        use crate::store::Store;
        use crate::types::ItemDraft;

        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let store = Store::connect(&url).await.unwrap();
        store.init().await.unwrap();
        let list_id = store.default_list_id().await.unwrap();
        let draft = ItemDraft {
            name: "Milk".to_string(),
            quantity: 1,
            completed: false,
            position: 0,
        };
        store.append_item(list_id, &draft).await.unwrap();
        drop(store);

        let reopened = Store::connect(&url).await.unwrap();
        reopened.init().await.unwrap();
        let items = reopened.items(list_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Milk");
    }

    #[tokio::test]
    async fn test_toggle_flips_both_ways() {
        let (store, list_id) = memory_store().await;
        store.seed_sample_data().await.unwrap();
        let item = &store.items(list_id).await.unwrap()[0];

        let toggled = store.toggle_item(item.id).await.unwrap();
        assert!(toggled.completed);
        let toggled = store.toggle_item(item.id).await.unwrap();
        assert!(!toggled.completed);
    }
}
