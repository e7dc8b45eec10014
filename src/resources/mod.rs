//! The `resources` table: one row per uploaded document.
//!
//! Every call runs a single statement on a pooled connection and commits on
//! its own. Nothing here spans statements, so callers that pair a row change
//! with a file change can leave the two out of step if they stop halfway.

use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

const MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ResourceRow {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub path: String,
}

/// A listing entry within one category.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ResourceEntry {
    pub id: i64,
    pub name: String,
    pub path: String,
}

#[derive(Clone)]
pub struct ResourceStore {
    pool: SqlitePool,
}

impl ResourceStore {
    /// Open the database (creating the file if needed) and make sure the table exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid DATABASE_URL `{database_url}`"))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .context("failed to open SQLite database")?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!(database_url, "resource store ready");
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("failed to run database migrations")
    }

    /// Append a row. Duplicate names, within or across categories, are allowed.
    pub async fn insert(&self, name: &str, category: &str, path: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO resources (name, category, path) VALUES (?, ?, ?)")
            .bind(name)
            .bind(category)
            .bind(path)
            .execute(&self.pool)
            .await
            .context("failed to insert resource")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn list_categories(&self) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT category FROM resources ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list categories")
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<ResourceEntry>> {
        sqlx::query_as::<_, ResourceEntry>(
            "SELECT id, name, path FROM resources WHERE category = ? ORDER BY id",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to list resources in category `{category}`"))
    }

    pub async fn find(&self, id: i64) -> Result<Option<ResourceRow>> {
        sqlx::query_as::<_, ResourceRow>(
            "SELECT id, name, category, path FROM resources WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load resource {id}"))
    }

    /// Paths of every row carrying `name`, across all categories.
    pub async fn paths_by_name(&self, name: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>("SELECT path FROM resources WHERE name = ? ORDER BY id")
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to look up paths for `{name}`"))
    }

    /// Remove every row named `name`, regardless of category.
    pub async fn delete_by_name(&self, name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resources WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete resources named `{name}`"))?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_category(&self, category: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resources WHERE category = ?")
            .bind(category)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete category `{category}`"))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn temp_store() -> (TempDir, ResourceStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let url = format!("sqlite://{}", dir.path().join("resources.db").display());
        let store = ResourceStore::connect(&url).await.expect("connect");
        (dir, store)
    }

    #[tokio::test]
    async fn insert_then_list_category() {
        let (_dir, store) = temp_store().await;
        let id = store
            .insert("notes.pdf", "Maths", "uploads/notes.pdf")
            .await
            .unwrap();

        let listed = store.list_by_category("Maths").await.unwrap();
        assert_eq!(
            listed,
            vec![ResourceEntry {
                id,
                name: "notes.pdf".into(),
                path: "uploads/notes.pdf".into(),
            }]
        );
        assert_eq!(store.list_categories().await.unwrap(), vec!["Maths"]);
    }

    #[tokio::test]
    async fn category_match_is_exact() {
        let (_dir, store) = temp_store().await;
        store.insert("a.txt", "Physics", "uploads/a.txt").await.unwrap();
        assert!(store.list_by_category("physics").await.unwrap().is_empty());
        assert!(store.list_by_category("Physics ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn categories_are_distinct() {
        let (_dir, store) = temp_store().await;
        store.insert("a.txt", "DBMS", "uploads/a.txt").await.unwrap();
        store.insert("b.txt", "DBMS", "uploads/b.txt").await.unwrap();
        store.insert("c.txt", "OS", "uploads/c.txt").await.unwrap();
        assert_eq!(store.list_categories().await.unwrap(), vec!["DBMS", "OS"]);
    }

    #[tokio::test]
    async fn delete_by_name_spans_categories() {
        let (_dir, store) = temp_store().await;
        store.insert("unit1.pdf", "DBMS", "uploads/unit1.pdf").await.unwrap();
        store.insert("unit1.pdf", "OS", "uploads/unit1.pdf").await.unwrap();
        store.insert("unit2.pdf", "OS", "uploads/unit2.pdf").await.unwrap();

        assert_eq!(store.delete_by_name("unit1.pdf").await.unwrap(), 2);
        assert!(store.list_by_category("DBMS").await.unwrap().is_empty());
        let remaining = store.list_by_category("OS").await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].name, "unit2.pdf");
    }

    #[tokio::test]
    async fn delete_by_category_leaves_others() {
        let (_dir, store) = temp_store().await;
        store.insert("a.txt", "DBMS", "uploads/a.txt").await.unwrap();
        store.insert("b.txt", "OS", "uploads/b.txt").await.unwrap();

        assert_eq!(store.delete_by_category("DBMS").await.unwrap(), 1);
        assert!(store.list_by_category("DBMS").await.unwrap().is_empty());
        assert_eq!(store.list_categories().await.unwrap(), vec!["OS"]);
    }

    #[tokio::test]
    async fn find_and_paths_by_name() {
        let (_dir, store) = temp_store().await;
        let id = store.insert("x.pptx", "CN", "uploads/x.pptx").await.unwrap();

        let row = store.find(id).await.unwrap().expect("row exists");
        assert_eq!(row.category, "CN");
        assert!(store.find(id + 1).await.unwrap().is_none());
        assert_eq!(
            store.paths_by_name("x.pptx").await.unwrap(),
            vec!["uploads/x.pptx"]
        );
    }

    #[tokio::test]
    async fn schema_setup_is_idempotent() {
        let (_dir, store) = temp_store().await;
        store.insert("a.txt", "OS", "uploads/a.txt").await.unwrap();
        store.ensure_schema().await.unwrap();
        assert_eq!(store.list_by_category("OS").await.unwrap().len(), 1);
    }
}
