//! Category repository
//!
//! Database operations for categories, including the delete-with-
//! reassignment routine: removing a category moves its posts to the
//! default category and drops the row in one transaction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Category;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, name: &str) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by name
    async fn get_by_name(&self, name: &str) -> Result<Option<Category>>;

    /// List all categories, name order
    async fn list(&self) -> Result<Vec<Category>>;

    /// Rename a category
    async fn rename(&self, id: i64, name: &str) -> Result<Category>;

    /// Check if a category name already exists
    async fn exists_by_name(&self, name: &str) -> Result<bool>;

    /// Get the permanent default category, found by its flag
    async fn get_default(&self) -> Result<Option<Category>>;

    /// Count posts filed under a category
    async fn count_posts(&self, id: i64) -> Result<i64>;

    /// Delete a category, reassigning its posts to `default_id`.
    ///
    /// Both steps run in one transaction: either every post is moved and
    /// the category is gone, or nothing changed.
    async fn delete_and_reassign(&self, id: i64, default_id: i64) -> Result<()>;
}

/// SQLx-based category repository
pub struct SqlxCategoryRepository {
    pool: SqlitePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use behind the trait
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, name: &str) -> Result<Category> {
        let result = sqlx::query("INSERT INTO categories (name, is_default) VALUES (?, 0)")
            .bind(name)
            .execute(&self.pool)
            .await
            .context("Failed to create category")?;

        Ok(Category {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            is_default: false,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, is_default FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by ID")?;

        row.map(|r| row_to_category(&r)).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, is_default FROM categories WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get category by name")?;

        row.map(|r| row_to_category(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query("SELECT id, name, is_default FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        rows.iter().map(row_to_category).collect()
    }

    async fn rename(&self, id: i64, name: &str) -> Result<Category> {
        sqlx::query("UPDATE categories SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to rename category")?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Category not found after rename"))
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM categories WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .context("Failed to check category name existence")?;

        let count: i64 = row.get("count");
        Ok(count > 0)
    }

    async fn get_default(&self) -> Result<Option<Category>> {
        let row = sqlx::query("SELECT id, name, is_default FROM categories WHERE is_default = 1")
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get default category")?;

        row.map(|r| row_to_category(&r)).transpose()
    }

    async fn count_posts(&self, id: i64) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM posts WHERE category_id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts in category")?;

        Ok(row.get("count"))
    }

    async fn delete_and_reassign(&self, id: i64, default_id: i64) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        sqlx::query("UPDATE posts SET category_id = ? WHERE category_id = ?")
            .bind(default_id)
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to reassign posts to default category")?;

        sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete category")?;

        tx.commit().await.context("Failed to commit category delete")?;

        Ok(())
    }
}

fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<Category> {
    Ok(Category {
        id: row.get("id"),
        name: row.get("name"),
        is_default: row.get("is_default"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (SqlitePool, SqlxCategoryRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxCategoryRepository::new(pool.clone());
        (pool, repo)
    }

    #[tokio::test]
    async fn test_create_category() {
        let (_pool, repo) = setup_test_repo().await;

        let created = repo.create("Tech").await.expect("Failed to create category");

        assert!(created.id > 0);
        assert_eq!(created.name, "Tech");
        assert!(!created.is_default);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo.get_by_id(99999).await.expect("Failed to get category");

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_get_by_name() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create("Music").await.expect("Failed to create category");

        let found = repo
            .get_by_name("Music")
            .await
            .expect("Failed to get category")
            .expect("Category not found");

        assert_eq!(found.name, "Music");
    }

    #[tokio::test]
    async fn test_unique_name_constraint() {
        let (_pool, repo) = setup_test_repo().await;

        repo.create("Twice").await.expect("Failed to create first");
        let result = repo.create("Twice").await;

        assert!(result.is_err(), "Should fail due to duplicate name");
    }

    #[tokio::test]
    async fn test_exists_by_name() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create("Exists").await.expect("Failed to create category");

        assert!(repo.exists_by_name("Exists").await.expect("check failed"));
        assert!(!repo.exists_by_name("Missing").await.expect("check failed"));
    }

    #[tokio::test]
    async fn test_get_default_category() {
        let (_pool, repo) = setup_test_repo().await;

        let default = repo
            .get_default()
            .await
            .expect("Failed to get default category")
            .expect("Default category not seeded");

        assert!(default.is_default);
        assert_eq!(default.name, "Default");
    }

    #[tokio::test]
    async fn test_list_ordered_by_name() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create("Zebra").await.expect("create failed");
        repo.create("Apple").await.expect("create failed");

        let categories = repo.list().await.expect("Failed to list categories");
        let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();

        // Seeded "Default" plus ours, alphabetical
        assert_eq!(names, vec!["Apple", "Default", "Zebra"]);
    }

    #[tokio::test]
    async fn test_rename() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo.create("Old").await.expect("create failed");

        let renamed = repo.rename(created.id, "New").await.expect("rename failed");

        assert_eq!(renamed.name, "New");
        assert_eq!(renamed.id, created.id);
    }

    #[tokio::test]
    async fn test_delete_and_reassign_moves_posts() {
        let (pool, repo) = setup_test_repo().await;
        let default = repo.get_default().await.unwrap().unwrap();
        let tech = repo.create("Tech").await.expect("create failed");

        sqlx::query("INSERT INTO posts (title, body, category_id) VALUES ('Hello', 'World', ?)")
            .bind(tech.id)
            .execute(&pool)
            .await
            .expect("Failed to insert post");

        repo.delete_and_reassign(tech.id, default.id)
            .await
            .expect("Failed to delete category");

        assert!(repo.get_by_id(tech.id).await.unwrap().is_none());

        let category_id: (i64,) =
            sqlx::query_as("SELECT category_id FROM posts WHERE title = 'Hello'")
                .fetch_one(&pool)
                .await
                .expect("Post must survive");
        assert_eq!(category_id.0, default.id);
    }

    #[tokio::test]
    async fn test_count_posts() {
        let (pool, repo) = setup_test_repo().await;
        let cat = repo.create("Counted").await.expect("create failed");

        for i in 0..3 {
            sqlx::query("INSERT INTO posts (title, body, category_id) VALUES (?, '', ?)")
                .bind(format!("post {}", i))
                .bind(cat.id)
                .execute(&pool)
                .await
                .expect("Failed to insert post");
        }

        assert_eq!(repo.count_posts(cat.id).await.expect("count failed"), 3);
    }
}
