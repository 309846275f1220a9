//! Post repository
//!
//! Database operations for posts. Deleting a post takes its whole
//! comment tree with it: the doomed comment ids are collected up front
//! through the reply closure, then deleted together with the post in a
//! single transaction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{CreatePostInput, Post, UpdatePostInput};

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post under the given category
    async fn create(&self, input: &CreatePostInput, category_id: i64) -> Result<Post>;

    /// Get post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// List all posts, newest first
    async fn list(&self) -> Result<Vec<Post>>;

    /// List posts in a category, newest first
    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Post>>;

    /// Update title/body/category
    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post>;

    /// Open or close commenting on a post
    async fn set_can_comment(&self, id: i64, can_comment: bool) -> Result<()>;

    /// Delete a post together with every comment attached to it,
    /// including transitive replies, as one transaction.
    ///
    /// Returns the number of comments removed.
    async fn delete_with_comments(&self, id: i64) -> Result<usize>;
}

/// SQLx-based post repository
pub struct SqlxPostRepository {
    pool: SqlitePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use behind the trait
    pub fn boxed(pool: SqlitePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: &CreatePostInput, category_id: i64) -> Result<Post> {
        let now = Utc::now();
        let can_comment = input.can_comment.unwrap_or(true);

        let result = sqlx::query(
            r#"
            INSERT INTO posts (title, body, timestamp, can_comment, category_id)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.body)
        .bind(now)
        .bind(can_comment)
        .bind(category_id)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(Post {
            id: result.last_insert_rowid(),
            title: input.title.clone(),
            body: input.body.clone(),
            timestamp: now,
            can_comment,
            category_id,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, body, timestamp, can_comment, category_id
            FROM posts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get post by ID")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, timestamp, can_comment, category_id
            FROM posts
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn list_by_category(&self, category_id: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, body, timestamp, can_comment, category_id
            FROM posts
            WHERE category_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list posts by category")?;

        rows.iter().map(row_to_post).collect()
    }

    async fn update(&self, id: i64, input: &UpdatePostInput) -> Result<Post> {
        let mut post = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Post not found: {}", id))?;

        if let Some(ref title) = input.title {
            post.title = title.clone();
        }
        if let Some(ref body) = input.body {
            post.body = body.clone();
        }
        if let Some(category_id) = input.category_id {
            post.category_id = category_id;
        }

        sqlx::query("UPDATE posts SET title = ?, body = ?, category_id = ? WHERE id = ?")
            .bind(&post.title)
            .bind(&post.body)
            .bind(post.category_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update post")?;

        Ok(post)
    }

    async fn set_can_comment(&self, id: i64, can_comment: bool) -> Result<()> {
        sqlx::query("UPDATE posts SET can_comment = ? WHERE id = ?")
            .bind(can_comment)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to toggle commenting")?;

        Ok(())
    }

    async fn delete_with_comments(&self, id: i64) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Collect every doomed comment id before deleting anything: the
        // direct comments of the post plus the reply closure under them.
        let doomed = collect_post_comment_ids(&mut tx, id).await?;

        if !doomed.is_empty() {
            let placeholders = vec!["?"; doomed.len()].join(", ");

            // Break parent edges first so the plain FK on replied_id
            // never sees a child outliving its parent mid-statement.
            let detach = format!(
                "UPDATE comments SET replied_id = NULL WHERE id IN ({})",
                placeholders
            );
            let mut query = sqlx::query(&detach);
            for comment_id in &doomed {
                query = query.bind(comment_id);
            }
            query
                .execute(&mut *tx)
                .await
                .context("Failed to detach doomed comments")?;

            let delete = format!("DELETE FROM comments WHERE id IN ({})", placeholders);
            let mut query = sqlx::query(&delete);
            for comment_id in &doomed {
                query = query.bind(comment_id);
            }
            query
                .execute(&mut *tx)
                .await
                .context("Failed to delete comments of post")?;
        }

        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete post")?;

        tx.commit().await.context("Failed to commit post delete")?;

        Ok(doomed.len())
    }
}

/// Collect ids of all comments attached to a post, replies included.
///
/// UNION (not UNION ALL) keeps the recursion finite even if a malformed
/// reply chain contains a cycle.
async fn collect_post_comment_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    post_id: i64,
) -> Result<Vec<i64>> {
    let rows = sqlx::query(
        r#"
        WITH RECURSIVE doomed(id) AS (
            SELECT id FROM comments WHERE post_id = ?
            UNION
            SELECT c.id
            FROM comments c
            INNER JOIN doomed d ON c.replied_id = d.id
        )
        SELECT id FROM doomed
        "#,
    )
    .bind(post_id)
    .fetch_all(&mut **tx)
    .await
    .context("Failed to collect comment ids of post")?;

    Ok(rows.iter().map(|row| row.get("id")).collect())
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        body: row.get("body"),
        timestamp: row.get("timestamp"),
        can_comment: row.get("can_comment"),
        category_id: row.get("category_id"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{CategoryRepository, SqlxCategoryRepository};
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (SqlitePool, SqlxPostRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let categories = SqlxCategoryRepository::new(pool.clone());
        let default = categories
            .get_default()
            .await
            .expect("Failed to get default")
            .expect("Default category not seeded");

        (pool.clone(), SqlxPostRepository::new(pool), default.id)
    }

    async fn insert_comment(
        pool: &SqlitePool,
        post_id: i64,
        replied_id: Option<i64>,
    ) -> i64 {
        let result =
            sqlx::query("INSERT INTO comments (author, email, body, post_id, replied_id) VALUES ('a', 'a@b.c', 'hi', ?, ?)")
                .bind(post_id)
                .bind(replied_id)
                .execute(pool)
                .await
                .expect("Failed to insert comment");
        result.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_create_post() {
        let (_pool, repo, default_id) = setup_test_repo().await;

        let post = repo
            .create(&CreatePostInput::new("Hello", "World"), default_id)
            .await
            .expect("Failed to create post");

        assert!(post.id > 0);
        assert_eq!(post.title, "Hello");
        assert!(post.can_comment);
        assert_eq!(post.category_id, default_id);
    }

    #[tokio::test]
    async fn test_create_with_comments_closed() {
        let (_pool, repo, default_id) = setup_test_repo().await;

        let post = repo
            .create(
                &CreatePostInput::new("Quiet", "No comments").with_can_comment(false),
                default_id,
            )
            .await
            .expect("Failed to create post");

        assert!(!post.can_comment);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_pool, repo, default_id) = setup_test_repo().await;

        repo.create(&CreatePostInput::new("First", ""), default_id)
            .await
            .expect("create failed");
        repo.create(&CreatePostInput::new("Second", ""), default_id)
            .await
            .expect("create failed");

        let posts = repo.list().await.expect("Failed to list posts");

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Second");
        assert_eq!(posts[1].title, "First");
    }

    #[tokio::test]
    async fn test_update_post() {
        let (_pool, repo, default_id) = setup_test_repo().await;
        let post = repo
            .create(&CreatePostInput::new("Draft", "..."), default_id)
            .await
            .expect("create failed");

        let updated = repo
            .update(post.id, &UpdatePostInput::new().with_title("Final"))
            .await
            .expect("update failed");

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.body, "...");
    }

    #[tokio::test]
    async fn test_set_can_comment() {
        let (_pool, repo, default_id) = setup_test_repo().await;
        let post = repo
            .create(&CreatePostInput::new("Open", ""), default_id)
            .await
            .expect("create failed");

        repo.set_can_comment(post.id, false)
            .await
            .expect("toggle failed");

        let fetched = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert!(!fetched.can_comment);
    }

    #[tokio::test]
    async fn test_delete_with_comments_cascades_replies() {
        let (pool, repo, default_id) = setup_test_repo().await;
        let post = repo
            .create(&CreatePostInput::new("A", ""), default_id)
            .await
            .expect("create failed");

        let root = insert_comment(&pool, post.id, None).await;
        let child = insert_comment(&pool, post.id, Some(root)).await;
        let _grandchild = insert_comment(&pool, post.id, Some(child)).await;

        let removed = repo
            .delete_with_comments(post.id)
            .await
            .expect("delete failed");

        assert_eq!(removed, 3);
        assert!(repo.get_by_id(post.id).await.unwrap().is_none());

        let remaining: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments")
            .fetch_one(&pool)
            .await
            .expect("count failed");
        assert_eq!(remaining.0, 0);
    }

    #[tokio::test]
    async fn test_delete_leaves_other_posts_alone() {
        let (pool, repo, default_id) = setup_test_repo().await;
        let doomed = repo
            .create(&CreatePostInput::new("Doomed", ""), default_id)
            .await
            .expect("create failed");
        let kept = repo
            .create(&CreatePostInput::new("Kept", ""), default_id)
            .await
            .expect("create failed");

        insert_comment(&pool, doomed.id, None).await;
        let kept_comment = insert_comment(&pool, kept.id, None).await;

        repo.delete_with_comments(doomed.id)
            .await
            .expect("delete failed");

        assert!(repo.get_by_id(kept.id).await.unwrap().is_some());
        let survivor: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE id = ?")
            .bind(kept_comment)
            .fetch_one(&pool)
            .await
            .expect("count failed");
        assert_eq!(survivor.0, 1);
    }

    #[tokio::test]
    async fn test_delete_post_without_comments() {
        let (_pool, repo, default_id) = setup_test_repo().await;
        let post = repo
            .create(&CreatePostInput::new("Lonely", ""), default_id)
            .await
            .expect("create failed");

        let removed = repo
            .delete_with_comments(post.id)
            .await
            .expect("delete failed");

        assert_eq!(removed, 0);
        assert!(repo.get_by_id(post.id).await.unwrap().is_none());
    }
}
