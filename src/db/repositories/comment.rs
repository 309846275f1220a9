//! Comment repository
//!
//! Database operations for comments. The reply tree lives in the
//! `replied_id` column alone; subtree deletion collects the closure of
//! that edge set first and then deletes inside one transaction.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{Comment, CreateCommentInput};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Get the flat comment list of a post, oldest first
    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>>;

    /// Get all comments awaiting review, oldest first
    async fn list_unreviewed(&self) -> Result<Vec<Comment>>;

    /// Mark a comment reviewed
    async fn set_reviewed(&self, id: i64, reviewed: bool) -> Result<bool>;

    /// Delete a comment and its whole reply subtree in one transaction.
    ///
    /// Returns the number of comments removed (0 when the id is unknown).
    async fn delete_subtree(&self, id: i64) -> Result<usize>;
}

/// SQLx-based comment repository
pub struct SqlxCommentRepository {
    pool: SqlitePool,
}

impl SqlxCommentRepository {
    /// Create a new SQLx comment repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use behind the trait
    pub fn boxed(pool: SqlitePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, input: &CreateCommentInput) -> Result<Comment> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO comments
                (author, email, site, body, from_admin, reviewed, timestamp, post_id, replied_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.author)
        .bind(&input.email)
        .bind(&input.site)
        .bind(&input.body)
        .bind(input.from_admin)
        .bind(input.from_admin) // the owner's own comments need no review
        .bind(now)
        .bind(input.post_id)
        .bind(input.replied_id)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            author: input.author.clone(),
            email: input.email.clone(),
            site: input.site.clone(),
            body: input.body.clone(),
            from_admin: input.from_admin,
            reviewed: input.from_admin,
            timestamp: now,
            post_id: input.post_id,
            replied_id: input.replied_id,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, author, email, site, body, from_admin, reviewed,
                   timestamp, post_id, replied_id
            FROM comments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get comment by ID")?;

        row.map(|r| row_to_comment(&r)).transpose()
    }

    async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, author, email, site, body, from_admin, reviewed,
                   timestamp, post_id, replied_id
            FROM comments
            WHERE post_id = ?
            ORDER BY timestamp, id
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments of post")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn list_unreviewed(&self) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, author, email, site, body, from_admin, reviewed,
                   timestamp, post_id, replied_id
            FROM comments
            WHERE reviewed = 0
            ORDER BY timestamp, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list unreviewed comments")?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn set_reviewed(&self, id: i64, reviewed: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE comments SET reviewed = ? WHERE id = ?")
            .bind(reviewed)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update review state")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_subtree(&self, id: i64) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        // Collect the subtree ids before touching anything
        let doomed = collect_subtree_ids(&mut tx, id).await?;
        if doomed.is_empty() {
            tx.rollback().await.ok();
            return Ok(0);
        }

        let placeholders = vec!["?"; doomed.len()].join(", ");

        // Detach edges first; the plain FK on replied_id must never see
        // a surviving child of a deleted parent mid-statement
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
            .context("Failed to detach comment subtree")?;

        let delete = format!("DELETE FROM comments WHERE id IN ({})", placeholders);
        let mut query = sqlx::query(&delete);
        for comment_id in &doomed {
            query = query.bind(comment_id);
        }
        query
            .execute(&mut *tx)
            .await
            .context("Failed to delete comment subtree")?;

        tx.commit().await.context("Failed to commit subtree delete")?;

        Ok(doomed.len())
    }
}

/// Collect the ids of a comment and all its transitive replies.
///
/// UNION (not UNION ALL) keeps the recursion finite even if a malformed
/// reply chain contains a cycle.
async fn collect_subtree_ids(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    root_id: i64,
) -> Result<Vec<i64>> {
    let rows = sqlx::query(
        r#"
        WITH RECURSIVE subtree(id) AS (
            SELECT id FROM comments WHERE id = ?
            UNION
            SELECT c.id
            FROM comments c
            INNER JOIN subtree s ON c.replied_id = s.id
        )
        SELECT id FROM subtree
        "#,
    )
    .bind(root_id)
    .fetch_all(&mut **tx)
    .await
    .context("Failed to collect comment subtree")?;

    Ok(rows.iter().map(|row| row.get("id")).collect())
}

fn row_to_comment(row: &sqlx::sqlite::SqliteRow) -> Result<Comment> {
    Ok(Comment {
        id: row.get("id"),
        author: row.get("author"),
        email: row.get("email"),
        site: row.get("site"),
        body: row.get("body"),
        from_admin: row.get("from_admin"),
        reviewed: row.get("reviewed"),
        timestamp: row.get("timestamp"),
        post_id: row.get("post_id"),
        replied_id: row.get("replied_id"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (SqlitePool, SqlxCommentRepository, i64) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        // A post to hang comments on, in the seeded default category
        let post_id = sqlx::query(
            "INSERT INTO posts (title, body, category_id)
             SELECT 'A', '', id FROM categories WHERE is_default = 1",
        )
        .execute(&pool)
        .await
        .expect("Failed to insert post")
        .last_insert_rowid();

        (pool.clone(), SqlxCommentRepository::new(pool), post_id)
    }

    #[tokio::test]
    async fn test_create_root_comment() {
        let (_pool, repo, post_id) = setup_test_repo().await;

        let comment = repo
            .create(&CreateCommentInput::new(post_id, "alice", "alice@example.com", "hi"))
            .await
            .expect("Failed to create comment");

        assert!(comment.id > 0);
        assert!(comment.is_root());
        assert!(!comment.from_admin);
        assert!(!comment.reviewed);
    }

    #[tokio::test]
    async fn test_admin_comment_is_reviewed() {
        let (_pool, repo, post_id) = setup_test_repo().await;

        let comment = repo
            .create(&CreateCommentInput::new(post_id, "owner", "o@example.com", "thanks").from_admin())
            .await
            .expect("Failed to create comment");

        assert!(comment.from_admin);
        assert!(comment.reviewed);
    }

    #[tokio::test]
    async fn test_create_reply() {
        let (_pool, repo, post_id) = setup_test_repo().await;
        let root = repo
            .create(&CreateCommentInput::new(post_id, "alice", "a@e.com", "root"))
            .await
            .expect("create failed");

        let reply = repo
            .create(&CreateCommentInput::new(post_id, "bob", "b@e.com", "reply").with_reply_to(root.id))
            .await
            .expect("create failed");

        assert_eq!(reply.replied_id, Some(root.id));
    }

    #[tokio::test]
    async fn test_list_by_post_oldest_first() {
        let (_pool, repo, post_id) = setup_test_repo().await;
        let first = repo
            .create(&CreateCommentInput::new(post_id, "a", "a@e.com", "1"))
            .await
            .expect("create failed");
        let second = repo
            .create(&CreateCommentInput::new(post_id, "b", "b@e.com", "2"))
            .await
            .expect("create failed");

        let comments = repo.list_by_post(post_id).await.expect("list failed");

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].id, first.id);
        assert_eq!(comments[1].id, second.id);
    }

    #[tokio::test]
    async fn test_set_reviewed() {
        let (_pool, repo, post_id) = setup_test_repo().await;
        let comment = repo
            .create(&CreateCommentInput::new(post_id, "a", "a@e.com", "hi"))
            .await
            .expect("create failed");

        assert!(repo.set_reviewed(comment.id, true).await.expect("review failed"));

        let fetched = repo.get_by_id(comment.id).await.unwrap().unwrap();
        assert!(fetched.reviewed);

        let pending = repo.list_unreviewed().await.expect("list failed");
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_set_reviewed_unknown_id() {
        let (_pool, repo, _post_id) = setup_test_repo().await;

        assert!(!repo.set_reviewed(99999, true).await.expect("review failed"));
    }

    #[tokio::test]
    async fn test_delete_subtree_removes_descendants_only() {
        let (_pool, repo, post_id) = setup_test_repo().await;

        let root = repo
            .create(&CreateCommentInput::new(post_id, "a", "a@e.com", "root"))
            .await
            .expect("create failed");
        let child = repo
            .create(&CreateCommentInput::new(post_id, "b", "b@e.com", "child").with_reply_to(root.id))
            .await
            .expect("create failed");
        let grandchild = repo
            .create(&CreateCommentInput::new(post_id, "c", "c@e.com", "gc").with_reply_to(child.id))
            .await
            .expect("create failed");
        let sibling = repo
            .create(&CreateCommentInput::new(post_id, "d", "d@e.com", "sibling").with_reply_to(root.id))
            .await
            .expect("create failed");

        let removed = repo.delete_subtree(child.id).await.expect("delete failed");

        assert_eq!(removed, 2);
        assert!(repo.get_by_id(child.id).await.unwrap().is_none());
        assert!(repo.get_by_id(grandchild.id).await.unwrap().is_none());
        assert!(repo.get_by_id(root.id).await.unwrap().is_some());
        assert!(repo.get_by_id(sibling.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_subtree_unknown_id() {
        let (_pool, repo, _post_id) = setup_test_repo().await;

        let removed = repo.delete_subtree(99999).await.expect("delete failed");
        assert_eq!(removed, 0);
    }
}
