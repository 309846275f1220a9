//! Post service
//!
//! Business logic for blog posts:
//! - Create, update, list, delete
//! - Category resolution (fall back to the default category)
//! - Per-post comment toggle
//! - Deletion takes every comment on the post down with it

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::{CategoryRepository, PostRepository};
use crate::models::{CreatePostInput, Post, UpdatePostInput};

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Post not found
    #[error("Post not found: {0}")]
    NotFound(String),

    /// Referenced category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(i64),

    /// The permanent default category is missing from storage
    #[error("Default category missing: cannot place uncategorized post")]
    DefaultCategoryMissing,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Post service
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    /// Create a new post service
    pub fn new(posts: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { posts, categories }
    }

    /// Create a new post.
    ///
    /// When the input names no category the post lands in the default
    /// category. A named category must exist.
    ///
    /// # Errors
    /// - `Validation` for an empty title
    /// - `CategoryNotFound` for an unknown category id
    pub async fn create(&self, input: CreatePostInput) -> Result<Post, PostServiceError> {
        if input.title.trim().is_empty() {
            return Err(PostServiceError::Validation(
                "Post title cannot be empty".to_string(),
            ));
        }

        let category_id = match input.category_id {
            Some(id) => {
                self.categories
                    .get_by_id(id)
                    .await
                    .context("Failed to look up category")?
                    .ok_or(PostServiceError::CategoryNotFound(id))?;
                id
            }
            None => {
                self.categories
                    .get_default()
                    .await
                    .context("Failed to get default category")?
                    .ok_or(PostServiceError::DefaultCategoryMissing)?
                    .id
            }
        };

        Ok(self
            .posts
            .create(&input, category_id)
            .await
            .context("Failed to create post")?)
    }

    /// Get post by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, PostServiceError> {
        Ok(self
            .posts
            .get_by_id(id)
            .await
            .context("Failed to get post")?)
    }

    /// List all posts, newest first
    pub async fn list(&self) -> Result<Vec<Post>, PostServiceError> {
        Ok(self.posts.list().await.context("Failed to list posts")?)
    }

    /// List posts in a category, newest first
    pub async fn list_by_category(&self, category_id: i64) -> Result<Vec<Post>, PostServiceError> {
        Ok(self
            .posts
            .list_by_category(category_id)
            .await
            .context("Failed to list posts by category")?)
    }

    /// Update a post's title, body, or category
    ///
    /// # Errors
    /// - `NotFound` if the post doesn't exist
    /// - `CategoryNotFound` when moving to an unknown category
    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Post, PostServiceError> {
        self.posts
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post with ID {} not found", id)))?;

        if let Some(title) = &input.title {
            if title.trim().is_empty() {
                return Err(PostServiceError::Validation(
                    "Post title cannot be empty".to_string(),
                ));
            }
        }

        if let Some(category_id) = input.category_id {
            self.categories
                .get_by_id(category_id)
                .await
                .context("Failed to look up category")?
                .ok_or(PostServiceError::CategoryNotFound(category_id))?;
        }

        Ok(self
            .posts
            .update(id, &input)
            .await
            .context("Failed to update post")?)
    }

    /// Open or close commenting on a post
    pub async fn set_can_comment(
        &self,
        id: i64,
        can_comment: bool,
    ) -> Result<(), PostServiceError> {
        self.posts
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post with ID {} not found", id)))?;

        Ok(self
            .posts
            .set_can_comment(id, can_comment)
            .await
            .context("Failed to toggle comments")?)
    }

    /// Delete a post together with its whole comment section.
    ///
    /// Returns the number of comments removed.
    ///
    /// # Errors
    /// - `NotFound` if the post doesn't exist
    pub async fn delete(&self, id: i64) -> Result<usize, PostServiceError> {
        let post = self
            .posts
            .get_by_id(id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("Post with ID {} not found", id)))?;

        let removed = self
            .posts
            .delete_with_comments(id)
            .await
            .context("Failed to delete post")?;

        tracing::info!(
            "Deleted post '{}' and {} comment(s)",
            post.title,
            removed
        );

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        CommentRepository, SqlxCategoryRepository, SqlxCommentRepository, SqlxPostRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::models::CreateCommentInput;
    use sqlx::SqlitePool;

    async fn setup_test_service() -> (SqlitePool, PostService) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let service = PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            SqlxCategoryRepository::boxed(pool.clone()),
        );
        (pool, service)
    }

    async fn create_category(pool: &SqlitePool, name: &str) -> i64 {
        let repo = SqlxCategoryRepository::new(pool.clone());
        repo.create(name).await.expect("Failed to create category").id
    }

    #[tokio::test]
    async fn test_create_in_named_category() {
        let (pool, service) = setup_test_service().await;
        let tech = create_category(&pool, "Tech").await;

        let post = service
            .create(CreatePostInput::new("Hello", "First post").with_category(tech))
            .await
            .expect("create failed");

        assert_eq!(post.category_id, tech);
        assert!(post.can_comment);
    }

    #[tokio::test]
    async fn test_create_without_category_uses_default() {
        let (pool, service) = setup_test_service().await;
        let categories = SqlxCategoryRepository::new(pool.clone());
        let default = categories.get_default().await.unwrap().unwrap();

        let post = service
            .create(CreatePostInput::new("Untagged", "body"))
            .await
            .expect("create failed");

        assert_eq!(post.category_id, default.id);
    }

    #[tokio::test]
    async fn test_create_unknown_category_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service
            .create(CreatePostInput::new("Nope", "body").with_category(4242))
            .await;
        assert!(matches!(result, Err(PostServiceError::CategoryNotFound(4242))));
    }

    #[tokio::test]
    async fn test_create_empty_title_fails() {
        let (_pool, service) = setup_test_service().await;

        let result = service.create(CreatePostInput::new("   ", "body")).await;
        assert!(matches!(result, Err(PostServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_post() {
        let (_pool, service) = setup_test_service().await;
        let post = service
            .create(CreatePostInput::new("Draft", "wip"))
            .await
            .expect("create failed");

        let updated = service
            .update(post.id, UpdatePostInput::new().with_title("Final"))
            .await
            .expect("update failed");
        assert_eq!(updated.title, "Final");
        assert_eq!(updated.body, "wip");
    }

    #[tokio::test]
    async fn test_update_move_to_unknown_category_fails() {
        let (_pool, service) = setup_test_service().await;
        let post = service
            .create(CreatePostInput::new("Stay", "put"))
            .await
            .expect("create failed");

        let result = service
            .update(post.id, UpdatePostInput::new().with_category(777))
            .await;
        assert!(matches!(result, Err(PostServiceError::CategoryNotFound(777))));
    }

    #[tokio::test]
    async fn test_set_can_comment() {
        let (_pool, service) = setup_test_service().await;
        let post = service
            .create(CreatePostInput::new("Quiet", "shh"))
            .await
            .expect("create failed");

        service
            .set_can_comment(post.id, false)
            .await
            .expect("toggle failed");

        let reloaded = service.get_by_id(post.id).await.unwrap().unwrap();
        assert!(!reloaded.can_comment);
    }

    #[tokio::test]
    async fn test_delete_removes_comment_thread() {
        let (pool, service) = setup_test_service().await;
        let comments = SqlxCommentRepository::new(pool.clone());

        let post = service
            .create(CreatePostInput::new("Discussed", "busy"))
            .await
            .expect("create failed");

        let root = comments
            .create(&CreateCommentInput::new(post.id, "alice", "a@example.com", "first"))
            .await
            .expect("comment failed");
        comments
            .create(
                &CreateCommentInput::new(post.id, "bob", "b@example.com", "reply")
                    .with_reply_to(root.id),
            )
            .await
            .expect("reply failed");

        let removed = service.delete(post.id).await.expect("delete failed");
        assert_eq!(removed, 2);
        assert!(service.get_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let (_pool, service) = setup_test_service().await;

        let result = service.delete(31337).await;
        assert!(matches!(result, Err(PostServiceError::NotFound(_))));
    }
}
