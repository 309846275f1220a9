//! Comment service
//!
//! Business logic for the comment section:
//! - Submitting comments and replies
//! - Review moderation queue
//! - Threaded view of a post's comments
//! - Subtree deletion
//!
//! A reply must target a comment on the same post, and a post whose
//! comments are closed takes no new submissions.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{build_comment_tree, Comment, CommentNode, CreateCommentInput};

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Comment not found
    #[error("Comment not found: {0}")]
    NotFound(String),

    /// Target post not found
    #[error("Post not found: {0}")]
    PostNotFound(i64),

    /// The post's comment section is closed
    #[error("Comments are closed on post {0}")]
    CommentsClosed(i64),

    /// The reply target doesn't exist or lives on another post
    #[error("Invalid reply target: {0}")]
    InvalidReplyTarget(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    posts: Arc<dyn PostRepository>,
}

impl CommentService {
    /// Create a new comment service
    pub fn new(comments: Arc<dyn CommentRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { comments, posts }
    }

    /// Submit a comment (or a reply) on a post.
    ///
    /// Owner comments (`from_admin`) are born reviewed; visitor
    /// comments wait in the moderation queue.
    ///
    /// # Errors
    /// - `Validation` for an empty author, email, or body
    /// - `PostNotFound` for an unknown post
    /// - `CommentsClosed` when the post blocks new comments
    /// - `InvalidReplyTarget` when the parent is unknown or on another post
    pub async fn create(&self, input: CreateCommentInput) -> Result<Comment, CommentServiceError> {
        if input.author.trim().is_empty() {
            return Err(CommentServiceError::Validation(
                "Comment author cannot be empty".to_string(),
            ));
        }
        if input.email.trim().is_empty() {
            return Err(CommentServiceError::Validation(
                "Comment email cannot be empty".to_string(),
            ));
        }
        if input.body.trim().is_empty() {
            return Err(CommentServiceError::Validation(
                "Comment body cannot be empty".to_string(),
            ));
        }

        let post = self
            .posts
            .get_by_id(input.post_id)
            .await
            .context("Failed to look up post")?
            .ok_or(CommentServiceError::PostNotFound(input.post_id))?;

        if !post.can_comment && !input.from_admin {
            return Err(CommentServiceError::CommentsClosed(post.id));
        }

        if let Some(replied_id) = input.replied_id {
            let parent = self
                .comments
                .get_by_id(replied_id)
                .await
                .context("Failed to look up reply target")?
                .ok_or_else(|| {
                    CommentServiceError::InvalidReplyTarget(format!(
                        "Comment with ID {} not found",
                        replied_id
                    ))
                })?;

            if parent.post_id != input.post_id {
                return Err(CommentServiceError::InvalidReplyTarget(format!(
                    "Comment {} belongs to post {}, not post {}",
                    replied_id, parent.post_id, input.post_id
                )));
            }
        }

        Ok(self
            .comments
            .create(&input)
            .await
            .context("Failed to create comment")?)
    }

    /// Get comment by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>, CommentServiceError> {
        Ok(self
            .comments
            .get_by_id(id)
            .await
            .context("Failed to get comment")?)
    }

    /// Flat comment list of a post, oldest first
    pub async fn list_by_post(&self, post_id: i64) -> Result<Vec<Comment>, CommentServiceError> {
        Ok(self
            .comments
            .list_by_post(post_id)
            .await
            .context("Failed to list comments")?)
    }

    /// Threaded view of a post's comments.
    ///
    /// Roots keep submission order; replies nest under their parents.
    pub async fn thread_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentNode>, CommentServiceError> {
        let flat = self.list_by_post(post_id).await?;
        Ok(build_comment_tree(flat))
    }

    /// All comments awaiting review, oldest first
    pub async fn list_unreviewed(&self) -> Result<Vec<Comment>, CommentServiceError> {
        Ok(self
            .comments
            .list_unreviewed()
            .await
            .context("Failed to list unreviewed comments")?)
    }

    /// Mark a comment reviewed (or pull it back into the queue)
    ///
    /// # Errors
    /// - `NotFound` if the comment doesn't exist
    pub async fn set_reviewed(
        &self,
        id: i64,
        reviewed: bool,
    ) -> Result<(), CommentServiceError> {
        let changed = self
            .comments
            .set_reviewed(id, reviewed)
            .await
            .context("Failed to set review state")?;
        if !changed {
            return Err(CommentServiceError::NotFound(format!(
                "Comment with ID {} not found",
                id
            )));
        }
        Ok(())
    }

    /// Delete a comment and its whole reply subtree.
    ///
    /// Returns the number of comments removed.
    ///
    /// # Errors
    /// - `NotFound` if the comment doesn't exist
    pub async fn delete(&self, id: i64) -> Result<usize, CommentServiceError> {
        let removed = self
            .comments
            .delete_subtree(id)
            .await
            .context("Failed to delete comment")?;
        if removed == 0 {
            return Err(CommentServiceError::NotFound(format!(
                "Comment with ID {} not found",
                id
            )));
        }

        tracing::info!("Deleted comment {} and its replies ({} total)", id, removed);
        Ok(removed)
    }
}
