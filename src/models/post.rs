//! Post model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity
///
/// Every post belongs to exactly one category and exclusively owns its
/// comments: deleting the post deletes the whole comment tree with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
    /// Creation timestamp (indexed, newest-first listing)
    pub timestamp: DateTime<Utc>,
    /// Whether new comments are accepted
    pub can_comment: bool,
    /// Owning category
    pub category_id: i64,
}

/// Input for creating a post
#[derive(Debug, Clone)]
pub struct CreatePostInput {
    /// Post title (required)
    pub title: String,
    /// Post body (required)
    pub body: String,
    /// Category to file the post under; the default category when None
    pub category_id: Option<i64>,
    /// Whether comments are open (defaults to true)
    pub can_comment: Option<bool>,
}

impl CreatePostInput {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            category_id: None,
            can_comment: None,
        }
    }

    /// Set the category
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set whether comments are open
    pub fn with_can_comment(mut self, can_comment: bool) -> Self {
        self.can_comment = Some(can_comment);
        self
    }
}

/// Input for updating a post
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    /// New title (optional)
    pub title: Option<String>,
    /// New body (optional)
    pub body: Option<String>,
    /// New category (optional)
    pub category_id: Option<i64>,
}

impl UpdatePostInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the category
    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}
