//! Data models
//!
//! This module contains the persistent entities of the blog core:
//! Admin, Category, Post, Comment and Link, plus the input types used
//! when creating or updating them.

mod admin;
mod category;
mod comment;
mod link;
mod post;

pub use admin::{Admin, AdminProfileInput, SetupAdminInput};
pub use category::{Category, CreateCategoryInput};
pub use comment::{build_comment_tree, Comment, CommentNode, CreateCommentInput};
pub use link::{CreateLinkInput, Link, UpdateLinkInput};
pub use post::{CreatePostInput, Post, UpdatePostInput};
