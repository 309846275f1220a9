//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity; the
//! multi-statement operations (category reassignment, cascade deletes)
//! run inside a single transaction here, so partial application is never
//! observable.

pub mod admin;
pub mod category;
pub mod comment;
pub mod link;
pub mod post;

pub use admin::{AdminRepository, SqlxAdminRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use comment::{CommentRepository, SqlxCommentRepository};
pub use link::{LinkRepository, SqlxLinkRepository};
pub use post::{PostRepository, SqlxPostRepository};
