//! Services layer - Business logic
//!
//! Services implement the business rules on top of the repositories:
//! validation, the default-category reassignment on delete, cascade
//! deletes, and credential handling. Each service owns its error enum.

pub mod admin;
pub mod category;
pub mod comment;
pub mod link;
pub mod password;
pub mod post;

pub use admin::{AdminService, AdminServiceError};
pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use link::{LinkService, LinkServiceError};
pub use password::{hash_password, verify_password};
pub use post::{PostService, PostServiceError};
