//! Admin model
//!
//! The blog has exactly one administrator. The row stores the owner's
//! profile together with the blog-level titles shown on every page, and
//! the argon2 hash of the login password. Plaintext is never persisted;
//! hashing happens in `services::password` before the row is written.

use serde::{Deserialize, Serialize};

/// The singleton administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    /// Unique identifier
    pub id: i64,
    /// Login name
    pub username: String,
    /// Argon2 hash of the password (PHC string), empty until set
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Blog title
    pub blog_title: String,
    /// Blog subtitle
    pub blog_sub_title: String,
    /// Owner's display name
    pub name: String,
    /// About page text
    pub about: String,
}

impl Admin {
    /// Whether a password has ever been set for this account.
    pub fn has_password(&self) -> bool {
        !self.password_hash.is_empty()
    }
}

/// Input for the one-time admin setup.
///
/// Carries the plaintext password; `AdminService::setup` hashes it before
/// anything touches the database.
#[derive(Debug, Clone)]
pub struct SetupAdminInput {
    pub username: String,
    pub password: String,
    pub blog_title: String,
    pub blog_sub_title: String,
    pub name: String,
    pub about: String,
}

/// Input for updating the admin profile (everything except credentials)
#[derive(Debug, Clone, Default)]
pub struct AdminProfileInput {
    /// New blog title (optional)
    pub blog_title: Option<String>,
    /// New blog subtitle (optional)
    pub blog_sub_title: Option<String>,
    /// New display name (optional)
    pub name: Option<String>,
    /// New about text (optional)
    pub about: Option<String>,
}
