//! Admin service
//!
//! Credential and profile handling for the blog's single administrator.
//! Plaintext passwords exist only inside the `set_password`/`setup`
//! call frames; everything persisted goes through `services::password`.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::AdminRepository;
use crate::models::{Admin, AdminProfileInput, SetupAdminInput};
use crate::services::password::{hash_password, verify_password};

/// Error types for admin service operations
#[derive(Debug, thiserror::Error)]
pub enum AdminServiceError {
    /// No admin account has been set up yet
    #[error("Admin account not set up")]
    NotSetUp,

    /// Setup was called a second time
    #[error("Admin account already exists")]
    AlreadySetUp,

    /// Password verification attempted before any password was set
    #[error("Credentials not configured: no password has been set")]
    CredentialsNotConfigured,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Admin service managing the singleton owner account
pub struct AdminService {
    repo: Arc<dyn AdminRepository>,
}

impl AdminService {
    /// Create a new admin service
    pub fn new(repo: Arc<dyn AdminRepository>) -> Self {
        Self { repo }
    }

    /// One-time setup: create the admin account with a hashed password.
    pub async fn setup(&self, input: SetupAdminInput) -> Result<Admin, AdminServiceError> {
        if input.username.trim().is_empty() {
            return Err(AdminServiceError::Validation(
                "Username cannot be empty".to_string(),
            ));
        }
        if input.password.is_empty() {
            return Err(AdminServiceError::Validation(
                "Password cannot be empty".to_string(),
            ));
        }

        if self.repo.get().await.context("Failed to check for admin")?.is_some() {
            return Err(AdminServiceError::AlreadySetUp);
        }

        let password_hash = hash_password(&input.password)?;

        let admin = Admin {
            id: 0,
            username: input.username,
            password_hash,
            blog_title: input.blog_title,
            blog_sub_title: input.blog_sub_title,
            name: input.name,
            about: input.about,
        };

        let created = self
            .repo
            .create(&admin)
            .await
            .context("Failed to create admin")?;

        tracing::info!("Admin account created: {}", created.username);

        Ok(created)
    }

    /// Fetch the admin account
    pub async fn get(&self) -> Result<Admin, AdminServiceError> {
        self.repo
            .get()
            .await
            .context("Failed to get admin")?
            .ok_or(AdminServiceError::NotSetUp)
    }

    /// Whether setup has already run
    pub async fn is_set_up(&self) -> Result<bool, AdminServiceError> {
        Ok(self.repo.get().await.context("Failed to check for admin")?.is_some())
    }

    /// Replace the stored password hash with the hash of `password`.
    ///
    /// Any previous hash is overwritten; there is no way back to it.
    pub async fn set_password(&self, password: &str) -> Result<(), AdminServiceError> {
        if password.is_empty() {
            return Err(AdminServiceError::Validation(
                "Password cannot be empty".to_string(),
            ));
        }

        let admin = self.get().await?;
        let password_hash = hash_password(password)?;

        self.repo
            .update_password_hash(admin.id, &password_hash)
            .await
            .context("Failed to store password hash")?;

        Ok(())
    }

    /// Check a password attempt against the stored hash.
    ///
    /// A wrong password is `Ok(false)`, never an error. The only failure
    /// mode besides storage trouble is an account whose password was
    /// never set, reported as `CredentialsNotConfigured` rather than
    /// attempted as an empty-hash comparison.
    pub async fn validate_password(&self, password: &str) -> Result<bool, AdminServiceError> {
        let admin = self.get().await?;

        if !admin.has_password() {
            return Err(AdminServiceError::CredentialsNotConfigured);
        }

        Ok(verify_password(password, &admin.password_hash)?)
    }

    /// Update profile fields; None fields are left alone.
    pub async fn update_profile(
        &self,
        input: AdminProfileInput,
    ) -> Result<Admin, AdminServiceError> {
        let mut admin = self.get().await?;

        if let Some(blog_title) = input.blog_title {
            admin.blog_title = blog_title;
        }
        if let Some(blog_sub_title) = input.blog_sub_title {
            admin.blog_sub_title = blog_sub_title;
        }
        if let Some(name) = input.name {
            admin.name = name;
        }
        if let Some(about) = input.about {
            admin.about = about;
        }

        Ok(self
            .repo
            .update(&admin)
            .await
            .context("Failed to update admin profile")?)
    }
}
