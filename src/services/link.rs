//! Link service
//!
//! Thin CRUD layer over the blogroll.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::LinkRepository;
use crate::models::{CreateLinkInput, Link, UpdateLinkInput};

/// Error types for link service operations
#[derive(Debug, thiserror::Error)]
pub enum LinkServiceError {
    /// Link not found
    #[error("Link not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Link service
pub struct LinkService {
    repo: Arc<dyn LinkRepository>,
}

impl LinkService {
    /// Create a new link service
    pub fn new(repo: Arc<dyn LinkRepository>) -> Self {
        Self { repo }
    }

    /// Add a link to the blogroll
    ///
    /// # Errors
    /// - `Validation` for an empty caption or URL
    pub async fn create(&self, input: CreateLinkInput) -> Result<Link, LinkServiceError> {
        if input.name.trim().is_empty() {
            return Err(LinkServiceError::Validation(
                "Link caption cannot be empty".to_string(),
            ));
        }
        if input.url.trim().is_empty() {
            return Err(LinkServiceError::Validation(
                "Link URL cannot be empty".to_string(),
            ));
        }

        Ok(self
            .repo
            .create(&input)
            .await
            .context("Failed to create link")?)
    }

    /// Get link by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Link>, LinkServiceError> {
        Ok(self.repo.get_by_id(id).await.context("Failed to get link")?)
    }

    /// List all links, name order
    pub async fn list(&self) -> Result<Vec<Link>, LinkServiceError> {
        Ok(self.repo.list().await.context("Failed to list links")?)
    }

    /// Update a link's caption and/or URL
    ///
    /// # Errors
    /// - `NotFound` if the link doesn't exist
    pub async fn update(&self, id: i64, input: UpdateLinkInput) -> Result<Link, LinkServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get link")?
            .ok_or_else(|| LinkServiceError::NotFound(format!("Link with ID {} not found", id)))?;

        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                return Err(LinkServiceError::Validation(
                    "Link caption cannot be empty".to_string(),
                ));
            }
        }
        if let Some(url) = &input.url {
            if url.trim().is_empty() {
                return Err(LinkServiceError::Validation(
                    "Link URL cannot be empty".to_string(),
                ));
            }
        }

        Ok(self
            .repo
            .update(id, &input)
            .await
            .context("Failed to update link")?)
    }

    /// Delete a link
    ///
    /// # Errors
    /// - `NotFound` if the link doesn't exist
    pub async fn delete(&self, id: i64) -> Result<(), LinkServiceError> {
        let removed = self
            .repo
            .delete(id)
            .await
            .context("Failed to delete link")?;
        if !removed {
            return Err(LinkServiceError::NotFound(format!(
                "Link with ID {} not found",
                id
            )));
        }
        Ok(())
    }
}
