//! Category service
//!
//! Business logic for categories:
//! - Create, rename, list, delete
//! - Name uniqueness validation
//! - Post migration to the default category on deletion
//!
//! Deleting a category never deletes posts. The posts move to the
//! permanent default category and the category row disappears, in one
//! transaction driven by the repository.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::db::repositories::CategoryRepository;
use crate::models::{Category, CreateCategoryInput};

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category name already exists
    #[error("Category name already exists: {0}")]
    DuplicateName(String),

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Cannot delete the default category
    #[error("Cannot delete the default category")]
    CannotDeleteDefault,

    /// The permanent default category is missing from storage. The seed
    /// migration guarantees it, so hitting this means the store is
    /// corrupt and nothing can absorb reassigned posts.
    #[error("Default category missing: nothing to reassign posts to")]
    DefaultCategoryMissing,

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Category service
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a new category.
    ///
    /// # Errors
    /// - `Validation` for an empty name
    /// - `DuplicateName` when the name is taken
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        if self
            .repo
            .exists_by_name(name)
            .await
            .context("Failed to check name uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateName(name.to_string()));
        }

        Ok(self
            .repo
            .create(name)
            .await
            .context("Failed to create category")?)
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category by ID")?)
    }

    /// Get category by name
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>, CategoryServiceError> {
        Ok(self
            .repo
            .get_by_name(name)
            .await
            .context("Failed to get category by name")?)
    }

    /// List all categories
    pub async fn list(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.repo.list().await.context("Failed to list categories")?)
    }

    /// Get the permanent default category.
    ///
    /// Errors with `DefaultCategoryMissing` when the seeded row is gone.
    pub async fn get_default(&self) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_default()
            .await
            .context("Failed to get default category")?
            .ok_or(CategoryServiceError::DefaultCategoryMissing)
    }

    /// Rename a category
    ///
    /// # Errors
    /// - `NotFound` if the category doesn't exist
    /// - `DuplicateName` if the new name is taken by another category
    pub async fn rename(&self, id: i64, name: &str) -> Result<Category, CategoryServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CategoryServiceError::Validation(
                "Category name cannot be empty".to_string(),
            ));
        }

        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("Category with ID {} not found", id)))?;

        if name != category.name
            && self
                .repo
                .exists_by_name(name)
                .await
                .context("Failed to check name uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateName(name.to_string()));
        }

        Ok(self
            .repo
            .rename(id, name)
            .await
            .context("Failed to rename category")?)
    }

    /// Delete a category, moving its posts to the default category.
    ///
    /// The reassignment and the delete commit as one unit: either every
    /// post of the category points at the default and the category is
    /// gone, or nothing happened.
    ///
    /// # Errors
    /// - `NotFound` if the category doesn't exist
    /// - `CannotDeleteDefault` when aimed at the default itself
    /// - `DefaultCategoryMissing` when the fallback target is gone
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(format!("Category with ID {} not found", id)))?;

        if category.is_default() {
            return Err(CategoryServiceError::CannotDeleteDefault);
        }

        let default = self.get_default().await?;

        let moved = self
            .repo
            .count_posts(id)
            .await
            .context("Failed to count posts")?;

        self.repo
            .delete_and_reassign(id, default.id)
            .await
            .context("Failed to delete category")?;

        tracing::info!(
            "Deleted category '{}', moved {} post(s) to '{}'",
            category.name,
            moved,
            default.name
        );

        Ok(())
    }
}
