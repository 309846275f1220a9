//! Link repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::{CreateLinkInput, Link, UpdateLinkInput};

/// Link repository trait
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Create a new link
    async fn create(&self, input: &CreateLinkInput) -> Result<Link>;

    /// Get link by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Link>>;

    /// List all links, name order
    async fn list(&self) -> Result<Vec<Link>>;

    /// Update caption and/or URL
    async fn update(&self, id: i64, input: &UpdateLinkInput) -> Result<Link>;

    /// Delete a link; true when a row was removed
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based link repository
pub struct SqlxLinkRepository {
    pool: SqlitePool,
}

impl SqlxLinkRepository {
    /// Create a new SQLx link repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use behind the trait
    pub fn boxed(pool: SqlitePool) -> Arc<dyn LinkRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LinkRepository for SqlxLinkRepository {
    async fn create(&self, input: &CreateLinkInput) -> Result<Link> {
        let result = sqlx::query("INSERT INTO links (name, url) VALUES (?, ?)")
            .bind(&input.name)
            .bind(&input.url)
            .execute(&self.pool)
            .await
            .context("Failed to create link")?;

        Ok(Link {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            url: input.url.clone(),
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Link>> {
        let row = sqlx::query("SELECT id, name, url FROM links WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get link by ID")?;

        row.map(|r| row_to_link(&r)).transpose()
    }

    async fn list(&self) -> Result<Vec<Link>> {
        let rows = sqlx::query("SELECT id, name, url FROM links ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list links")?;

        rows.iter().map(row_to_link).collect()
    }

    async fn update(&self, id: i64, input: &UpdateLinkInput) -> Result<Link> {
        let mut link = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

        if let Some(ref name) = input.name {
            link.name = name.clone();
        }
        if let Some(ref url) = input.url {
            link.url = url.clone();
        }

        sqlx::query("UPDATE links SET name = ?, url = ? WHERE id = ?")
            .bind(&link.name)
            .bind(&link.url)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update link")?;

        Ok(link)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete link")?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_link(row: &sqlx::sqlite::SqliteRow) -> Result<Link> {
    Ok(Link {
        id: row.get("id"),
        name: row.get("name"),
        url: row.get("url"),
    })
}
