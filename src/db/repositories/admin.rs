//! Admin repository
//!
//! The admin table holds at most one row. `get` fetches it without
//! needing an id, and `create` is expected to run once at setup time.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::models::Admin;

/// Admin repository trait
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Fetch the singleton admin row, if setup has run
    async fn get(&self) -> Result<Option<Admin>>;

    /// Create the admin row
    async fn create(&self, admin: &Admin) -> Result<Admin>;

    /// Update profile fields (username, titles, name, about)
    async fn update(&self, admin: &Admin) -> Result<Admin>;

    /// Overwrite the stored password hash
    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()>;
}

/// SQLx-based admin repository
pub struct SqlxAdminRepository {
    pool: SqlitePool,
}

impl SqlxAdminRepository {
    /// Create a new SQLx admin repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a shared repository for use behind the trait
    pub fn boxed(pool: SqlitePool) -> Arc<dyn AdminRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl AdminRepository for SqlxAdminRepository {
    async fn get(&self) -> Result<Option<Admin>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, blog_title, blog_sub_title, name, about
            FROM admin
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get admin")?;

        row.map(|r| row_to_admin(&r)).transpose()
    }

    async fn create(&self, admin: &Admin) -> Result<Admin> {
        let result = sqlx::query(
            r#"
            INSERT INTO admin (username, password_hash, blog_title, blog_sub_title, name, about)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&admin.username)
        .bind(&admin.password_hash)
        .bind(&admin.blog_title)
        .bind(&admin.blog_sub_title)
        .bind(&admin.name)
        .bind(&admin.about)
        .execute(&self.pool)
        .await
        .context("Failed to create admin")?;

        Ok(Admin {
            id: result.last_insert_rowid(),
            ..admin.clone()
        })
    }

    async fn update(&self, admin: &Admin) -> Result<Admin> {
        sqlx::query(
            r#"
            UPDATE admin
            SET username = ?, blog_title = ?, blog_sub_title = ?, name = ?, about = ?
            WHERE id = ?
            "#,
        )
        .bind(&admin.username)
        .bind(&admin.blog_title)
        .bind(&admin.blog_sub_title)
        .bind(&admin.name)
        .bind(&admin.about)
        .bind(admin.id)
        .execute(&self.pool)
        .await
        .context("Failed to update admin")?;

        self.get()
            .await?
            .ok_or_else(|| anyhow::anyhow!("Admin not found after update"))
    }

    async fn update_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE admin SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update password hash")?;

        Ok(())
    }
}

fn row_to_admin(row: &sqlx::sqlite::SqliteRow) -> Result<Admin> {
    Ok(Admin {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        blog_title: row.get("blog_title"),
        blog_sub_title: row.get("blog_sub_title"),
        name: row.get("name"),
        about: row.get("about"),
    })
}
