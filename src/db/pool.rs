//! Database connection pool
//!
//! The blog targets single-binary deployment on an embedded SQLite file,
//! so the pool factory accepts a bare file path, a `sqlite:` URL, or
//! `:memory:`, creating the parent directory and the database file as
//! needed. Foreign keys are enabled on every pool because SQLite leaves
//! them off otherwise, and the referential constraints between posts,
//! categories and comments depend on them.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Create a SQLite connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    let in_memory =
        config.url.starts_with(":memory:") || config.url.starts_with("sqlite::memory:");

    // Ensure the database directory exists for file-based SQLite
    if !in_memory {
        let path = config.url.trim_start_matches("sqlite:");

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }
    }

    // Build the connection URL with create mode for file-based databases
    let connection_url = if config.url.starts_with("sqlite:") {
        if config.url.contains('?') {
            config.url.clone()
        } else {
            format!("{}?mode=rwc", config.url)
        }
    } else if config.url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", config.url)
    };

    // Every connection to an in-memory database sees its own empty
    // database, so such a pool must never grow past one connection.
    let max_connections = if in_memory {
        1
    } else {
        config.max_connections
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to SQLite database: {}", config.url))?;

    // SQLite ships with foreign keys off
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

/// Create a SQLite in-memory pool for testing.
///
/// In-memory databases vanish when their last connection closes, so a
/// single connection keeps the schema alive for the test's lifetime.
pub async fn create_test_pool() -> Result<SqlitePool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
        max_connections: 1,
    };
    create_pool(&config).await
}
