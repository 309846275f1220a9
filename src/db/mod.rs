//! Database layer
//!
//! SQLite access for the blog core. The pool module creates the
//! connection pool, migrations keeps the schema current, and the
//! repositories implement the per-entity data access behind traits.
//!
//! # Usage
//!
//! ```ignore
//! use petal::config::DatabaseConfig;
//! use petal::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool};
