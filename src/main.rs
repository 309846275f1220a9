//! Petal - the data core of a small personal blog

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use petal::{
    config::Config,
    db::{
        self,
        repositories::{SqlxAdminRepository, SqlxCategoryRepository},
    },
    models::SetupAdminInput,
    services::{AdminService, CategoryService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment always wins
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petal=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Petal...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    // The seed migration guarantees the default category; a missing one
    // means the store is corrupt, better to fail here than mid-delete.
    let category_service = CategoryService::new(SqlxCategoryRepository::boxed(pool.clone()));
    let default = category_service.get_default().await?;
    tracing::info!("Default category: '{}'", default.name);

    // Bootstrap the admin account from config on first run
    let admin_service = AdminService::new(SqlxAdminRepository::boxed(pool.clone()));
    if !admin_service.is_set_up().await? {
        match (&config.admin.username, &config.admin.password) {
            (Some(username), Some(password)) => {
                admin_service
                    .setup(SetupAdminInput {
                        username: username.clone(),
                        password: password.clone(),
                        blog_title: config.admin.blog_title.clone(),
                        blog_sub_title: String::new(),
                        name: username.clone(),
                        about: String::new(),
                    })
                    .await?;
                tracing::info!("Admin account '{}' created", username);
            }
            _ => {
                tracing::warn!(
                    "No admin account exists and no credentials are configured; \
                     set PETAL_ADMIN_USERNAME and PETAL_ADMIN_PASSWORD"
                );
            }
        }
    }

    let categories = category_service.list().await?;
    tracing::info!("Ready: {} categories", categories.len());

    Ok(())
}
