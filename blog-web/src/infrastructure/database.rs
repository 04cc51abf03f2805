use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

use super::config::DatabaseConfig;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("failed to connect to DATABASE_URL")?;

    tracing::info!(
        "Database connection pool created (max_connections={})",
        config.max_connections
    );
    Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    tracing::info!("Database migrations completed");
    Ok(())
}
