//! PostgreSQL connection pool bootstrap

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use crate::config::DatabaseConfig;
use crate::error::StoreError;

/// Connect a bounded pool. Acquiring a connection never waits longer than
/// `acquire_timeout_secs`.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| StoreError::Unavailable(format!("PostgreSQL connection failed: {e}")))
}

/// Cheap liveness probe for readiness checks
pub async fn ping(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}
