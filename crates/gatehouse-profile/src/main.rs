//! Gatehouse Profile Server
//!
//! Internal profile and address service.

use gatehouse_core::logging::init_tracing;
use gatehouse_core::{AppConfig, ServiceRole};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let role = ServiceRole::Profile;
    let config = AppConfig::load(role)?;
    init_tracing(&config.logging, role.default_log_filter());

    tracing::info!(backend = ?config.database.backend, "Starting profile service");

    let service = gatehouse_profile::build_service(&config.database).await?;
    let app = gatehouse_profile::create_router(Arc::new(service));

    gatehouse_core::server::serve(app, &config.server, role.name()).await?;

    Ok(())
}
