//! Gatehouse Auth Server
//!
//! Internal credential service: registration, login and token verification.

use gatehouse_core::logging::init_tracing;
use gatehouse_core::{AppConfig, ServiceRole};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let role = ServiceRole::Auth;
    let config = AppConfig::load(role)?;
    init_tracing(&config.logging, role.default_log_filter());

    if config.auth.uses_development_secret() {
        tracing::warn!("JWT_SECRET is not set; using the development signing secret");
    }
    tracing::info!(
        backend = ?config.database.backend,
        profile_url = %config.services.profile_url,
        "Starting credential service"
    );

    let service = gatehouse_auth::build_service(&config).await?;
    let app = gatehouse_auth::create_router(Arc::new(service));

    gatehouse_core::server::serve(app, &config.server, role.name()).await?;

    Ok(())
}
