//! Gatehouse Gateway Server
//!
//! Public REST API in front of the credential and profile services.

use gatehouse_core::logging::init_tracing;
use gatehouse_core::{AppConfig, GatewayMode, ServiceRole};
use gatehouse_gateway::{clients, create_router, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let role = ServiceRole::Gateway;
    let config = AppConfig::load(role)?;
    init_tracing(&config.logging, role.default_log_filter());

    match config.services.gateway_mode {
        GatewayMode::Remote => tracing::info!(
            auth_url = %config.services.auth_url,
            profile_url = %config.services.profile_url,
            "Gateway forwarding to remote services"
        ),
        GatewayMode::Embedded => {
            if config.auth.uses_development_secret() {
                tracing::warn!("JWT_SECRET is not set; using the development signing secret");
            }
            tracing::info!(backend = ?config.database.backend, "Gateway running services in-process");
        }
    }

    let (auth, profiles) = clients::connect(&config).await?;
    let server_config = config.server.clone();
    let state = Arc::new(AppState::new(config, auth, profiles));

    let app = create_router(state);
    tracing::info!("OpenAPI spec at /api-docs/openapi.json");

    gatehouse_core::server::serve(app, &server_config, role.name()).await?;

    Ok(())
}
