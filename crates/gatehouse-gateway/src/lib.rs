//! Gatehouse Gateway - public HTTP API
//!
//! Routes client requests to the credential and profile services. Protected
//! routes pass through the bearer token gate and a strict self-access check
//! before reaching a handler.

pub mod authorize;
pub mod backend;
pub mod clients;
pub mod gate;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use authorize::{authorize_self_access, SelfAccess};
pub use backend::{AuthBackend, ProfileBackend};
pub use gate::{bearer_token, AuthenticatedUser, GateError};
pub use state::AppState;

use axum::{
    http::{header, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use handlers::health;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::middleware::{metrics_middleware, security_headers_middleware};

/// Build the full gateway router
pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Gateway over in-process services and in-memory stores
///
/// Uses a fixed signing secret and a cheap Argon2 cost.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_router_for_testing() -> Router {
    create_router(test_state())
}

#[cfg(any(test, feature = "test-utils"))]
pub fn test_state() -> Arc<AppState> {
    use gatehouse_auth::{PasswordConfig, SecretHasher, TokenCodec};
    use gatehouse_core::{AppConfig, GatewayMode, ServiceRole};

    let mut config = AppConfig::for_role(ServiceRole::Gateway);
    config.services.gateway_mode = GatewayMode::Embedded;

    let hasher = SecretHasher::new(&PasswordConfig {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        output_len: Some(32),
    })
    .expect("test hashing parameters are valid");
    let codec = TokenCodec::with_secret("gateway-test-secret", &config.auth.issuer, 3600);

    let backends = clients::EmbeddedBackends::in_memory(codec, hasher)
        .expect("in-memory backends build");

    Arc::new(AppState::new(
        config,
        backends.credentials,
        backends.profiles,
    ))
}
