//! Internal HTTP API of the credential service
//!
//! Trusted-network only; the gateway and the CLI smoke test are its callers.
//! A rejected token is reported as `200 {"valid": false}` so that callers can
//! tell "token rejected" apart from "verifier unreachable".

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use gatehouse_core::wire::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, VerifyTokenRequest,
    VerifyTokenResponse,
};
use gatehouse_core::{AccountSummary, GatehouseError, JsonBody, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::service::CredentialService;

pub fn create_router(service: Arc<CredentialService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/internal/accounts", post(register))
        .route("/internal/accounts/:id", get(get_account))
        .route("/internal/sessions", post(login))
        .route("/internal/tokens/verify", post(verify_token))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "auth",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn ready(State(service): State<Arc<CredentialService>>) -> impl IntoResponse {
    let ready = service.is_ready().await;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({ "ready": ready })))
}

async fn register(
    State(service): State<Arc<CredentialService>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let user_id = service.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

async fn get_account(
    State(service): State<Arc<CredentialService>>,
    Path(id): Path<String>,
) -> Result<Json<AccountSummary>> {
    let id = Uuid::parse_str(&id).map_err(|_| GatehouseError::not_found("Account"))?;
    Ok(Json(service.account(id).await?))
}

async fn login(
    State(service): State<Arc<CredentialService>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    Ok(Json(service.login(request).await?))
}

async fn verify_token(
    State(service): State<Arc<CredentialService>>,
    JsonBody(request): JsonBody<VerifyTokenRequest>,
) -> Json<VerifyTokenResponse> {
    let response = match service.verify_token(&request.token) {
        Ok(user_id) => VerifyTokenResponse::accepted(user_id),
        Err(e) => VerifyTokenResponse::rejected(e.to_string()),
    };
    Json(response)
}
