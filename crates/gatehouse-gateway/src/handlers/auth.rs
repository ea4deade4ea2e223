//! Registration and login handlers
//!
//! Public routes; the request gate does not run in front of them.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gatehouse_core::audit::{audit_log, AuditEvent};
use gatehouse_core::wire::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use gatehouse_core::{JsonBody, Result};
use std::sync::Arc;
use validator::Validate;

/// Register a new account
///
/// Creates the account and its profile. A failure to create the profile is
/// reported as a 500 even though the account itself was stored.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = RegisterResponse),
        (status = 400, description = "Invalid or missing fields", body = gatehouse_core::ApiError),
        (status = 409, description = "Email already registered", body = gatehouse_core::ApiError),
        (status = 500, description = "Internal server error", body = gatehouse_core::ApiError),
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    if let Err(errors) = request.validate() {
        audit_log(&AuditEvent::RegistrationFailure {
            email: request.email.clone(),
            reason: "validation failed".to_string(),
        });
        return Err(errors.into());
    }

    let user_id = state.auth.register(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with email and password
///
/// Unknown email and wrong password produce the same 401 response.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid or missing fields", body = gatehouse_core::ApiError),
        (status = 401, description = "Invalid credentials", body = gatehouse_core::ApiError),
        (status = 500, description = "Internal server error", body = gatehouse_core::ApiError),
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate()?;
    Ok(Json(state.auth.login(request).await?))
}
