//! Profile and address handlers
//!
//! All routes here sit behind the request gate and take [`SelfAccess`], so
//! a handler body only runs for the owner of the `:id` in the path.

use crate::authorize::SelfAccess;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use gatehouse_core::wire::{
    AddAddressRequest, AddressResponse, MessageResponse, UpdateProfileRequest, UserResponse,
};
use gatehouse_core::{GatehouseError, JsonBody, Profile, Result};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Read a profile, creating it from the account if registration left it
/// missing. A soft-deleted profile is not recreated.
async fn load_or_reconcile(state: &AppState, id: Uuid) -> Result<Profile> {
    match state.profiles.get_profile(id).await {
        Err(GatehouseError::NotFound(_)) => {}
        other => return other,
    }

    let account = match state.auth.account(id).await {
        Ok(account) => account,
        Err(GatehouseError::NotFound(_)) => return Err(GatehouseError::not_found("Profile")),
        Err(e) => return Err(e),
    };

    tracing::warn!(user_id = %id, "Profile missing for existing account, recreating");
    state
        .profiles
        .create_profile(account.id, &account.email, &account.name)
        .await?;

    state.profiles.get_profile(id).await
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = gatehouse_core::ApiError),
        (status = 403, description = "Not the caller's profile", body = gatehouse_core::ApiError),
        (status = 404, description = "Profile not found", body = gatehouse_core::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    SelfAccess(id): SelfAccess,
) -> Result<Json<UserResponse>> {
    let profile = load_or_reconcile(&state, id).await?;
    Ok(Json(profile.into()))
}

/// Update the caller's name and/or phone
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Nothing to update", body = gatehouse_core::ApiError),
        (status = 403, description = "Not the caller's profile", body = gatehouse_core::ApiError),
        (status = 404, description = "Profile not found", body = gatehouse_core::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    SelfAccess(id): SelfAccess,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    if request.name.is_none() && request.phone.is_none() {
        return Err(GatehouseError::validation(
            "At least one of name or phone is required",
        ));
    }

    let profile = state.profiles.update_profile(id, request.into()).await?;
    Ok(Json(profile.into()))
}

/// Soft-delete the caller's profile
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Profile deleted", body = MessageResponse),
        (status = 403, description = "Not the caller's profile", body = gatehouse_core::ApiError),
        (status = 404, description = "Profile not found", body = gatehouse_core::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    SelfAccess(id): SelfAccess,
) -> Result<Json<MessageResponse>> {
    state.profiles.delete_profile(id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// Add an address to the caller's profile
#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/addresses",
    tag = "users",
    params(("id" = Uuid, Path, description = "Account id")),
    request_body = AddAddressRequest,
    responses(
        (status = 201, description = "Address added", body = AddressResponse),
        (status = 400, description = "Invalid or missing fields", body = gatehouse_core::ApiError),
        (status = 403, description = "Not the caller's profile", body = gatehouse_core::ApiError),
        (status = 404, description = "Profile not found", body = gatehouse_core::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_address(
    State(state): State<Arc<AppState>>,
    SelfAccess(id): SelfAccess,
    JsonBody(request): JsonBody<AddAddressRequest>,
) -> Result<impl IntoResponse> {
    request.validate()?;

    let address = state.profiles.add_address(id, request.into()).await?;
    Ok((StatusCode::CREATED, Json(AddressResponse::from(address))))
}

/// List the caller's addresses in creation order
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/addresses",
    tag = "users",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 200, description = "Addresses", body = [AddressResponse]),
        (status = 403, description = "Not the caller's profile", body = gatehouse_core::ApiError),
        (status = 404, description = "Profile not found", body = gatehouse_core::ApiError),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_addresses(
    State(state): State<Arc<AppState>>,
    SelfAccess(id): SelfAccess,
) -> Result<Json<Vec<AddressResponse>>> {
    let addresses = state.profiles.list_addresses(id).await?;
    Ok(Json(addresses.into_iter().map(AddressResponse::from).collect()))
}
