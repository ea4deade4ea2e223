//! Internal HTTP API of the profile service

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use gatehouse_core::wire::{
    AddAddressRequest, CreateProfileRequest, CreateProfileResponse, UpdateProfileRequest,
};
use gatehouse_core::{Address, GatehouseError, JsonBody, Profile, Result};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::service::ProfileService;

pub fn create_router(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/internal/profiles", post(create_profile))
        .route(
            "/internal/profiles/:id",
            get(get_profile).put(update_profile).delete(delete_profile),
        )
        .route(
            "/internal/profiles/:id/addresses",
            post(add_address).get(list_addresses),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

fn profile_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| GatehouseError::not_found("Profile"))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "profile",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn ready(State(service): State<Arc<ProfileService>>) -> impl IntoResponse {
    let ready = service.is_ready().await;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(json!({ "ready": ready })))
}

async fn create_profile(
    State(service): State<Arc<ProfileService>>,
    JsonBody(request): JsonBody<CreateProfileRequest>,
) -> Result<impl IntoResponse> {
    let created = service
        .create_profile(request.id, &request.email, &request.name)
        .await?;

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(CreateProfileResponse {
            id: request.id,
            created,
        }),
    ))
}

async fn get_profile(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
) -> Result<Json<Profile>> {
    Ok(Json(service.get_profile(profile_id(&id)?).await?))
}

async fn update_profile(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let profile = service
        .update_profile(profile_id(&id)?, request.into())
        .await?;
    Ok(Json(profile))
}

async fn delete_profile(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    service.delete_profile(profile_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_address(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<AddAddressRequest>,
) -> Result<impl IntoResponse> {
    let address = service
        .add_address(profile_id(&id)?, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

async fn list_addresses(
    State(service): State<Arc<ProfileService>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Address>>> {
    Ok(Json(service.list_addresses(profile_id(&id)?).await?))
}
