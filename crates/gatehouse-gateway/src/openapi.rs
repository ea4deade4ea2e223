//! OpenAPI document for the public API

use crate::handlers::{auth, health, users};
use gatehouse_core::wire::{
    AddAddressRequest, AddressResponse, LoginRequest, LoginResponse, MessageResponse,
    RegisterRequest, RegisterResponse, UpdateProfileRequest, UserResponse,
};
use gatehouse_core::ApiError;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        health::readiness_check,
        auth::register_handler,
        auth::login_handler,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::add_address,
        users::list_addresses,
    ),
    components(schemas(
        ApiError,
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        UpdateProfileRequest,
        UserResponse,
        AddAddressRequest,
        AddressResponse,
        MessageResponse,
        health::HealthResponse,
        health::BuildInfo,
        health::ReadinessResponse,
        health::ReadinessChecks,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and readiness"),
        (name = "auth", description = "Registration and login"),
        (name = "users", description = "Self-service profile and addresses"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_public_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/api/v1/auth/register",
            "/api/v1/auth/login",
            "/api/v1/users/{id}",
            "/api/v1/users/{id}/addresses",
            "/health",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected}"
            );
        }
    }
}
