//! Gateway API Integration Tests
//!
//! The gateway runs with in-process services over in-memory stores, so
//! every test drives the real gate, authorizer and handlers.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use gatehouse_auth::{CredentialService, MemoryCredentialStore, PasswordConfig, SecretHasher, TokenCodec};
use gatehouse_core::wire::{LoginRequest, LoginResponse, RegisterRequest};
use gatehouse_core::{
    AccountSummary, AppConfig, GatehouseError, ProfileMirror, Result, ServiceRole,
};
use gatehouse_gateway::middleware::metrics::UNMATCHED_ENDPOINT;
use gatehouse_gateway::{create_router, create_router_for_testing, AppState, AuthBackend};
use gatehouse_profile::{MemoryProfileStore, ProfileService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Helper to create a test request
fn create_json_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    match body {
        Some(json_body) => builder
            .body(Body::from(serde_json::to_string(&json_body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn authorized(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let mut request = create_json_request(method, uri, body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Register and log in, returning (user id, token)
async fn register_and_login(app: &Router, email: &str, password: &str, name: &str) -> (String, String) {
    let (status, body) = send(
        app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({"email": email, "password": password, "name": name})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    let user_id = body["user_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": email, "password": password})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    (user_id, body["token"].as_str().unwrap().to_string())
}

fn fast_hasher() -> SecretHasher {
    SecretHasher::new(&PasswordConfig {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
        output_len: Some(32),
    })
    .unwrap()
}

// =============================================================================
// End-to-end Scenario
// =============================================================================

#[tokio::test]
async fn test_register_login_and_self_access() {
    let app = create_router_for_testing();

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({"email": "alice@example.com", "password": "Secr3t!", "name": "Alice"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = body["user_id"].as_str().unwrap().to_string();
    assert!(!user_id.is_empty());
    assert_eq!(body["message"], "User registered successfully");

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "alice@example.com", "password": "Secr3t!"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], user_id.as_str());
    assert_eq!(body["name"], "Alice");
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(token.split('.').count(), 3);

    let uri = format!("/api/v1/users/{user_id}");

    let (status, body) = send(&app, authorized("GET", &uri, &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user_id.as_str());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");

    let (status, body) = send(&app, create_json_request("GET", &uri, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let other = format!("/api/v1/users/{}", Uuid::new_v4());
    let (status, body) = send(&app, authorized("GET", &other, &token, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_cannot_touch_another_users_profile() {
    let app = create_router_for_testing();
    let (alice_id, _) = register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;
    let (_, bob_token) = register_and_login(&app, "bob@example.com", "hunter2", "Bob").await;

    let uri = format!("/api/v1/users/{alice_id}");
    for request in [
        authorized("GET", &uri, &bob_token, None),
        authorized("PUT", &uri, &bob_token, Some(json!({"name": "Mallory"}))),
        authorized("DELETE", &uri, &bob_token, None),
        authorized("GET", &format!("{uri}/addresses"), &bob_token, None),
    ] {
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

// =============================================================================
// Request Gate
// =============================================================================

#[tokio::test]
async fn test_malformed_authorization_is_unauthorized() {
    let app = create_router_for_testing();
    let (user_id, token) = register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;
    let uri = format!("/api/v1/users/{user_id}");

    for value in [format!("Token {token}"), "Bearer ".to_string(), token.clone()] {
        let mut request = create_json_request("GET", &uri, None);
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, value.parse().unwrap());

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }
}

#[tokio::test]
async fn test_rejected_token_is_unauthorized() {
    let app = create_router_for_testing();
    let (user_id, _) = register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;

    let foreign = TokenCodec::with_secret("some-other-secret", "gatehouse", 3600)
        .issue(user_id.parse().unwrap())
        .unwrap()
        .token;

    let (status, body) = send(
        &app,
        authorized("GET", &format!("/api/v1/users/{user_id}"), &foreign, None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

/// Auth backend whose token verifier is unreachable
struct UnreachableVerifier;

#[async_trait]
impl AuthBackend for UnreachableVerifier {
    async fn register(&self, _request: RegisterRequest) -> Result<Uuid> {
        Err(GatehouseError::DependencyUnavailable("auth: connection refused".into()))
    }

    async fn login(&self, _request: LoginRequest) -> Result<LoginResponse> {
        Err(GatehouseError::DependencyUnavailable("auth: connection refused".into()))
    }

    async fn verify_token(&self, _token: &str) -> Result<Uuid> {
        Err(GatehouseError::DependencyUnavailable("auth: connection refused".into()))
    }

    async fn account(&self, _id: Uuid) -> Result<AccountSummary> {
        Err(GatehouseError::DependencyUnavailable("auth: connection refused".into()))
    }

    async fn is_ready(&self) -> bool {
        false
    }
}

#[tokio::test]
async fn test_unreachable_verifier_is_internal_error() {
    let profiles = Arc::new(ProfileService::new(Arc::new(MemoryProfileStore::new())));
    let state = Arc::new(AppState::new(
        AppConfig::for_role(ServiceRole::Gateway),
        Arc::new(UnreachableVerifier),
        profiles,
    ));
    let app = create_router(state);

    let (status, body) = send(
        &app,
        authorized("GET", &format!("/api/v1/users/{}", Uuid::new_v4()), "a.b.c", None),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "DEPENDENCY_UNAVAILABLE");
    assert!(!body["message"].as_str().unwrap().contains("connection refused"));

    let (status, body) = send(&app, create_json_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["checks"]["auth"], false);
    assert_eq!(body["checks"]["profiles"], true);
}

// =============================================================================
// Registration and Login
// =============================================================================

#[tokio::test]
async fn test_duplicate_registration() {
    let app = create_router_for_testing();
    register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;

    let (status, body) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/register",
            Some(json!({"email": "alice@example.com", "password": "other", "name": "Imposter"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_EMAIL");

    // The original password still works
    let (status, _) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "alice@example.com", "password": "Secr3t!"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_registration_validation() {
    let app = create_router_for_testing();

    for body in [
        json!({"email": "", "password": "Secr3t!", "name": "Alice"}),
        json!({"email": "alice@example.com", "password": "", "name": "Alice"}),
        json!({"email": "alice@example.com", "password": "Secr3t!", "name": "   "}),
        json!({"email": "alice@example.com"}),
    ] {
        let (status, response) = send(
            &app,
            create_json_request("POST", "/api/v1/auth/register", Some(body)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = create_router_for_testing();
    register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;

    let (status_a, body_a) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "alice@example.com", "password": "wrong"})),
        ),
    )
    .await;
    let (status_b, body_b) = send(
        &app,
        create_json_request(
            "POST",
            "/api/v1/auth/login",
            Some(json!({"email": "nobody@example.com", "password": "Secr3t!"})),
        ),
    )
    .await;

    assert_eq!(status_a, StatusCode::UNAUTHORIZED);
    assert_eq!(status_b, StatusCode::UNAUTHORIZED);
    assert_eq!(body_a, body_b);
}

// =============================================================================
// Profiles and Addresses
// =============================================================================

#[tokio::test]
async fn test_update_and_delete_profile() {
    let app = create_router_for_testing();
    let (user_id, token) = register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;
    let uri = format!("/api/v1/users/{user_id}");

    let (status, body) = send(
        &app,
        authorized("PUT", &uri, &token, Some(json!({"phone": "555-0100"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["phone"], "555-0100");
    assert_eq!(body["name"], "Alice");

    let (status, body) = send(&app, authorized("PUT", &uri, &token, Some(json!({})))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, authorized("DELETE", &uri, &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    // Deleted profiles are not recreated from the account
    let (status, _) = send(&app, authorized("GET", &uri, &token, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_addresses() {
    let app = create_router_for_testing();
    let (user_id, token) = register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;
    let uri = format!("/api/v1/users/{user_id}/addresses");

    let (status, body) = send(
        &app,
        authorized(
            "POST",
            &uri,
            &token,
            Some(json!({
                "street": "1 Main St",
                "city": "Springfield",
                "postal_code": "62701",
                "country": "US",
                "is_default": true
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert_eq!(body["is_default"], true);

    let (status, body) = send(
        &app,
        authorized("POST", &uri, &token, Some(json!({"street": "2 Elm St", "country": "US"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(&app, authorized("GET", &uri, &token, None)).await;
    assert_eq!(status, StatusCode::OK);
    let addresses = body.as_array().unwrap();
    assert_eq!(addresses.len(), 1);
    assert_eq!(addresses[0]["street"], "1 Main St");
}

struct DroppedMirror;

#[async_trait]
impl ProfileMirror for DroppedMirror {
    async fn create_profile(&self, _id: Uuid, _email: &str, _name: &str) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_missing_profile_is_recreated_on_read() {
    // The mirror acknowledges but never writes, leaving accounts without profiles
    let credentials = CredentialService::new(
        Arc::new(MemoryCredentialStore::new()),
        Arc::new(DroppedMirror),
        TokenCodec::with_secret("gateway-test-secret", "gatehouse", 3600),
        fast_hasher(),
    )
    .unwrap();
    let profiles = Arc::new(ProfileService::new(Arc::new(MemoryProfileStore::new())));
    let state = Arc::new(AppState::new(
        AppConfig::for_role(ServiceRole::Gateway),
        Arc::new(credentials),
        profiles.clone(),
    ));
    let app = create_router(state);

    let (user_id, token) = register_and_login(&app, "alice@example.com", "Secr3t!", "Alice").await;
    let id: Uuid = user_id.parse().unwrap();
    assert!(profiles.get_profile(id).await.is_err());

    let (status, body) = send(
        &app,
        authorized("GET", &format!("/api/v1/users/{user_id}"), &token, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["name"], "Alice");
    assert!(profiles.get_profile(id).await.is_ok());
}

// =============================================================================
// Health, Metrics and Docs
// =============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let app = create_router_for_testing();

    let (status, body) = send(&app, create_json_request("GET", "/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());

    let (status, body) = send(&app, create_json_request("GET", "/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ready"], true);
    assert!(body["checks"].is_object());
}

#[tokio::test]
async fn test_metrics_count_requests() {
    let app = create_router_for_testing();
    send(&app, create_json_request("GET", "/health", None)).await;
    send(&app, create_json_request("GET", "/health", None)).await;

    let (status, body) = send(&app, create_json_request("GET", "/metrics", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["uptime_seconds"].is_number());
    assert!(body["total_requests"].as_u64().unwrap() >= 3);
    assert_eq!(body["endpoints"]["/health"]["requests"], 2);
}

#[tokio::test]
async fn test_metrics_keys_stay_bounded() {
    let state = gatehouse_gateway::test_state();
    let app = create_router(state.clone());

    for i in 0..500 {
        let (status, _) = send(&app, create_json_request("GET", &format!("/junk-{i}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    for _ in 0..3 {
        let uri = format!("/api/v1/users/{}", Uuid::new_v4());
        send(&app, create_json_request("GET", &uri, None)).await;
    }

    let endpoints = state.endpoint_metrics().await;
    assert_eq!(endpoints.len(), 2);
    assert_eq!(endpoints[UNMATCHED_ENDPOINT].requests, 500);
    assert_eq!(endpoints["/api/v1/users/:id"].requests, 3);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = create_router_for_testing();
    let (status, body) = send(
        &app,
        create_json_request("GET", "/api-docs/openapi.json", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/auth/login"].is_object());
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = create_router_for_testing();
    let response = app
        .oneshot(create_json_request("GET", "/health", None))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
        "nosniff"
    );
}

// =============================================================================
// Properties
// =============================================================================

mod properties {
    use gatehouse_core::GatehouseError;
    use gatehouse_gateway::{authorize_self_access, bearer_token, AuthenticatedUser, GateError};
    use axum::http::{header, HeaderMap, HeaderValue};
    use proptest::prelude::*;
    use uuid::Uuid;

    fn uuid_strategy() -> impl Strategy<Value = Uuid> {
        any::<u128>().prop_map(Uuid::from_u128)
    }

    proptest! {
        #[test]
        fn self_access_passes_only_for_owner(a in uuid_strategy(), b in uuid_strategy()) {
            let user = AuthenticatedUser { user_id: a };
            prop_assert_eq!(authorize_self_access(&user, &a.to_string()).unwrap(), a);

            prop_assume!(a != b);
            prop_assert!(matches!(
                authorize_self_access(&user, &b.to_string()),
                Err(GatehouseError::Forbidden)
            ));
        }

        #[test]
        fn bearer_token_roundtrips(token in "[A-Za-z0-9_-]{1,40}(\\.[A-Za-z0-9_-]{1,40}){2}") {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
            );
            prop_assert_eq!(bearer_token(&headers).unwrap(), token.as_str());
        }

        #[test]
        fn other_schemes_are_malformed(scheme in "[A-Za-z]{1,10}", token in "[A-Za-z0-9]{1,20}") {
            prop_assume!(scheme != "Bearer");
            let mut headers = HeaderMap::new();
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("{scheme} {token}")).unwrap(),
            );
            prop_assert!(matches!(bearer_token(&headers), Err(GateError::MalformedAuth)));
        }
    }
}
