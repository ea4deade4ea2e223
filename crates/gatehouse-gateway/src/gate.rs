//! Bearer token gate for the protected route group
//!
//! Every protected request passes through [`require_identity`]: the bearer
//! token is taken from the `Authorization` header, checked by the auth
//! backend, and the resulting [`AuthenticatedUser`] is attached to the
//! request extensions. Handlers receive it as a typed extractor.
//!
//! A rejected token is a 401; a verifier that cannot answer is a 500.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use gatehouse_core::audit::{audit_log, extract_ip_address, extract_user_agent, AuditEvent};
use gatehouse_core::{ApiError, GatehouseError};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity verified by the gate for the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Request gate failures
#[derive(Debug, Error)]
pub enum GateError {
    #[error("Missing Authorization header")]
    MissingAuth,

    #[error("Invalid Authorization header format")]
    MalformedAuth,

    #[error("Token rejected")]
    Rejected,

    #[error("Token verifier unavailable: {0}")]
    VerifierUnavailable(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::VerifierUnavailable(cause) => {
                GatehouseError::DependencyUnavailable(cause).into_response()
            }
            // All authentication failures share one body
            _ => {
                let mut response = (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(ApiError::unauthorized()),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
                response
            }
        }
    }
}

/// Pull the bearer token out of the `Authorization` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, GateError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(GateError::MissingAuth)?
        .to_str()
        .map_err(|_| GateError::MalformedAuth)?;

    if value.is_empty() {
        return Err(GateError::MissingAuth);
    }

    let token = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(GateError::MalformedAuth)?
        .trim();

    if token.is_empty() {
        return Err(GateError::MalformedAuth);
    }

    Ok(token)
}

/// Authentication middleware for the protected route group
///
/// ```ignore
/// let protected = Router::new()
///     .route("/users/:id", get(users::get_user))
///     .layer(middleware::from_fn_with_state(state.clone(), require_identity));
/// ```
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, GateError> {
    let ip_address = extract_ip_address(request.headers());
    let user_agent = extract_user_agent(request.headers());

    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(e) => {
            audit_log(&AuditEvent::InvalidToken {
                reason: e.to_string(),
                ip_address,
                user_agent,
            });
            return Err(e);
        }
    };

    let user_id = match state.auth.verify_token(&token).await {
        Ok(user_id) => user_id,
        Err(GatehouseError::InvalidToken) => {
            audit_log(&AuditEvent::InvalidToken {
                reason: GateError::Rejected.to_string(),
                ip_address,
                user_agent,
            });
            return Err(GateError::Rejected);
        }
        Err(e) => return Err(GateError::VerifierUnavailable(e.to_string())),
    };

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = GateError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(GateError::MissingAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header() {
        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(GateError::MissingAuth)
        ));
    }

    #[test]
    fn test_wrong_scheme() {
        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Token abc", "abc.def.ghi"] {
            assert!(
                matches!(bearer_token(&headers_with(value)), Err(GateError::MalformedAuth)),
                "{value} should be malformed"
            );
        }
    }

    #[test]
    fn test_empty_token_after_trim() {
        assert!(matches!(
            bearer_token(&headers_with("Bearer    ")),
            Err(GateError::MalformedAuth)
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GateError::MissingAuth.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GateError::Rejected.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        let response = GateError::MalformedAuth.into_response();
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
        assert_eq!(
            GateError::VerifierUnavailable("auth: connection refused".into())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
