//! Error taxonomy and HTTP error mapping
//!
//! Every service returns failures as a JSON [`ApiError`]. Dependency and
//! internal failures are logged with their cause but reach clients only as
//! a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Error code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn unauthorized() -> Self {
        Self::new("UNAUTHORIZED", "Authentication required")
    }

    pub fn internal_error() -> Self {
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

/// Domain error kinds shared by every Gatehouse service
#[derive(Debug, Error)]
pub enum GatehouseError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Access denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, GatehouseError>;

impl GatehouseError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::DuplicateEmail => StatusCode::CONFLICT,
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DependencyUnavailable(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DuplicateEmail => "DUPLICATE_EMAIL",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::DependencyUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing error body. Causes of server-side failures stay out of it.
    pub fn to_api_error(&self) -> ApiError {
        match self {
            Self::Validation(msg) => ApiError::new(self.code(), msg.clone()),
            Self::DuplicateEmail | Self::InvalidCredentials | Self::Forbidden => {
                ApiError::new(self.code(), self.to_string())
            }
            Self::InvalidToken => ApiError::unauthorized(),
            Self::NotFound(_) => ApiError::new(self.code(), self.to_string()),
            Self::DependencyUnavailable(_) => {
                ApiError::new(self.code(), "A required service is unavailable")
            }
            Self::Internal(_) => ApiError::internal_error(),
        }
    }

    /// Rebuild a domain error from an upstream service's error response
    pub fn from_api_error(status: StatusCode, error: ApiError) -> Self {
        match error.code.as_str() {
            "VALIDATION_ERROR" => Self::Validation(error.message),
            "DUPLICATE_EMAIL" => Self::DuplicateEmail,
            "INVALID_CREDENTIALS" => Self::InvalidCredentials,
            "UNAUTHORIZED" => Self::InvalidToken,
            "FORBIDDEN" => Self::Forbidden,
            "NOT_FOUND" => Self::NotFound(
                error
                    .message
                    .strip_suffix(" not found")
                    .unwrap_or(&error.message)
                    .to_string(),
            ),
            other => Self::DependencyUnavailable(format!("upstream returned {status} ({other})")),
        }
    }
}

impl IntoResponse for GatehouseError {
    fn into_response(self) -> Response {
        match &self {
            Self::DependencyUnavailable(cause) => {
                tracing::error!(cause = %cause, "Dependency unavailable");
            }
            Self::Internal(cause) => {
                tracing::error!(cause = %cause, "Internal error");
            }
            _ => {}
        }

        (self.status_code(), Json(self.to_api_error())).into_response()
    }
}

impl From<validator::ValidationErrors> for GatehouseError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect();
        fields.sort();
        Self::Validation(format!("Invalid or missing fields: {}", fields.join(", ")))
    }
}

/// Persistence failures surfaced by the store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}

impl From<StoreError> for GatehouseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(constraint) => {
                GatehouseError::Internal(format!("unexpected conflict on {constraint}"))
            }
            StoreError::Unavailable(cause) => GatehouseError::DependencyUnavailable(cause),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            GatehouseError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatehouseError::DuplicateEmail.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GatehouseError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatehouseError::InvalidToken.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(GatehouseError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            GatehouseError::not_found("Profile").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatehouseError::DependencyUnavailable("db".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_cause() {
        let err = GatehouseError::DependencyUnavailable(
            "postgres://user:pw@db:5432 connection refused".to_string(),
        );
        let body = err.to_api_error();
        assert_eq!(body.code, "DEPENDENCY_UNAVAILABLE");
        assert!(!body.message.contains("postgres"));
        assert!(body.details.is_none());

        let body = GatehouseError::Internal("panic in worker".into()).to_api_error();
        assert_eq!(body.code, "INTERNAL_ERROR");
        assert!(body.details.is_none());
    }

    #[test]
    fn test_api_error_roundtrip() {
        for err in [
            GatehouseError::DuplicateEmail,
            GatehouseError::InvalidCredentials,
            GatehouseError::InvalidToken,
            GatehouseError::Forbidden,
        ] {
            let status = err.status_code();
            let rebuilt = GatehouseError::from_api_error(status, err.to_api_error());
            assert_eq!(rebuilt.code(), err.code());
        }

        let rebuilt = GatehouseError::from_api_error(
            StatusCode::NOT_FOUND,
            GatehouseError::not_found("Profile").to_api_error(),
        );
        assert!(matches!(rebuilt, GatehouseError::NotFound(ref what) if what == "Profile"));
    }

    #[test]
    fn test_unknown_upstream_code_is_dependency_failure() {
        let err = GatehouseError::from_api_error(
            StatusCode::BAD_GATEWAY,
            ApiError::new("SOMETHING_ELSE", "boom"),
        );
        assert!(matches!(err, GatehouseError::DependencyUnavailable(_)));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: GatehouseError = StoreError::Unavailable("timeout".into()).into();
        assert!(matches!(err, GatehouseError::DependencyUnavailable(_)));
    }
}
