//! JSON request and response bodies
//!
//! Shared by the public gateway API, the internal service APIs and the
//! HTTP clients that call them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{Address, NewAddress, Profile, ProfileChanges};

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    #[serde(default)]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub password: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub name: String,
}

/// Registration response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub message: String,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub password: String,
}

/// Login response carrying the session token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: Uuid,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// Token verification outcome. A rejected token is a normal response with
/// `valid = false`, not an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerifyTokenResponse {
    pub fn accepted(user_id: Uuid) -> Self {
        Self {
            valid: true,
            user_id: Some(user_id),
            error: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            user_id: None,
            error: Some(reason.into()),
        }
    }
}

/// Mirror call body sent from the credential service to the profile service
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProfileRequest {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProfileResponse {
    pub id: Uuid,
    /// `false` when a profile with this id already existed
    pub created: bool,
}

/// Profile update; at least one field must be present
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileChanges {
            name: request.name,
            phone: request.phone,
        }
    }
}

impl From<ProfileChanges> for UpdateProfileRequest {
    fn from(changes: ProfileChanges) -> Self {
        UpdateProfileRequest {
            name: changes.name,
            phone: changes.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddAddressRequest {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub street: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub is_default: bool,
}

impl From<AddAddressRequest> for NewAddress {
    fn from(request: AddAddressRequest) -> Self {
        NewAddress {
            street: request.street,
            city: request.city,
            state: request.state,
            postal_code: request.postal_code,
            country: request.country,
            is_default: request.is_default,
        }
    }
}

impl From<NewAddress> for AddAddressRequest {
    fn from(address: NewAddress) -> Self {
        AddAddressRequest {
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            is_default: address.is_default,
        }
    }
}

/// Public view of a profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
}

impl From<Profile> for UserResponse {
    fn from(profile: Profile) -> Self {
        UserResponse {
            id: profile.id,
            email: profile.email,
            name: profile.name,
            phone: profile.phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddressResponse {
    pub id: Uuid,
    pub street: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        AddressResponse {
            id: address.id,
            street: address.street,
            city: address.city,
            state: address.state,
            postal_code: address.postal_code,
            country: address.country,
            is_default: address.is_default,
        }
    }
}

/// Plain acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
