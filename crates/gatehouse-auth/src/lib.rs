//! Gatehouse Auth - credential service
//!
//! Owns accounts and their hashed passwords, mints and verifies session
//! tokens, and triggers profile creation for new accounts.

pub mod http;
pub mod mirror;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use http::create_router;
pub use mirror::HttpProfileMirror;
pub use password::{HashError, PasswordConfig, SecretHasher};
pub use service::CredentialService;
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
pub use token::{Claims, IssuedToken, TokenCodec, TokenError};

use gatehouse_core::{AppConfig, GatehouseError, ProfileMirror, Result};
use std::sync::Arc;

/// Build the hasher with the configured Argon2 cost
pub fn hasher_from_config(config: &AppConfig) -> Result<SecretHasher> {
    SecretHasher::new(&PasswordConfig::from(&config.auth))
        .map_err(|e| GatehouseError::Internal(e.to_string()))
}

/// Wire a credential service with the configured store and the given mirror
pub async fn build_service_with_mirror(
    config: &AppConfig,
    mirror: Arc<dyn ProfileMirror>,
) -> Result<CredentialService> {
    let store = store::open(&config.database).await?;
    CredentialService::new(
        store,
        mirror,
        TokenCodec::new(&config.auth),
        hasher_from_config(config)?,
    )
}

/// Wire the standalone credential service, mirroring into the profile
/// service over HTTP
pub async fn build_service(config: &AppConfig) -> Result<CredentialService> {
    let client = gatehouse_core::upstream::build_client(&config.services)?;
    let mirror = Arc::new(HttpProfileMirror::new(
        client,
        config.services.profile_url.clone(),
    ));
    build_service_with_mirror(config, mirror).await
}
