//! In-process backends
//!
//! The credential and profile services run inside the gateway binary. The
//! profile service doubles as the credential service's identity mirror.

use async_trait::async_trait;
use gatehouse_auth::{CredentialService, MemoryCredentialStore, SecretHasher, TokenCodec};
use gatehouse_core::wire::{LoginRequest, LoginResponse, RegisterRequest};
use gatehouse_core::{
    AccountSummary, Address, AppConfig, NewAddress, Profile, ProfileChanges, Result,
};
use gatehouse_profile::{MemoryProfileStore, ProfileService};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::{AuthBackend, ProfileBackend};

#[async_trait]
impl AuthBackend for CredentialService {
    async fn register(&self, request: RegisterRequest) -> Result<Uuid> {
        CredentialService::register(self, request).await
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        CredentialService::login(self, request).await
    }

    async fn verify_token(&self, token: &str) -> Result<Uuid> {
        CredentialService::verify_token(self, token)
    }

    async fn account(&self, id: Uuid) -> Result<AccountSummary> {
        CredentialService::account(self, id).await
    }

    async fn is_ready(&self) -> bool {
        CredentialService::is_ready(self).await
    }
}

#[async_trait]
impl ProfileBackend for ProfileService {
    async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<()> {
        ProfileService::create_profile(self, id, email, name)
            .await
            .map(|_| ())
    }

    async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        ProfileService::get_profile(self, id).await
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile> {
        ProfileService::update_profile(self, id, changes).await
    }

    async fn delete_profile(&self, id: Uuid) -> Result<()> {
        ProfileService::delete_profile(self, id).await
    }

    async fn add_address(&self, id: Uuid, address: NewAddress) -> Result<Address> {
        ProfileService::add_address(self, id, address).await
    }

    async fn list_addresses(&self, id: Uuid) -> Result<Vec<Address>> {
        ProfileService::list_addresses(self, id).await
    }

    async fn is_ready(&self) -> bool {
        ProfileService::is_ready(self).await
    }
}

/// Both in-process services
pub struct EmbeddedBackends {
    pub credentials: Arc<CredentialService>,
    pub profiles: Arc<ProfileService>,
}

impl EmbeddedBackends {
    /// Services over the configured stores
    pub async fn build(config: &AppConfig) -> Result<Self> {
        let profiles = Arc::new(gatehouse_profile::build_service(&config.database).await?);
        let credentials =
            gatehouse_auth::build_service_with_mirror(config, profiles.clone()).await?;

        Ok(Self {
            credentials: Arc::new(credentials),
            profiles,
        })
    }

    /// Services over in-memory stores with the given codec and hasher
    pub fn in_memory(codec: TokenCodec, hasher: SecretHasher) -> Result<Self> {
        let profiles = Arc::new(ProfileService::new(Arc::new(MemoryProfileStore::new())));
        let credentials = CredentialService::new(
            Arc::new(MemoryCredentialStore::new()),
            profiles.clone(),
            codec,
            hasher,
        )?;

        Ok(Self {
            credentials: Arc::new(credentials),
            profiles,
        })
    }
}
