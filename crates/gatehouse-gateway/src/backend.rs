//! Backend seams used by the gateway handlers
//!
//! The gateway reaches the credential and profile services through these
//! traits. `clients::remote` implements them over HTTP and
//! `clients::embedded` implements them on the in-process services.

use async_trait::async_trait;
use gatehouse_core::wire::{LoginRequest, LoginResponse, RegisterRequest};
use gatehouse_core::{AccountSummary, Address, NewAddress, Profile, ProfileChanges, Result};
use uuid::Uuid;

#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn register(&self, request: RegisterRequest) -> Result<Uuid>;

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse>;

    /// `InvalidToken` when the token is rejected; any other error means the
    /// verifier could not give an answer.
    async fn verify_token(&self, token: &str) -> Result<Uuid>;

    async fn account(&self, id: Uuid) -> Result<AccountSummary>;

    async fn is_ready(&self) -> bool;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    /// Idempotent profile creation
    async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<()>;

    async fn get_profile(&self, id: Uuid) -> Result<Profile>;

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile>;

    async fn delete_profile(&self, id: Uuid) -> Result<()>;

    async fn add_address(&self, id: Uuid, address: NewAddress) -> Result<Address>;

    async fn list_addresses(&self, id: Uuid) -> Result<Vec<Address>>;

    async fn is_ready(&self) -> bool;
}
