//! Credential store abstraction
//!
//! The credential service only sees [`CredentialStore`]; PostgreSQL and an
//! in-memory map are interchangeable behind it. Implementations enforce the
//! one-account-per-email rule atomically and report a clash as
//! [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{Account, DatabaseConfig, StoreBackend, StoreError};
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new account with a fresh id. `Conflict` if the email is taken.
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Stamp the account's last successful login
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;

    /// Whether the backing store is reachable
    async fn is_ready(&self) -> bool {
        true
    }
}

/// Open the store selected by `config.backend`, creating tables if needed
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn CredentialStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory credential store; accounts are lost on restart");
            Ok(Arc::new(MemoryCredentialStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = gatehouse_core::database::connect_pool(config).await?;
            let store = PgCredentialStore::from_pool(pool);
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
