//! Profile store abstraction
//!
//! Profiles are keyed by the account id issued by the credential service.
//! Lookups never return soft-deleted profiles, but a deleted profile still
//! occupies its id.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{
    Address, DatabaseConfig, Profile, ProfileChanges, StoreBackend, StoreError,
};
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::MemoryProfileStore;
pub use postgres::PgProfileStore;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Insert unless a profile (live or deleted) already uses this id.
    /// Returns whether a row was written.
    async fn insert_if_absent(&self, profile: &Profile) -> Result<bool, StoreError>;

    /// Live profile by id
    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError>;

    /// Apply present fields to a live profile; `None` if there is none
    async fn update(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Profile>, StoreError>;

    /// Mark a live profile deleted; `false` if there is none
    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError>;

    async fn add_address(&self, address: &Address) -> Result<(), StoreError>;

    /// Addresses of `user_id` in creation order
    async fn addresses(&self, user_id: Uuid) -> Result<Vec<Address>, StoreError>;

    async fn is_ready(&self) -> bool {
        true
    }
}

/// Open the store selected by `config.backend`, creating tables if needed
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn ProfileStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory profile store; profiles are lost on restart");
            Ok(Arc::new(MemoryProfileStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = gatehouse_core::database::connect_pool(config).await?;
            let store = PgProfileStore::from_pool(pool);
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
