//! Gatehouse Profile - profile service
//!
//! Owns the business-facing user record and its postal addresses. Profiles
//! share their id with the account that owns them.

pub mod http;
pub mod service;
pub mod store;

pub use http::create_router;
pub use service::ProfileService;
pub use store::{MemoryProfileStore, PgProfileStore, ProfileStore};

use gatehouse_core::{DatabaseConfig, Result};

/// Wire a profile service over the configured store
pub async fn build_service(config: &DatabaseConfig) -> Result<ProfileService> {
    let store = store::open(config).await?;
    Ok(ProfileService::new(store))
}
