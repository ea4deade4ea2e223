//! Identity mirror contract
//!
//! After an account is committed, the credential service materializes a
//! matching profile through this trait. Implementations must be idempotent:
//! creating a profile for an id that already has one is a successful no-op.

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;

#[async_trait]
pub trait ProfileMirror: Send + Sync {
    /// Create the profile for a freshly registered account
    async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<()>;
}
