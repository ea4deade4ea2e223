//! Profile service
//!
//! Profile and address operations over a [`ProfileStore`]. Also the
//! in-process [`ProfileMirror`] used when the credential service runs in the
//! same binary.

use async_trait::async_trait;
use chrono::Utc;
use gatehouse_core::{
    Address, GatehouseError, NewAddress, Profile, ProfileChanges, ProfileMirror, Result,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::store::ProfileStore;

pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Create the profile for an account. Idempotent: returns `false` when a
    /// profile with this id already exists, including a deleted one.
    pub async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<bool> {
        if blank(email) || blank(name) {
            return Err(GatehouseError::validation("email and name are required"));
        }

        let created = self
            .store
            .insert_if_absent(&Profile::new(id, email, name))
            .await?;

        if created {
            tracing::info!(user_id = %id, "Profile created");
        } else {
            tracing::debug!(user_id = %id, "Profile already exists");
        }
        Ok(created)
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        self.store
            .find(id)
            .await?
            .ok_or_else(|| GatehouseError::not_found("Profile"))
    }

    pub async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile> {
        if changes.is_empty() {
            return Err(GatehouseError::validation(
                "at least one of name or phone is required",
            ));
        }
        if changes.name.as_deref().is_some_and(blank) {
            return Err(GatehouseError::validation("name must not be blank"));
        }

        self.store
            .update(id, &changes, Utc::now())
            .await?
            .ok_or_else(|| GatehouseError::not_found("Profile"))
    }

    /// Soft delete; the id stays reserved
    pub async fn delete_profile(&self, id: Uuid) -> Result<()> {
        if self.store.soft_delete(id, Utc::now()).await? {
            tracing::info!(user_id = %id, "Profile deleted");
            Ok(())
        } else {
            Err(GatehouseError::not_found("Profile"))
        }
    }

    pub async fn add_address(&self, id: Uuid, address: NewAddress) -> Result<Address> {
        let missing: Vec<&str> = [
            ("street", &address.street),
            ("city", &address.city),
            ("postal_code", &address.postal_code),
            ("country", &address.country),
        ]
        .into_iter()
        .filter(|(_, value)| blank(value))
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(GatehouseError::validation(format!(
                "Invalid or missing fields: {}",
                missing.join(", ")
            )));
        }

        self.get_profile(id).await?;

        let address = address.into_address(id);
        self.store.add_address(&address).await?;
        Ok(address)
    }

    pub async fn list_addresses(&self, id: Uuid) -> Result<Vec<Address>> {
        self.get_profile(id).await?;
        Ok(self.store.addresses(id).await?)
    }

    pub async fn is_ready(&self) -> bool {
        self.store.is_ready().await
    }
}

#[async_trait]
impl ProfileMirror for ProfileService {
    async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<()> {
        ProfileService::create_profile(self, id, email, name)
            .await
            .map(|_| ())
    }
}
