//! In-memory profile store for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{Address, Profile, ProfileChanges, StoreError};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::ProfileStore;

#[derive(Default)]
struct Profiles {
    profiles: HashMap<Uuid, Profile>,
    addresses: HashMap<Uuid, Vec<Address>>,
}

#[derive(Default)]
pub struct MemoryProfileStore {
    inner: RwLock<Profiles>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn insert_if_absent(&self, profile: &Profile) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.profiles.contains_key(&profile.id) {
            return Ok(false);
        }
        inner.profiles.insert(profile.id, profile.clone());
        Ok(true)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .profiles
            .get(&id)
            .filter(|profile| !profile.is_deleted())
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ProfileChanges,
        at: DateTime<Utc>,
    ) -> Result<Option<Profile>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(profile) = inner
            .profiles
            .get_mut(&id)
            .filter(|profile| !profile.is_deleted())
        else {
            return Ok(None);
        };

        if let Some(name) = &changes.name {
            profile.name = name.clone();
        }
        if let Some(phone) = &changes.phone {
            profile.phone = Some(phone.clone());
        }
        profile.updated_at = at;
        Ok(Some(profile.clone()))
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.profiles.get_mut(&id) {
            Some(profile) if !profile.is_deleted() => {
                profile.deleted_at = Some(at);
                profile.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_address(&self, address: &Address) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .addresses
            .entry(address.user_id)
            .or_default()
            .push(address.clone());
        Ok(())
    }

    async fn addresses(&self, user_id: Uuid) -> Result<Vec<Address>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .addresses
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_if_absent() {
        let store = MemoryProfileStore::new();
        let profile = Profile::new(Uuid::new_v4(), "alice@example.com", "Alice");

        assert!(store.insert_if_absent(&profile).await.unwrap());
        let again = Profile::new(profile.id, "other@example.com", "Other");
        assert!(!store.insert_if_absent(&again).await.unwrap());

        let stored = store.find(profile.id).await.unwrap().unwrap();
        assert_eq!(stored.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_soft_delete_hides_and_blocks_reinsert() {
        let store = MemoryProfileStore::new();
        let profile = Profile::new(Uuid::new_v4(), "alice@example.com", "Alice");
        store.insert_if_absent(&profile).await.unwrap();

        assert!(store.soft_delete(profile.id, Utc::now()).await.unwrap());
        assert!(store.find(profile.id).await.unwrap().is_none());
        assert!(!store.soft_delete(profile.id, Utc::now()).await.unwrap());
        assert!(!store.insert_if_absent(&profile).await.unwrap());
        assert!(store
            .update(profile.id, &ProfileChanges::default(), Utc::now())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let store = MemoryProfileStore::new();
        let profile = Profile::new(Uuid::new_v4(), "alice@example.com", "Alice");
        store.insert_if_absent(&profile).await.unwrap();

        let changes = ProfileChanges {
            phone: Some("555-0100".into()),
            ..Default::default()
        };
        let updated = store
            .update(profile.id, &changes, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.phone.as_deref(), Some("555-0100"));
    }
}
