//! In-memory credential store for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{Account, StoreError};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::CredentialStore;

#[derive(Default)]
struct Accounts {
    by_id: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
}

/// Accounts held in a map behind one lock; the email check and the insert
/// happen under the same write guard.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Accounts>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Account, StoreError> {
        let mut accounts = self.inner.write().await;
        if accounts.by_email.contains_key(email) {
            return Err(StoreError::Conflict("accounts_email_key".to_string()));
        }

        let account = Account::new(email, password_hash.to_string(), name);
        accounts.by_email.insert(account.email.clone(), account.id);
        accounts.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.inner.read().await;
        Ok(accounts
            .by_email
            .get(email)
            .and_then(|id| accounts.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.read().await.by_id.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(account) = self.inner.write().await.by_id.get_mut(&id) {
            account.last_login_at = Some(at);
        }
        Ok(())
    }
}
