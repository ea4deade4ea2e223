//! Credential service
//!
//! Registration, login and token verification on top of a
//! [`CredentialStore`], a [`SecretHasher`] and a [`TokenCodec`].
//!
//! Registration commits the account first and only then asks the
//! [`ProfileMirror`] for the matching profile. The two writes are not
//! transactional: if the mirror call fails the account stays in place and
//! the caller gets `DependencyUnavailable`.

use chrono::Utc;
use gatehouse_core::audit::{audit_log, AuditEvent};
use gatehouse_core::wire::{LoginRequest, LoginResponse, RegisterRequest};
use gatehouse_core::{AccountSummary, GatehouseError, ProfileMirror, Result, StoreError};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::password::{HashError, SecretHasher};
use crate::store::CredentialStore;
use crate::token::TokenCodec;

/// Verified against when the login email is unknown, so both failure paths
/// cost one Argon2 verification.
const TIMING_DUMMY_PASSWORD: &str = "gatehouse-timing-dummy";

pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    mirror: Arc<dyn ProfileMirror>,
    codec: TokenCodec,
    hasher: SecretHasher,
    dummy_hash: String,
}

impl CredentialService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mirror: Arc<dyn ProfileMirror>,
        codec: TokenCodec,
        hasher: SecretHasher,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(TIMING_DUMMY_PASSWORD).map_err(hash_failure)?;

        Ok(Self {
            store,
            mirror,
            codec,
            hasher,
            dummy_hash,
        })
    }

    /// Create an account and its profile; returns the new account id
    pub async fn register(&self, request: RegisterRequest) -> Result<Uuid> {
        if let Err(errors) = request.validate() {
            let err = GatehouseError::from(errors);
            audit_log(&AuditEvent::RegistrationFailure {
                email: request.email.clone(),
                reason: err.to_string(),
            });
            return Err(err);
        }

        // Cheap early exit; the store still decides races atomically below.
        if self.store.find_by_email(&request.email).await?.is_some() {
            return Err(self.duplicate(&request.email));
        }

        let password_hash = self
            .hasher
            .hash_blocking(request.password)
            .await
            .map_err(hash_failure)?;

        let account = match self
            .store
            .insert(&request.email, &password_hash, &request.name)
            .await
        {
            Ok(account) => account,
            Err(StoreError::Conflict(_)) => return Err(self.duplicate(&request.email)),
            Err(e) => return Err(e.into()),
        };

        audit_log(&AuditEvent::RegistrationSuccess {
            user_id: account.id,
            email: account.email.clone(),
        });

        if let Err(e) = self
            .mirror
            .create_profile(account.id, &account.email, &account.name)
            .await
        {
            tracing::error!(
                user_id = %account.id,
                error = %e,
                "Account created but profile creation failed"
            );
            audit_log(&AuditEvent::ProfileMirrorFailed {
                user_id: account.id,
                reason: e.to_string(),
            });
            return Err(GatehouseError::DependencyUnavailable(format!(
                "profile creation failed for account {}: {e}",
                account.id
            )));
        }

        tracing::info!(user_id = %account.id, "Account registered");
        Ok(account.id)
    }

    /// Exchange credentials for a session token.
    ///
    /// Unknown email and wrong password both return `InvalidCredentials`
    /// after the same amount of hashing work.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        request.validate()?;

        let account = self.store.find_by_email(&request.email).await?;

        let verified = match &account {
            Some(account) => {
                self.hasher
                    .verify_blocking(request.password, account.password_hash.clone())
                    .await
            }
            None => {
                self.hasher
                    .verify_blocking(request.password, self.dummy_hash.clone())
                    .await;
                false
            }
        };

        let account = match account {
            Some(account) if verified => account,
            _ => {
                audit_log(&AuditEvent::LoginFailure {
                    email: request.email,
                });
                return Err(GatehouseError::InvalidCredentials);
            }
        };

        let issued = self
            .codec
            .issue(account.id)
            .map_err(|e| GatehouseError::Internal(format!("Failed to issue token: {e}")))?;

        if let Err(e) = self.store.record_login(account.id, Utc::now()).await {
            tracing::warn!(user_id = %account.id, error = %e, "Failed to record last login");
        }

        audit_log(&AuditEvent::LoginSuccess {
            user_id: account.id,
            email: account.email.clone(),
        });

        Ok(LoginResponse {
            token: issued.token,
            user_id: account.id,
            name: account.name,
            expires_at: issued.expires_at,
        })
    }

    /// Resolve a session token to its account id
    pub fn verify_token(&self, token: &str) -> Result<Uuid> {
        self.codec.verify_subject(token).map_err(|e| {
            tracing::debug!(reason = %e, "Token rejected");
            GatehouseError::InvalidToken
        })
    }

    pub async fn account(&self, id: Uuid) -> Result<AccountSummary> {
        self.store
            .find_by_id(id)
            .await?
            .map(|account| account.to_summary())
            .ok_or_else(|| GatehouseError::not_found("Account"))
    }

    pub async fn is_ready(&self) -> bool {
        self.store.is_ready().await
    }

    fn duplicate(&self, email: &str) -> GatehouseError {
        let err = GatehouseError::DuplicateEmail;
        audit_log(&AuditEvent::RegistrationFailure {
            email: email.to_string(),
            reason: err.to_string(),
        });
        err
    }
}

fn hash_failure(err: HashError) -> GatehouseError {
    GatehouseError::Internal(err.to_string())
}
