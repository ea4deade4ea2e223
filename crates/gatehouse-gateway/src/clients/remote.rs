//! HTTP clients for the auth and profile services
//!
//! Every call shares one `reqwest::Client` with request and connect
//! timeouts. Transport failures and unexpected responses become
//! `DependencyUnavailable`; error bodies from the services are decoded back
//! into their original error kind.

use async_trait::async_trait;
use gatehouse_core::upstream::{endpoint, expect_success, read_json, transport_error};
use gatehouse_core::wire::{
    AddAddressRequest, CreateProfileRequest, LoginRequest, LoginResponse, RegisterRequest,
    RegisterResponse, UpdateProfileRequest, VerifyTokenRequest, VerifyTokenResponse,
};
use gatehouse_core::{
    AccountSummary, Address, GatehouseError, NewAddress, Profile, ProfileChanges, Result,
};
use reqwest::Client;
use uuid::Uuid;

use crate::backend::{AuthBackend, ProfileBackend};

const AUTH_SERVICE: &str = "auth service";
const PROFILE_SERVICE: &str = "profile service";

async fn is_ready(client: &Client, base_url: &str) -> bool {
    match client.get(endpoint(base_url, "/ready")).send().await {
        Ok(response) => response.status().is_success(),
        Err(e) => {
            tracing::warn!(url = %base_url, error = %e, "Readiness probe failed");
            false
        }
    }
}

pub struct RemoteAuth {
    client: Client,
    base_url: String,
}

impl RemoteAuth {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl AuthBackend for RemoteAuth {
    async fn register(&self, request: RegisterRequest) -> Result<Uuid> {
        let response = self
            .client
            .post(self.url("/internal/accounts"))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(AUTH_SERVICE, e))?;

        let body: RegisterResponse = read_json(AUTH_SERVICE, response).await?;
        Ok(body.user_id)
    }

    async fn login(&self, request: LoginRequest) -> Result<LoginResponse> {
        let response = self
            .client
            .post(self.url("/internal/sessions"))
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(AUTH_SERVICE, e))?;

        read_json(AUTH_SERVICE, response).await
    }

    async fn verify_token(&self, token: &str) -> Result<Uuid> {
        let response = self
            .client
            .post(self.url("/internal/tokens/verify"))
            .json(&VerifyTokenRequest {
                token: token.to_string(),
            })
            .send()
            .await
            .map_err(|e| transport_error(AUTH_SERVICE, e))?;

        let verdict: VerifyTokenResponse = read_json(AUTH_SERVICE, response).await?;
        match verdict {
            VerifyTokenResponse {
                valid: true,
                user_id: Some(user_id),
                ..
            } => Ok(user_id),
            _ => Err(GatehouseError::InvalidToken),
        }
    }

    async fn account(&self, id: Uuid) -> Result<AccountSummary> {
        let response = self
            .client
            .get(self.url(&format!("/internal/accounts/{id}")))
            .send()
            .await
            .map_err(|e| transport_error(AUTH_SERVICE, e))?;

        read_json(AUTH_SERVICE, response).await
    }

    async fn is_ready(&self) -> bool {
        is_ready(&self.client, &self.base_url).await
    }
}

pub struct RemoteProfiles {
    client: Client,
    base_url: String,
}

impl RemoteProfiles {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl ProfileBackend for RemoteProfiles {
    async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url("/internal/profiles"))
            .json(&CreateProfileRequest {
                id,
                email: email.to_string(),
                name: name.to_string(),
            })
            .send()
            .await
            .map_err(|e| transport_error(PROFILE_SERVICE, e))?;

        expect_success(PROFILE_SERVICE, response).await
    }

    async fn get_profile(&self, id: Uuid) -> Result<Profile> {
        let response = self
            .client
            .get(self.url(&format!("/internal/profiles/{id}")))
            .send()
            .await
            .map_err(|e| transport_error(PROFILE_SERVICE, e))?;

        read_json(PROFILE_SERVICE, response).await
    }

    async fn update_profile(&self, id: Uuid, changes: ProfileChanges) -> Result<Profile> {
        let response = self
            .client
            .put(self.url(&format!("/internal/profiles/{id}")))
            .json(&UpdateProfileRequest::from(changes))
            .send()
            .await
            .map_err(|e| transport_error(PROFILE_SERVICE, e))?;

        read_json(PROFILE_SERVICE, response).await
    }

    async fn delete_profile(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/internal/profiles/{id}")))
            .send()
            .await
            .map_err(|e| transport_error(PROFILE_SERVICE, e))?;

        expect_success(PROFILE_SERVICE, response).await
    }

    async fn add_address(&self, id: Uuid, address: NewAddress) -> Result<Address> {
        let response = self
            .client
            .post(self.url(&format!("/internal/profiles/{id}/addresses")))
            .json(&AddAddressRequest::from(address))
            .send()
            .await
            .map_err(|e| transport_error(PROFILE_SERVICE, e))?;

        read_json(PROFILE_SERVICE, response).await
    }

    async fn list_addresses(&self, id: Uuid) -> Result<Vec<Address>> {
        let response = self
            .client
            .get(self.url(&format!("/internal/profiles/{id}/addresses")))
            .send()
            .await
            .map_err(|e| transport_error(PROFILE_SERVICE, e))?;

        read_json(PROFILE_SERVICE, response).await
    }

    async fn is_ready(&self) -> bool {
        is_ready(&self.client, &self.base_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::ServicesConfig;

    /// Base URL of a local port nothing listens on
    async fn closed_port_url() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    async fn unreachable_config() -> ServicesConfig {
        let url = closed_port_url().await;
        ServicesConfig {
            auth_url: url.clone(),
            profile_url: url,
            request_timeout_secs: 2,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_verifier_is_dependency_failure() {
        let config = unreachable_config().await;
        let client = gatehouse_core::upstream::build_client(&config).unwrap();
        let auth = RemoteAuth::new(client, config.auth_url);

        let err = auth.verify_token("a.b.c").await.unwrap_err();
        assert!(matches!(err, GatehouseError::DependencyUnavailable(_)));
        assert!(!auth.is_ready().await);
    }

    #[tokio::test]
    async fn test_unreachable_profile_service() {
        let config = unreachable_config().await;
        let client = gatehouse_core::upstream::build_client(&config).unwrap();
        let profiles = RemoteProfiles::new(client, config.profile_url);

        let err = profiles.get_profile(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, GatehouseError::DependencyUnavailable(_)));
    }
}
