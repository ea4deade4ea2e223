//! Identity mirror over HTTP
//!
//! Creates the profile record in the profile service right after an account
//! is committed. The profile service treats a repeated call for the same id
//! as a no-op, so retries are safe.

use async_trait::async_trait;
use gatehouse_core::upstream::{endpoint, expect_success, transport_error};
use gatehouse_core::wire::CreateProfileRequest;
use gatehouse_core::{ProfileMirror, Result};
use reqwest::Client;
use uuid::Uuid;

const SERVICE: &str = "profile service";

pub struct HttpProfileMirror {
    client: Client,
    base_url: String,
}

impl HttpProfileMirror {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ProfileMirror for HttpProfileMirror {
    async fn create_profile(&self, id: Uuid, email: &str, name: &str) -> Result<()> {
        let body = CreateProfileRequest {
            id,
            email: email.to_string(),
            name: name.to_string(),
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "/internal/profiles"))
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(SERVICE, e))?;

        expect_success(SERVICE, response).await
    }
}
