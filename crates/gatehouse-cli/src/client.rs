//! Thin JSON client for the public gateway API

use anyhow::{Context, Result};
use gatehouse_core::wire::{AddAddressRequest, LoginRequest, RegisterRequest, UpdateProfileRequest};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Status and decoded body of one gateway call
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}/api/v1{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Reply> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("could not reach gateway at {}", self.base_url))?;
        let status = response.status();
        let text = response.text().await.context("failed to read response body")?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        tracing::debug!(%status, "gateway replied");
        Ok(Reply { status, body })
    }

    async fn send_json<T: Serialize>(&self, builder: RequestBuilder, body: &T) -> Result<Reply> {
        self.send(builder.json(body)).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<Reply> {
        self.send_json(self.request(Method::POST, "/auth/register", None), request)
            .await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<Reply> {
        self.send_json(self.request(Method::POST, "/auth/login", None), request)
            .await
    }

    pub async fn profile(&self, id: &str, token: Option<&str>) -> Result<Reply> {
        self.send(self.request(Method::GET, &format!("/users/{id}"), token))
            .await
    }

    pub async fn update_profile(
        &self,
        id: &str,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> Result<Reply> {
        self.send_json(
            self.request(Method::PUT, &format!("/users/{id}"), Some(token)),
            request,
        )
        .await
    }

    pub async fn delete_profile(&self, id: &str, token: &str) -> Result<Reply> {
        self.send(self.request(Method::DELETE, &format!("/users/{id}"), Some(token)))
            .await
    }

    pub async fn add_address(
        &self,
        id: &str,
        token: &str,
        request: &AddAddressRequest,
    ) -> Result<Reply> {
        self.send_json(
            self.request(Method::POST, &format!("/users/{id}/addresses"), Some(token)),
            request,
        )
        .await
    }

    pub async fn addresses(&self, id: &str, token: &str) -> Result<Reply> {
        self.send(self.request(Method::GET, &format!("/users/{id}/addresses"), Some(token)))
            .await
    }
}
