//! Helpers for calling another Gatehouse service over HTTP
//!
//! Every outbound call goes through a client built here, so each call is
//! bounded by the configured timeout. Dropping the calling future abandons
//! the request.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ServicesConfig;
use crate::error::{ApiError, GatehouseError, Result};

/// Build the shared outbound client
pub fn build_client(config: &ServicesConfig) -> Result<Client> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(|e| GatehouseError::Internal(format!("Failed to build HTTP client: {e}")))
}

/// Join a base URL and a path without doubling slashes
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// A request that never produced a response
pub fn transport_error(service: &str, err: reqwest::Error) -> GatehouseError {
    GatehouseError::DependencyUnavailable(format!("{service} unreachable: {err}"))
}

/// Decode a success body, or turn an error response back into a domain error
pub async fn read_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(read_error(service, response).await);
    }

    response.json::<T>().await.map_err(|e| {
        GatehouseError::DependencyUnavailable(format!("{service} returned an unreadable body: {e}"))
    })
}

/// Accept any 2xx response, ignoring its body
pub async fn expect_success(service: &str, response: Response) -> Result<()> {
    if response.status().is_success() {
        return Ok(());
    }
    Err(read_error(service, response).await)
}

async fn read_error(service: &str, response: Response) -> GatehouseError {
    let status = response.status();
    match response.json::<ApiError>().await {
        Ok(body) => GatehouseError::from_api_error(status, body),
        Err(_) => GatehouseError::DependencyUnavailable(format!("{service} returned {status}")),
    }
}
