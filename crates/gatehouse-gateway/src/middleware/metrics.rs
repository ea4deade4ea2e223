//! Request counting middleware
//!
//! Counts every request and records status and latency per endpoint for
//! the JSON `/metrics` report. Endpoints are keyed by their route template,
//! so `/api/v1/users/:id` collects every user's requests.

use crate::state::AppState;
use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;

/// Key shared by every request that matched no route
pub const UNMATCHED_ENDPOINT: &str = "<unmatched>";

pub async fn metrics_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    state.increment_requests();

    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ENDPOINT.to_string());

    let response = next.run(request).await;

    let latency_us = start.elapsed().as_micros() as u64;
    state
        .record_request(endpoint, response.status().as_u16(), latency_us)
        .await;

    response
}
