//! API route definitions

use crate::gate::require_identity;
use crate::handlers::{auth, users};
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler));

    // Protected routes (authentication required, owner only)
    let protected_routes = Router::new()
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/users/:id/addresses",
            post(users::add_address).get(users::list_addresses),
        )
        .layer(middleware::from_fn_with_state(state, require_identity));

    Router::new().merge(public_routes).merge(protected_routes)
}
