pub(crate) mod admin;
mod bearer;
pub(crate) mod health;
pub(crate) mod oauth;
pub(crate) mod resource;

use crate::api::bearer::bearer_authentication;
use crate::state::AppState;
use axum::{middleware, Router};

/// Combines all API routes into a single router
pub(super) fn router(state: &AppState) -> Router<AppState> {
    let mut root = Router::new()
        .merge(health::router())
        .merge(oauth::router())
        .merge(protected_routes(state));

    // The admin surface is only reachable when an API key is configured
    if !state.config.api_key.is_empty() {
        root = root.merge(admin::router(state));
    }

    root
}

/// Resource routes that require a valid bearer token. The middleware
/// validates the presented token on every request and hands the authorized
/// identity to the handler.
fn protected_routes(state: &AppState) -> Router<AppState> {
    resource::router().layer(middleware::from_fn_with_state(
        state.clone(),
        bearer_authentication,
    ))
}
