//! OAuth 2.0 token endpoint and bearer-token validation.
//!
//! Implements the Resource Owner Password Credentials grant (RFC 6749
//! Section 4.3): a trusted client submits the resource owner's username and
//! password together with its own credentials and receives a bearer access
//! token. Issued tokens are persisted in the storage backend and checked for
//! revocation and expiry on every protected request.

pub mod grant;
pub mod handlers;
pub mod models;
pub mod validator;

use crate::state::AppState;
use axum::{routing::post, Router};

/// Creates the public OAuth 2.0 routes
pub fn router() -> Router<AppState> {
    Router::new().route("/oauth/token", post(handlers::token))
}
