use crate::api::oauth::validator::ValidationError;
use crate::errors::OAuthError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use log::{error, warn};

/// Authenticates protected-resource requests with a bearer access token
/// (RFC 6750). On success the validated identity is attached to the request
/// as an extension; every failure answers 401 `invalid_token` so callers
/// cannot probe whether a token is unknown, revoked or expired. The precise
/// reason is logged.
pub(super) async fn bearer_authentication(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer_token(&request) {
        Some(token) => token,
        None => {
            warn!("Protected request without a usable bearer token");
            return OAuthError::InvalidToken.into_response();
        }
    };

    match state.validator().validate(&token).await {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(ValidationError::Storage(e)) => {
            error!("Storage failure during token validation: {}", e);
            OAuthError::Storage(e).into_response()
        }
        Err(e) => {
            warn!("Rejected bearer token ({}...): {}", token_prefix(&token), e);
            OAuthError::InvalidToken.into_response()
        }
    }
}

fn extract_bearer_token(request: &Request<Body>) -> Option<String> {
    let header = request.headers().get(http::header::AUTHORIZATION)?;
    let header_str = header.to_str().ok()?;
    if !header_str.to_lowercase().starts_with("bearer ") {
        return None;
    }
    Some(header_str[7..].to_string())
}

/// Tokens are credentials; only a short prefix ever reaches the logs
fn token_prefix(token: &str) -> &str {
    &token[..token.len().min(8)]
}
