//! Token endpoint handler

use crate::api::oauth::models::{ClientCredentials, TokenRequest, TokenResponse};
use crate::errors::OAuthError;
use crate::headers;
use crate::models::GRANT_TYPE_PASSWORD;
use crate::openapi::OAUTH_TAG;
use crate::state::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use http::{HeaderMap, StatusCode};
use log::{error, warn};

/// Issue an access token via the Resource Owner Password Credentials grant
#[utoipa::path(
    post,
    path = "/oauth/token",
    tag = OAUTH_TAG,
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Invalid grant or grant type"),
        (status = 401, description = "Client authentication failed"),
        (status = 500, description = "Token could not be persisted")
    )
)]
pub(crate) async fn token(
    State(state): State<AppState>,
    header_map: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    let mut response = handle_token_request(state, header_map, request).await;
    // Token material must never be cached, successful or not
    headers::no_store(&mut response);
    response
}

async fn handle_token_request(
    state: AppState,
    header_map: HeaderMap,
    request: TokenRequest,
) -> Response {
    if request.grant_type != GRANT_TYPE_PASSWORD {
        warn!("Rejected token request with grant type '{}'", request.grant_type);
        return OAuthError::UnsupportedGrantType(request.grant_type).into_response();
    }

    let credentials = match ClientCredentials::extract(&header_map, &request) {
        Ok(credentials) => credentials,
        Err(e) => return e.into_response(),
    };

    // Absent resource owner credentials fail exactly like wrong ones
    let username = request.username.as_deref().unwrap_or_default();
    let password = request.password.as_deref().unwrap_or_default();

    match state
        .grant_engine()
        .password_grant(&credentials, username, password, request.scope.as_deref())
        .await
    {
        Ok(token) => (StatusCode::OK, Json(TokenResponse::from(token))).into_response(),
        Err(OAuthError::Storage(e)) => {
            error!("Failed to persist issued token: {}", e);
            OAuthError::Storage(e).into_response()
        }
        Err(e) => e.into_response(),
    }
}
