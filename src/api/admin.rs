//! Administrative surface: provisioning of user and client records and the
//! token revocation path. User and client records are owned by whoever
//! administers them; the grant and validation flows only read them.
//!
//! All routes require the configured API key as a bearer header. When no
//! key is configured the router is not mounted at all.

use crate::errors::ApiError;
use crate::models::{Client, User};
use crate::openapi::ADMIN_TAG;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{post, put},
    Json, Router,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertUserRequest {
    pub user_id: String,
    pub username: String,
    /// Plaintext password; hashed with bcrypt before it is stored
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpsertUserResponse {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpsertClientRequest {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UpsertClientResponse {
    pub client_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevokeTokenRequest {
    /// The access-token string to revoke
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeTokenResponse {
    pub revoked: bool,
}

/// Create or replace a user record
#[utoipa::path(
    put,
    path = "/admin/users",
    tag = ADMIN_TAG,
    request_body = UpsertUserRequest,
    responses(
        (status = 200, description = "User stored", body = UpsertUserResponse),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key")
    )
)]
pub(crate) async fn upsert_user(
    State(state): State<AppState>,
    Json(request): Json<UpsertUserRequest>,
) -> Result<Json<UpsertUserResponse>, ApiError> {
    use crate::storage::StorageBackend;

    // Credentials are stored as salted bcrypt hashes, never verbatim
    let password = pwhash::bcrypt::hash(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = User {
        user_id: request.user_id,
        username: request.username,
        password,
    };
    state
        .storage
        .upsert_user(&user)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!("Stored user record for '{}'", user.username);
    Ok(Json(UpsertUserResponse {
        user_id: user.user_id,
        username: user.username,
    }))
}

/// Create or replace a client record
#[utoipa::path(
    put,
    path = "/admin/clients",
    tag = ADMIN_TAG,
    request_body = UpsertClientRequest,
    responses(
        (status = 200, description = "Client stored", body = UpsertClientResponse),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key")
    )
)]
pub(crate) async fn upsert_client(
    State(state): State<AppState>,
    Json(request): Json<UpsertClientRequest>,
) -> Result<Json<UpsertClientResponse>, ApiError> {
    use crate::storage::StorageBackend;

    let client = Client {
        client_id: request.client_id,
        client_secret: request.client_secret,
    };
    state
        .storage
        .upsert_client(&client)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    info!("Stored client record for '{}'", client.client_id);
    Ok(Json(UpsertClientResponse {
        client_id: client.client_id,
    }))
}

/// Revoke an issued token. The flipped `revoked` flag is observed by every
/// later validation; the record itself is never deleted.
#[utoipa::path(
    post,
    path = "/admin/tokens/revoke",
    tag = ADMIN_TAG,
    request_body = RevokeTokenRequest,
    responses(
        (status = 200, description = "Token revoked", body = RevokeTokenResponse),
        (status = 404, description = "No such token"),
        (status = 401, description = "Missing API key"),
        (status = 403, description = "Invalid API key")
    )
)]
pub(crate) async fn revoke_token(
    State(state): State<AppState>,
    Json(request): Json<RevokeTokenRequest>,
) -> Result<Json<RevokeTokenResponse>, ApiError> {
    use crate::storage::StorageBackend;

    let revoked = state
        .storage
        .revoke_token(&request.token)
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;

    if !revoked {
        return Err(ApiError::not_found("No such token"));
    }

    info!("Revoked token");
    Ok(Json(RevokeTokenResponse { revoked }))
}

async fn api_key_authentication(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Extract the authorization header
    let auth_header = match request.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header,
        None => {
            warn!("Admin request without Authorization header");
            return Response::builder()
                .status(StatusCode::UNAUTHORIZED)
                .body("Missing Authorization header".into())
                .expect("Failed to create response");
        }
    };

    // Extract the key from the authorization header
    let api_key = match auth_header.to_str() {
        Ok(header_str) if header_str.to_lowercase().starts_with("bearer ") => {
            // Remove the "Bearer " prefix
            header_str[7..].to_string()
        }
        _ => {
            warn!("Admin request with malformed Authorization header");
            return Response::builder()
                .status(StatusCode::FORBIDDEN)
                .body("You are not authorized to access this resource, please check your API key.".into())
                .expect("Failed to create response");
        }
    };

    // Verify the API key
    if !crate::models::constant_time_eq(&api_key, &state.config.api_key) {
        warn!("Admin authentication failed: invalid API key");
        return Response::builder()
            .status(StatusCode::FORBIDDEN)
            .body("You are not authorized to access this resource, please check your API key.".into())
            .expect("Failed to create response");
    }
    next.run(request).await
}

pub(super) fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/users", put(upsert_user))
        .route("/admin/clients", put(upsert_client))
        .route("/admin/tokens/revoke", post(revoke_token))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_authentication,
        ))
}
