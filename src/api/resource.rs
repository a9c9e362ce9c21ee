//! Protected resource endpoints. Handlers behind the bearer middleware
//! receive the validated identity as a request extension.

use crate::api::oauth::validator::AuthorizedIdentity;
use crate::errors::OAuthError;
use crate::openapi::RESOURCE_TAG;
use crate::state::AppState;
use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub user_id: String,
    pub client_id: String,
    pub scope: Vec<String>,
}

/// Echo the identity the presented token was issued for.
///
/// This endpoint is user-scoped: tokens without a resource owner (written
/// by external client-only paths) are rejected with `insufficient_scope`.
#[utoipa::path(
    get,
    path = "/me",
    tag = RESOURCE_TAG,
    responses(
        (status = 200, description = "The authorized identity", body = MeResponse),
        (status = 401, description = "Missing, unknown, revoked or expired token"),
        (status = 403, description = "Token is not bound to a resource owner")
    ),
    security(("bearer" = []))
)]
pub(crate) async fn me(
    Extension(identity): Extension<AuthorizedIdentity>,
) -> Result<Json<MeResponse>, OAuthError> {
    let user_id = identity.user_id.ok_or(OAuthError::InsufficientScope)?;
    Ok(Json(MeResponse {
        user_id,
        client_id: identity.client_id,
        scope: identity.scope,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}
