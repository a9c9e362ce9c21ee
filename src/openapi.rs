use axum::Json;
use utoipa::OpenApi;

pub(crate) const OAUTH_TAG: &str = "OAuth2 API";
pub(crate) const RESOURCE_TAG: &str = "Protected Resources";
pub(crate) const ADMIN_TAG: &str = "Admin API";
pub(crate) const HEALTH_TAG: &str = "Health API";

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::oauth::handlers::token,
        crate::api::resource::me,
        crate::api::admin::upsert_user,
        crate::api::admin::upsert_client,
        crate::api::admin::revoke_token,
        crate::api::health::health_check,
        crate::api::health::ready_check,
    ),
    tags(
        (name = OAUTH_TAG, description = "Token issuance (resource owner password credentials grant)"),
        (name = RESOURCE_TAG, description = "Endpoints protected by bearer-token validation"),
        (name = ADMIN_TAG, description = "Record provisioning and token revocation"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    ),
    info(
        title = "authd",
        description = "OAuth2 password-grant authorization and resource server",
        version = "0.1.0"
    )
)]
pub(crate) struct ApiDoc;

/// Handler for the OpenAPI JSON specification endpoint
pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
