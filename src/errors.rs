use crate::storage::StorageError;
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Protocol-level failures of the token endpoint and the bearer validator.
///
/// Rendered on the wire as the RFC 6749 Section 5.2 error object
/// `{error, error_description}`. Storage failures surface as `server_error`
/// without leaking backend detail; the original cause stays in the logs.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("client authentication failed")]
    InvalidClient,

    #[error("client is not authorized for this grant type")]
    UnauthorizedClient,

    #[error("resource owner credentials are invalid")]
    InvalidGrant,

    #[error("unsupported grant type: {0}")]
    UnsupportedGrantType(String),

    #[error("the access token is invalid")]
    InvalidToken,

    #[error("the token is not bound to a resource owner")]
    InsufficientScope,

    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

impl OAuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidClient => StatusCode::UNAUTHORIZED,
            Self::UnauthorizedClient => StatusCode::BAD_REQUEST,
            Self::InvalidGrant => StatusCode::BAD_REQUEST,
            Self::UnsupportedGrantType(_) => StatusCode::BAD_REQUEST,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::InsufficientScope => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error code as defined by RFC 6749 Section 5.2 / RFC 6750 Section 3.1
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidClient => "invalid_client",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::InvalidToken => "invalid_token",
            Self::InsufficientScope => "insufficient_scope",
            Self::Storage(_) => "server_error",
        }
    }

    fn error_description(&self) -> &'static str {
        match self {
            Self::InvalidClient => "Client authentication failed",
            Self::UnauthorizedClient => "The client is not authorized to use this grant type",
            Self::InvalidGrant => "Invalid resource owner credentials",
            Self::UnsupportedGrantType(_) => "Only the password grant type is supported",
            Self::InvalidToken => "The access token is invalid",
            Self::InsufficientScope => "The token is not associated with a resource owner",
            Self::Storage(_) => "Internal storage error",
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({
            "error": self.error_code(),
            "error_description": self.error_description(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}

/// Plain error for the non-protocol (admin) surface
#[derive(Debug, Clone)]
pub struct ApiError {
    pub detail: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new ApiError with a detail message and status code
    pub fn new<S: ToString>(detail: S, status_code: StatusCode) -> Self {
        Self {
            detail: detail.to_string(),
            status_code,
        }
    }

    /// Create new Internal Server Error (500) with a detail message
    pub fn internal<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Create new Not Found (404) with a detail message
    pub fn not_found<S: ToString>(detail: S) -> Self {
        Self::new(detail, StatusCode::NOT_FOUND)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code;
        let body = json!({
            "detail": self.detail,
        });
        (status_code, Json(body)).into_response()
    }
}
