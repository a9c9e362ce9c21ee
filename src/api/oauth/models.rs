//! Request/response structures of the token endpoint

use crate::errors::OAuthError;
use crate::models::{ClientAuthMethod, Token};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::HeaderMap;
use log::warn;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// OAuth 2.0 Token Request (RFC 6749 Section 4.3.2), form-encoded
#[derive(Debug, Deserialize, ToSchema)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type - must be "password"
    pub grant_type: String,
    /// Resource owner username
    pub username: Option<String>,
    /// Resource owner password
    pub password: Option<String>,
    /// Requested scopes (space-separated)
    pub scope: Option<String>,
    /// Client identifier (when not using HTTP Basic authentication)
    pub client_id: Option<String>,
    /// Client secret (when not using HTTP Basic authentication)
    pub client_secret: Option<String>,
}

/// OAuth 2.0 Token Response (RFC 6749 Section 5.1)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// The access token string
    pub access_token: String,
    /// Token type - always "bearer"
    pub token_type: String,
    /// Refresh token (issued but not redeemable; the refresh grant is not
    /// supported)
    pub refresh_token: String,
    /// Token lifetime in seconds
    pub expires_in: u64,
    /// Granted scopes (space-separated)
    pub scope: String,
}

impl From<Token> for TokenResponse {
    /// The wire payload deliberately excludes `client_id`, `user_id` and
    /// any storage-internal identifier
    fn from(token: Token) -> Self {
        Self {
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            scope: token.scope.join(" "),
        }
    }
}

/// Client credentials extracted from a token request, together with the
/// authentication method the client used to present them
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub method: ClientAuthMethod,
}

impl ClientCredentials {
    /// Extract client credentials from an HTTP Basic authorization header
    /// or, failing that, from the request body fields.
    ///
    /// A missing or unparseable credential pair is reported as
    /// `invalid_client`; whether the client id exists is never revealed at
    /// this stage.
    pub fn extract(headers: &HeaderMap, request: &TokenRequest) -> Result<Self, OAuthError> {
        if let Some(header) = headers.get(http::header::AUTHORIZATION) {
            if let Some(credentials) = Self::from_basic_header(header) {
                return Ok(credentials);
            }
        }

        match (&request.client_id, &request.client_secret) {
            (Some(client_id), Some(client_secret)) if !client_id.is_empty() => Ok(Self {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                method: ClientAuthMethod::Post,
            }),
            _ => {
                warn!("Token request without usable client credentials");
                Err(OAuthError::InvalidClient)
            }
        }
    }

    fn from_basic_header(header: &http::HeaderValue) -> Option<Self> {
        let header_str = header.to_str().ok()?;
        let encoded = header_str.strip_prefix("Basic ")?;
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (client_id, client_secret) = decoded.split_once(':')?;
        if client_id.is_empty() {
            return None;
        }
        Some(Self {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            method: ClientAuthMethod::Basic,
        })
    }
}
