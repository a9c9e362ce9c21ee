//! The password-grant engine: client authentication, resource owner
//! authentication, token minting and persistence.

use crate::api::oauth::models::ClientCredentials;
use crate::errors::OAuthError;
use crate::models::{epoch_secs, Token, User, GRANT_TYPE_PASSWORD, TOKEN_TYPE_BEARER};
use crate::storage::{Storage, StorageBackend, StorageError};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use log::{info, warn};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::Arc;

/// Executes a single Resource Owner Password Credentials exchange
/// (RFC 6749 Section 4.3). Holds no state between requests.
#[derive(Clone)]
pub struct GrantEngine {
    storage: Arc<Storage>,
    token_ttl: u64,
}

impl GrantEngine {
    pub fn new(storage: Arc<Storage>, token_ttl: u64) -> Self {
        Self { storage, token_ttl }
    }

    #[cfg(test)]
    pub(crate) fn token_ttl(&self) -> u64 {
        self.token_ttl
    }

    /// Run the grant end to end. On success exactly one token record has
    /// been persisted; on any failure, none.
    pub async fn password_grant(
        &self,
        credentials: &ClientCredentials,
        username: &str,
        password: &str,
        scope: Option<&str>,
    ) -> Result<Token, OAuthError> {
        // 1. Client authentication. Unknown client and wrong secret produce
        // the same invalid_client answer so client ids cannot be enumerated.
        let client = self
            .storage
            .find_client(&credentials.client_id)
            .await?
            .ok_or_else(|| {
                warn!("Token request from unknown client '{}'", credentials.client_id);
                OAuthError::InvalidClient
            })?;

        if !client.has_secret() || !client.check_client_secret(&credentials.client_secret) {
            warn!(
                "Client authentication failed for '{}'",
                credentials.client_id
            );
            return Err(OAuthError::InvalidClient);
        }

        if !client.check_token_endpoint_auth_method(credentials.method) {
            warn!(
                "Client '{}' used unsupported auth method {}",
                credentials.client_id,
                credentials.method.as_str()
            );
            return Err(OAuthError::InvalidClient);
        }

        // 2. Grant-type policy of the resolved client
        if !client.check_grant_type(GRANT_TYPE_PASSWORD) {
            warn!(
                "Client '{}' is not registered for the password grant",
                credentials.client_id
            );
            return Err(OAuthError::UnauthorizedClient);
        }

        // 3. Resource owner authentication
        let user = authenticate_user(&self.storage, username, password)
            .await?
            .ok_or_else(|| {
                warn!("Resource owner authentication failed for '{}'", username);
                OAuthError::InvalidGrant
            })?;

        // 4. Mint and 5. persist; nothing is returned unless the insert
        // succeeded
        let token = self.mint_token(&client.client_id, Some(&user), scope);
        self.storage.insert_token(&token).await?;

        info!(
            "Issued token for user '{}' via client '{}', expires in {}s",
            user.user_id, client.client_id, self.token_ttl
        );
        Ok(token)
    }

    fn mint_token(&self, client_id: &str, user: Option<&User>, scope: Option<&str>) -> Token {
        let scope = scope
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        Token {
            client_id: client_id.to_string(),
            user_id: user.map(|u| u.user_id.clone()),
            token_type: TOKEN_TYPE_BEARER.to_string(),
            access_token: generate_secure_token(),
            refresh_token: generate_secure_token(),
            expires_in: self.token_ttl,
            issued_at: epoch_secs(),
            scope,
            revoked: false,
        }
    }
}

/// Verify a username/password pair against the stored user record.
///
/// "User not found" and "wrong password" are indistinguishable to the
/// caller; both come back as `None`.
pub async fn authenticate_user(
    storage: &Storage,
    username: &str,
    password: &str,
) -> Result<Option<User>, StorageError> {
    let user = match storage.find_user(username).await? {
        Some(user) => user,
        None => return Ok(None),
    };
    if user.verify_password(password) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}

/// Generate a cryptographically secure random token string:
/// 32 bytes from the OS RNG, base64url-encoded without padding
fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
