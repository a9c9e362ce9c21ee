//! Bearer-token validation (RFC 6750): lookup, revocation and expiry checks
//! on every protected request.

use crate::models::epoch_secs;
use crate::storage::{Storage, StorageBackend, StorageError};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use utoipa::ToSchema;

/// Why a presented token was rejected. The wire response collapses all of
/// these to `invalid_token`; the distinction exists for logging only.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("token string is empty or malformed")]
    Malformed,
    #[error("token not found")]
    NotFound,
    #[error("token has been revoked")]
    Revoked,
    #[error("token has expired")]
    Expired,
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),
}

/// The identity a validated token grants access as, handed to protected
/// handlers through a request extension
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AuthorizedIdentity {
    /// Resource owner the token was issued for; absent for client-only
    /// tokens written by external paths
    pub user_id: Option<String>,
    pub client_id: String,
    pub scope: Vec<String>,
}

/// Validates presented bearer tokens against the storage backend.
///
/// Deliberately uncached: every call re-reads the store, so revocation and
/// expiry are always evaluated against current state at the cost of one
/// storage round-trip per request.
#[derive(Clone)]
pub struct BearerValidator {
    storage: Arc<Storage>,
}

impl BearerValidator {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    /// Decide whether a presented token string authorizes a request.
    /// Validation never mutates the token record.
    pub async fn validate(&self, token_str: &str) -> Result<AuthorizedIdentity, ValidationError> {
        let token_str = token_str.trim();
        if token_str.is_empty() || !is_well_formed(token_str) {
            return Err(ValidationError::Malformed);
        }

        let token = self
            .storage
            .find_token(token_str)
            .await?
            .ok_or(ValidationError::NotFound)?;

        if token.revoked {
            return Err(ValidationError::Revoked);
        }
        if token.is_expired(epoch_secs()) {
            return Err(ValidationError::Expired);
        }

        Ok(AuthorizedIdentity {
            user_id: token.user_id,
            client_id: token.client_id,
            scope: token.scope,
        })
    }
}

/// Issued tokens are base64url strings; anything outside that alphabet can
/// be rejected without a storage round-trip
fn is_well_formed(token_str: &str) -> bool {
    token_str
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Token, TOKEN_TYPE_BEARER};
    use crate::storage::memory::MemoryStore;

    fn token(access_token: &str, issued_at: u64, revoked: bool) -> Token {
        Token {
            client_id: "c1".to_string(),
            user_id: Some("u1".to_string()),
            token_type: TOKEN_TYPE_BEARER.to_string(),
            access_token: access_token.to_string(),
            refresh_token: "rt".to_string(),
            expires_in: 3600,
            issued_at,
            scope: vec!["profile".to_string()],
            revoked,
        }
    }

    async fn validator_with(tokens: &[Token]) -> BearerValidator {
        let store = MemoryStore::new();
        for t in tokens {
            store.insert_token(t).await.unwrap();
        }
        BearerValidator::new(Arc::new(Storage::Memory(store)))
    }

    #[tokio::test]
    async fn test_valid_token_exposes_identity() {
        let validator = validator_with(&[token("at-1", epoch_secs(), false)]).await;

        let identity = validator.validate("at-1").await.unwrap();
        assert_eq!(identity.user_id.as_deref(), Some("u1"));
        assert_eq!(identity.client_id, "c1");
        assert_eq!(identity.scope, vec!["profile".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_and_malformed_tokens() {
        let validator = validator_with(&[]).await;

        assert!(matches!(
            validator.validate("").await,
            Err(ValidationError::Malformed)
        ));
        assert!(matches!(
            validator.validate("   ").await,
            Err(ValidationError::Malformed)
        ));
        assert!(matches!(
            validator.validate("not a token!").await,
            Err(ValidationError::Malformed)
        ));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let validator = validator_with(&[]).await;
        assert!(matches!(
            validator.validate("at-missing").await,
            Err(ValidationError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_revoked_token_fails_even_if_unexpired() {
        let validator = validator_with(&[token("at-1", epoch_secs(), true)]).await;
        assert!(matches!(
            validator.validate("at-1").await,
            Err(ValidationError::Revoked)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_fails_even_if_unrevoked() {
        let issued_at = epoch_secs() - 7200; // expired an hour ago
        let validator = validator_with(&[token("at-1", issued_at, false)]).await;
        assert!(matches!(
            validator.validate("at-1").await,
            Err(ValidationError::Expired)
        ));
    }

    #[tokio::test]
    async fn test_validation_is_idempotent() {
        let validator = validator_with(&[token("at-1", epoch_secs(), false)]).await;

        let first = validator.validate("at-1").await.unwrap();
        let second = validator.validate("at-1").await.unwrap();
        assert_eq!(first, second);
    }
}
