//! Statically-typed records for the three persisted collections: users,
//! clients and tokens. Each field maps one-to-one onto the stored record
//! shape; there is no reflection-style hydration.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

/// The only token type this server issues
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// The only grant type this server supports (RFC 6749 Section 4.3)
pub const GRANT_TYPE_PASSWORD: &str = "password";

/// Current time as seconds since the Unix epoch
pub fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Compare two secrets without short-circuiting on the first differing byte.
/// Comparing fixed-size digests instead of the raw strings keeps the timing
/// independent of where the candidate diverges from the stored value.
pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    Sha256::digest(a.as_bytes()) == Sha256::digest(b.as_bytes())
}

/// A resource owner. Administered through the admin surface or an external
/// identity store; read-only during authentication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: String,
    pub username: String,
    /// Either a crypt-style hash (`$...`) or a legacy plaintext credential
    pub password: String,
}

impl User {
    /// Verify a claimed password against the stored credential.
    ///
    /// Crypt-style hashes are verified with `pwhash`; anything else is
    /// treated as a legacy plaintext record and compared in constant time.
    pub fn verify_password(&self, candidate: &str) -> bool {
        if self.password.starts_with('$') {
            pwhash::unix::verify(candidate, &self.password)
        } else {
            constant_time_eq(candidate, &self.password)
        }
    }
}

/// How the client presented its credentials on the token endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClientAuthMethod {
    /// HTTP Basic authorization header (`client_secret_basic`)
    Basic,
    /// `client_id` / `client_secret` form body fields (`client_secret_post`)
    Post,
}

impl ClientAuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "client_secret_basic",
            Self::Post => "client_secret_post",
        }
    }
}

/// An application allowed to request tokens on behalf of a resource owner.
///
/// Redirection URIs are deliberately absent: only the resource owner
/// password credentials grant is supported, and that flow never redirects
/// the user (RFC 6749 Section 3.1.2 does not apply).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub client_id: String,
    pub client_secret: String,
}

impl Client {
    pub fn has_secret(&self) -> bool {
        !self.client_secret.is_empty()
    }

    /// Exact-match secret comparison, constant time
    pub fn check_client_secret(&self, candidate: &str) -> bool {
        self.has_secret() && constant_time_eq(candidate, &self.client_secret)
    }

    /// Only shared-secret authentication methods are accepted
    pub fn check_token_endpoint_auth_method(&self, method: ClientAuthMethod) -> bool {
        matches!(method, ClientAuthMethod::Basic | ClientAuthMethod::Post)
    }

    /// Clients are registered for the password grant only
    pub fn check_grant_type(&self, grant_type: &str) -> bool {
        grant_type == GRANT_TYPE_PASSWORD
    }

    /// No redirect-based flows are gated, so every response type passes
    #[allow(dead_code)]
    pub fn check_response_type(&self, _response_type: &str) -> bool {
        true
    }
}

/// A single access grant, associated with exactly one client and at most
/// one resource owner. Written once at issuance; only `revoked` may be
/// flipped afterwards, by the administrative revocation path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub client_id: String,
    pub user_id: Option<String>,
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub issued_at: u64,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default)]
    pub revoked: bool,
}

impl Token {
    /// Expiry instant, recomputed from `issued_at + expires_in` on every
    /// call rather than stored, so the two fields can never drift.
    pub fn expires_at(&self) -> u64 {
        self.issued_at.saturating_add(self.expires_in)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now > self.expires_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Client {
        Client {
            client_id: "c1".to_string(),
            client_secret: "s1".to_string(),
        }
    }

    #[test]
    fn test_client_secret_check() {
        let client = test_client();
        assert!(client.has_secret());
        assert!(client.check_client_secret("s1"));
        assert!(!client.check_client_secret("wrong"));
        assert!(!client.check_client_secret(""));
    }

    #[test]
    fn test_client_without_secret_matches_nothing() {
        let client = Client {
            client_id: "c1".to_string(),
            client_secret: "".to_string(),
        };
        assert!(!client.has_secret());
        assert!(!client.check_client_secret(""));
    }

    #[test]
    fn test_client_grant_type_policy() {
        let client = test_client();
        assert!(client.check_grant_type("password"));
        assert!(!client.check_grant_type("client_credentials"));
        assert!(!client.check_grant_type("authorization_code"));
    }

    #[test]
    fn test_client_auth_method_policy() {
        let client = test_client();
        assert!(client.check_token_endpoint_auth_method(ClientAuthMethod::Basic));
        assert!(client.check_token_endpoint_auth_method(ClientAuthMethod::Post));
    }

    #[test]
    fn test_client_response_type_is_not_gated() {
        let client = test_client();
        assert!(client.check_response_type("code"));
        assert!(client.check_response_type("anything"));
    }

    #[test]
    fn test_verify_plaintext_password() {
        let user = User {
            user_id: "u1".to_string(),
            username: "alice".to_string(),
            password: "pw1".to_string(),
        };
        assert!(user.verify_password("pw1"));
        assert!(!user.verify_password("pw2"));
    }

    #[test]
    fn test_verify_hashed_password() {
        let hash = pwhash::bcrypt::hash("pw1").unwrap();
        let user = User {
            user_id: "u1".to_string(),
            username: "alice".to_string(),
            password: hash,
        };
        assert!(user.verify_password("pw1"));
        assert!(!user.verify_password("pw2"));
    }

    fn test_token() -> Token {
        Token {
            client_id: "c1".to_string(),
            user_id: Some("u1".to_string()),
            token_type: TOKEN_TYPE_BEARER.to_string(),
            access_token: "at".to_string(),
            refresh_token: "rt".to_string(),
            expires_in: 3600,
            issued_at: 1_000_000,
            scope: vec!["profile".to_string()],
            revoked: false,
        }
    }

    #[test]
    fn test_token_expiry_is_derived() {
        let token = test_token();
        assert_eq!(token.expires_at(), 1_003_600);
        assert!(!token.is_expired(1_003_600)); // boundary: still valid
        assert!(token.is_expired(1_003_601));
        assert!(!token.is_expired(1_000_000));
    }

    #[test]
    fn test_token_record_round_trip() {
        let token = test_token();
        let serialized = serde_json::to_string(&token).unwrap();
        let deserialized: Token = serde_json::from_str(&serialized).unwrap();
        assert_eq!(token, deserialized);
    }

    #[test]
    fn test_token_defaults_for_missing_fields() {
        // Records written before the revoked flag existed must still load
        let json = r#"{
            "client_id": "c1",
            "user_id": null,
            "token_type": "bearer",
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "issued_at": 1000000
        }"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert!(!token.revoked);
        assert!(token.scope.is_empty());
        assert!(token.user_id.is_none());
    }

    #[test]
    fn test_auth_method_names() {
        assert_eq!(ClientAuthMethod::Basic.as_str(), "client_secret_basic");
        assert_eq!(ClientAuthMethod::Post.as_str(), "client_secret_post");
    }
}
