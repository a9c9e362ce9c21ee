use crate::models::{Client, Token, User};
use thiserror::Error;

pub mod memory;
pub mod redis;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to serialize record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Failed to parse record: {0}")]
    Deserialization(String),
    #[error("Redis error: {0}")]
    Redis(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Contract every storage backend must fulfill.
///
/// User and client records are owned by whoever administers them; the core
/// only reads them during authentication. Token records are written once at
/// issuance and never deleted here; revocation flips the `revoked` flag in
/// place so later lookups observe it.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create or replace a user record, keyed by username
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError>;

    /// Look up a user by username
    async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Create or replace a client record, keyed by client id
    async fn upsert_client(&self, client: &Client) -> Result<(), StorageError>;

    /// Look up a client by client id
    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, StorageError>;

    /// Durably persist an issued token. A single atomic record write; a
    /// request failing mid-grant leaves no partial token behind.
    async fn insert_token(&self, token: &Token) -> Result<(), StorageError>;

    /// Look up a token by its access-token string
    async fn find_token(&self, access_token: &str) -> Result<Option<Token>, StorageError>;

    /// Mark a token as revoked. Returns false when no such token exists.
    async fn revoke_token(&self, access_token: &str) -> Result<bool, StorageError>;

    /// Performs a health check on the storage backend.
    /// For Redis this pings the server; the memory backend is always healthy.
    async fn health_check(&self) -> Result<(), String>;
}

/// Storage implementation that provides a uniform interface regardless of
/// backend. The concrete implementation is chosen at startup based on the
/// application configuration.
#[derive(Clone)]
pub enum Storage {
    /// Process-local in-memory storage
    Memory(memory::MemoryStore),
    /// Redis-based storage
    Redis(redis::RedisStore),
}

#[async_trait::async_trait]
impl StorageBackend for Storage {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.upsert_user(user).await,
            Self::Redis(store) => store.upsert_user(user).await,
        }
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError> {
        match self {
            Self::Memory(store) => store.find_user(username).await,
            Self::Redis(store) => store.find_user(username).await,
        }
    }

    async fn upsert_client(&self, client: &Client) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.upsert_client(client).await,
            Self::Redis(store) => store.upsert_client(client).await,
        }
    }

    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, StorageError> {
        match self {
            Self::Memory(store) => store.find_client(client_id).await,
            Self::Redis(store) => store.find_client(client_id).await,
        }
    }

    async fn insert_token(&self, token: &Token) -> Result<(), StorageError> {
        match self {
            Self::Memory(store) => store.insert_token(token).await,
            Self::Redis(store) => store.insert_token(token).await,
        }
    }

    async fn find_token(&self, access_token: &str) -> Result<Option<Token>, StorageError> {
        match self {
            Self::Memory(store) => store.find_token(access_token).await,
            Self::Redis(store) => store.find_token(access_token).await,
        }
    }

    async fn revoke_token(&self, access_token: &str) -> Result<bool, StorageError> {
        match self {
            Self::Memory(store) => store.revoke_token(access_token).await,
            Self::Redis(store) => store.revoke_token(access_token).await,
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        match self {
            Self::Memory(store) => store.health_check().await,
            Self::Redis(store) => store.health_check().await,
        }
    }
}

/// Factory function to create the appropriate storage backend based on
/// configuration.
pub async fn create_storage(config: &crate::config::AuthdConfig) -> Result<Storage, StorageError> {
    match config.storage.store {
        crate::config::StorageKind::Memory => Ok(Storage::Memory(memory::MemoryStore::new())),
        crate::config::StorageKind::Redis => {
            if config.storage.redis.url.is_empty() {
                return Err(StorageError::Config(
                    "Redis URL is required for Redis storage".to_string(),
                ));
            }
            let store = redis::RedisStore::new(&config.storage.redis.url)
                .await
                .map_err(StorageError::Config)?;
            Ok(Storage::Redis(store))
        }
    }
}
