use super::{StorageBackend, StorageError};
use crate::models::{Client, Token, User};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-local storage backend holding the three collections in plain
/// hash maps. Each operation takes a single lock for its duration only, so
/// a revocation committed before a validation starts is always observed.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    clients: Arc<RwLock<HashMap<String, Client>>>,
    tokens: Arc<RwLock<HashMap<String, Token>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted tokens, used by tests to assert that failed
    /// grants leave nothing behind
    #[cfg(test)]
    pub(crate) async fn token_count(&self) -> usize {
        self.tokens.read().await.len()
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        self.users
            .write()
            .await
            .insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn upsert_client(&self, client: &Client) -> Result<(), StorageError> {
        self.clients
            .write()
            .await
            .insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, StorageError> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn insert_token(&self, token: &Token) -> Result<(), StorageError> {
        self.tokens
            .write()
            .await
            .insert(token.access_token.clone(), token.clone());
        Ok(())
    }

    async fn find_token(&self, access_token: &str) -> Result<Option<Token>, StorageError> {
        Ok(self.tokens.read().await.get(access_token).cloned())
    }

    async fn revoke_token(&self, access_token: &str) -> Result<bool, StorageError> {
        match self.tokens.write().await.get_mut(access_token) {
            Some(token) => {
                token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}
