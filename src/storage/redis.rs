use super::{StorageBackend, StorageError};
use crate::models::{Client, Token, User};
use async_trait::async_trait;
use log::error;
use redis::{aio::ConnectionManager, AsyncCommands, Client as RedisClient};

fn user_key(username: &str) -> String {
    format!("user:{username}")
}

fn client_key(client_id: &str) -> String {
    format!("client:{client_id}")
}

fn token_key(access_token: &str) -> String {
    format!("token:{access_token}")
}

/// Redis-based storage backend. Records are stored as JSON strings under
/// `user:{username}`, `client:{client_id}` and `token:{access_token}` keys,
/// without TTLs: tokens outlive their expiry so the validator can tell an
/// expired token apart from an unknown one, and retention stays an external
/// concern.
#[derive(Clone)]
pub struct RedisStore {
    _client: RedisClient,
    conn_manager: ConnectionManager,
}

impl RedisStore {
    /// Initialize a new Redis storage instance
    pub async fn new(redis_url: &str) -> Result<Self, String> {
        let client = match RedisClient::open(redis_url) {
            Ok(client) => client,
            Err(err) => {
                return Err(format!("Failed to connect to Redis: {}", err));
            }
        };

        let conn_manager = match ConnectionManager::new(client.clone()).await {
            Ok(manager) => manager,
            Err(err) => {
                return Err(format!(
                    "Failed to create Redis connection manager: {}",
                    err
                ));
            }
        };

        // Test the connection to ensure it's working
        let mut conn = conn_manager.clone();
        if let Err(err) = redis::cmd("PING").query_async::<String>(&mut conn).await {
            return Err(format!("Failed to ping Redis: {}", err));
        }

        Ok(Self {
            conn_manager,
            _client: client,
        })
    }

    async fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(value)?;
        let mut conn = self.conn_manager.clone();

        match conn.set::<_, _, ()>(key, serialized).await {
            Ok(_) => Ok(()),
            Err(err) => {
                error!("Redis error while setting key {}: {}", key, err);
                Err(StorageError::Redis(err.to_string()))
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        let mut conn = self.conn_manager.clone();

        let result: Option<String> = match conn.get(key).await {
            Ok(value) => value,
            Err(err) => {
                if err.kind() == redis::ErrorKind::TypeError {
                    // Key doesn't exist
                    return Ok(None);
                }
                error!("Redis error while getting key {}: {}", key, err);
                return Err(StorageError::Redis(err.to_string()));
            }
        };

        if let Some(value) = result {
            serde_json::from_str(&value)
                .map_err(|e| StorageError::Deserialization(e.to_string()))
                .map(Some)
        } else {
            Ok(None)
        }
    }
}

#[async_trait]
impl StorageBackend for RedisStore {
    async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
        self.set_json(&user_key(&user.username), user).await
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, StorageError> {
        self.get_json(&user_key(username)).await
    }

    async fn upsert_client(&self, client: &Client) -> Result<(), StorageError> {
        self.set_json(&client_key(&client.client_id), client).await
    }

    async fn find_client(&self, client_id: &str) -> Result<Option<Client>, StorageError> {
        self.get_json(&client_key(client_id)).await
    }

    async fn insert_token(&self, token: &Token) -> Result<(), StorageError> {
        self.set_json(&token_key(&token.access_token), token).await
    }

    async fn find_token(&self, access_token: &str) -> Result<Option<Token>, StorageError> {
        self.get_json(&token_key(access_token)).await
    }

    async fn revoke_token(&self, access_token: &str) -> Result<bool, StorageError> {
        let key = token_key(access_token);
        let mut token: Token = match self.get_json(&key).await? {
            Some(token) => token,
            None => return Ok(false),
        };
        token.revoked = true;
        self.set_json(&key, &token).await?;
        Ok(true)
    }

    async fn health_check(&self) -> Result<(), String> {
        let mut conn = self.conn_manager.clone();
        match redis::cmd("PING").query_async::<String>(&mut conn).await {
            Ok(_) => Ok(()),
            Err(err) => Err(format!("Redis health check failed: {}", err)),
        }
    }
}
