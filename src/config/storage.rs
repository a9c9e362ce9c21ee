use confique::Config;
use serde::Deserialize;

/// Specifies which storage backend holds user, client and token records
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StorageKind {
    #[default]
    Memory,
    Redis,
}

/// Configuration for the storage backend
#[derive(Debug, Config, Clone, Default)]
pub struct StorageConfig {
    /// Storage backend: "memory" (default) or "redis"
    #[config(env = "AUTHD_STORAGE_STORE", default = "memory")]
    pub store: StorageKind,

    /// Redis specific configuration
    #[config(nested)]
    pub redis: RedisConfig,
}

/// Redis storage configuration options
#[derive(Debug, Config, Clone, Default)]
pub struct RedisConfig {
    /// Redis connection string
    #[config(env = "AUTHD_STORAGE_REDIS_URL", default = "")]
    pub url: String,
}
