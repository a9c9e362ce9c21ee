use confique::Config;

pub(crate) use crate::config::storage::{StorageConfig, StorageKind};
use crate::config::token::TokenConfig;

pub mod storage;
pub mod token;

/// Main configuration structure for the authorization server
#[derive(Debug, Config, Clone)]
pub struct AuthdConfig {
    /// API key protecting the administrative endpoints.
    /// When empty, the admin surface is not mounted at all.
    #[config(env = "AUTHD_API_KEY", default = "")]
    pub api_key: String,

    /// The port the server will listen to (default: 3310)
    #[config(env = "AUTHD_PORT", default = 3310)]
    pub port: u16,

    /// Token issuance configuration
    #[config(nested)]
    pub token: TokenConfig,

    /// Storage backend configuration
    #[config(nested)]
    pub storage: StorageConfig,
}

impl Default for AuthdConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            port: 3310,
            token: TokenConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl AuthdConfig {
    /// Creates a new configuration from environment variables
    pub fn new() -> Result<Self, confique::Error> {
        Self::builder().env().load()
    }

    #[cfg(test)]
    pub fn for_test() -> Self {
        Self {
            api_key: "test_admin_key".to_string(),
            port: 0, // Let the OS choose a port
            token: TokenConfig { ttl: 3600 },
            storage: StorageConfig {
                store: StorageKind::Memory,
                redis: crate::config::storage::RedisConfig::default(),
            },
        }
    }
}
