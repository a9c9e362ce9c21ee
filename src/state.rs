use crate::api::oauth::grant::GrantEngine;
use crate::api::oauth::validator::BearerValidator;
use crate::config::AuthdConfig;
use crate::storage::{create_storage, Storage, StorageBackend, StorageError};
use std::sync::Arc;

/// Shared application state. Handlers are stateless; everything mutable
/// lives behind the storage backend.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthdConfig>,
    pub storage: Arc<Storage>,
}

impl AppState {
    pub async fn new(config: AuthdConfig) -> Result<Self, StorageError> {
        let storage = create_storage(&config).await?;
        Ok(Self {
            config: Arc::new(config),
            storage: Arc::new(storage),
        })
    }

    /// Grant engine for a single token request
    pub fn grant_engine(&self) -> GrantEngine {
        GrantEngine::new(self.storage.clone(), self.config.token.ttl)
    }

    /// Bearer-token validator for a single resource request
    pub fn validator(&self) -> BearerValidator {
        BearerValidator::new(self.storage.clone())
    }

    /// Check if all components are healthy
    pub async fn health_check(&self) -> bool {
        self.storage.health_check().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    pub(crate) fn create_test_state(config: AuthdConfig) -> AppState {
        AppState {
            config: Arc::new(config),
            storage: Arc::new(Storage::Memory(MemoryStore::new())),
        }
    }

    #[tokio::test]
    async fn test_app_state_new() {
        let config = AuthdConfig::for_test();
        let state = AppState::new(config.clone()).await.unwrap();

        assert_eq!(state.config.port, config.port);
        assert_eq!(state.config.token.ttl, config.token.ttl);
        assert!(state.health_check().await);
    }

    #[test]
    fn test_app_state_clone_shares_storage() {
        let state = create_test_state(AuthdConfig::for_test());
        let state2 = state.clone();

        // After cloning, both instances should point to the same data
        assert_eq!(Arc::as_ptr(&state.config), Arc::as_ptr(&state2.config));
        assert_eq!(Arc::as_ptr(&state.storage), Arc::as_ptr(&state2.storage));
    }

    #[tokio::test]
    async fn test_grant_engine_uses_configured_ttl() {
        let mut config = AuthdConfig::for_test();
        config.token.ttl = 120;
        let state = create_test_state(config);

        assert_eq!(state.grant_engine().token_ttl(), 120);
    }
}
