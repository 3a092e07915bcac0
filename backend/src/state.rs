//! Application state management
//!
//! Shared resources handed to every request handler through Axum's state
//! extraction. Everything here is built once at startup and read-only
//! afterwards; cloning only bumps reference counts.

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::repositories::UserStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// User lookup/creation backend
    pub users: Arc<dyn UserStore>,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Credential issuer/verifier holding the signing keys
    pub tokens: TokenService,
}

impl AppState {
    /// Create the application state.
    ///
    /// The signing secret is read from `config` here and nowhere else.
    pub fn new(users: Arc<dyn UserStore>, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.auth.signing_secret());

        Self {
            users,
            config: Arc::new(config),
            tokens,
        }
    }

    #[inline]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::IssueClaims;
    use crate::repositories::MemoryUserStore;

    #[test]
    fn test_state_clone_shares_resources() {
        let state = AppState::new(Arc::new(MemoryUserStore::new()), AppConfig::default());
        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.users, &cloned.users));
    }

    #[test]
    fn test_tokens_built_from_config_secret() {
        let state = AppState::new(Arc::new(MemoryUserStore::new()), AppConfig::default());

        let issued = state.tokens().issue("u1", IssueClaims::default()).unwrap();
        assert!(state.tokens().verify(Some(&issued.token)).is_some());
    }

    #[test]
    fn test_empty_secret_state_cannot_issue() {
        let mut config = AppConfig::default();
        config.auth.secret = String::new();
        let state = AppState::new(Arc::new(MemoryUserStore::new()), config);

        assert!(state.tokens().issue("u1", IssueClaims::default()).is_err());
    }
}
