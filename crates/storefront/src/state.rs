//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Store;
use crate::services::auth::{TokenError, TokenService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// store and the token service. Neither is ever mutated after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn Store>,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, tokens: TokenService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { store, tokens }),
        }
    }

    /// Create application state using the configured signing key.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::MissingKey` if the signing key is empty.
    pub fn from_config(config: &StorefrontConfig, store: Arc<dyn Store>) -> Result<Self, TokenError> {
        let tokens = TokenService::new(&config.jwt_secret)?;
        Ok(Self::new(store, tokens))
    }

    /// Get a reference to the store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
