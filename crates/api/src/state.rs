//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::ExposeSecret;

use greenstem_core::store::{CatalogStore, IdentityStore};

use crate::config::ApiConfig;
use crate::services::auth::token::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources: configuration, the storage backends, and the token
/// service. Stores are held behind trait objects so tests can swap the
/// Postgres backends for in-memory ones.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    catalog: Arc<dyn CatalogStore>,
    identity: Arc<dyn IdentityStore>,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The token service is built here from the configured signing secret
    /// and lifetime.
    #[must_use]
    pub fn new(
        config: ApiConfig,
        catalog: Arc<dyn CatalogStore>,
        identity: Arc<dyn IdentityStore>,
    ) -> Self {
        let tokens = TokenService::new(
            config.token_secret.expose_secret().as_bytes(),
            config.token_ttl(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                identity,
                tokens,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog store.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogStore {
        self.inner.catalog.as_ref()
    }

    /// Get a reference to the identity store.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityStore {
        self.inner.identity.as_ref()
    }

    /// Get a reference to the token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
