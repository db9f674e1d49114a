// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Application state shared across handlers.

use std::sync::Arc;

use crate::accounts::{AccountVerifier, DevAccountVerifier};
use crate::auth::TokenComposer;
use crate::config::ServiceConfig;
use crate::error::ConfigurationError;
use crate::store::{MemoryUserStore, UserStore};

// =============================================================================
// AppState
// =============================================================================

/// Application state shared across all handlers.
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Arc<ServiceConfig>,
    /// Token composer for issuing and verifying tokens.
    pub composer: Arc<TokenComposer>,
    /// User record store.
    pub store: Arc<dyn UserStore>,
    /// Social login account verifier.
    pub accounts: Arc<dyn AccountVerifier>,
}

impl AppState {
    /// Creates a new app state builder.
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Returns the token composer.
    pub fn composer(&self) -> &TokenComposer {
        &self.composer
    }

    /// Returns the user store.
    pub fn store(&self) -> &dyn UserStore {
        self.store.as_ref()
    }

    /// Returns the account verifier.
    pub fn accounts(&self) -> &dyn AccountVerifier {
        self.accounts.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("composer", &self.composer)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// AppStateBuilder
// =============================================================================

/// Builder for constructing AppState.
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<ServiceConfig>,
    composer: Option<Arc<TokenComposer>>,
    store: Option<Arc<dyn UserStore>>,
    accounts: Option<Arc<dyn AccountVerifier>>,
}

impl AppStateBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the token composer.
    pub fn composer(mut self, composer: Arc<TokenComposer>) -> Self {
        self.composer = Some(composer);
        self
    }

    /// Sets the user store.
    pub fn store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Sets the account verifier.
    pub fn accounts(mut self, accounts: Arc<dyn AccountVerifier>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Builds the AppState.
    ///
    /// Without an explicit composer one is created from the token
    /// configuration. Store and verifier default to the in-memory and
    /// development implementations.
    pub fn build(self) -> Result<AppState, ConfigurationError> {
        let config = self.config.unwrap_or_default();

        let composer = match self.composer {
            Some(composer) => composer,
            None => Arc::new(TokenComposer::new(config.token.clone())?),
        };

        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryUserStore::new()));

        let accounts = self
            .accounts
            .unwrap_or_else(|| Arc::new(DevAccountVerifier::new()));

        Ok(AppState {
            config: Arc::new(config),
            composer,
            store,
            accounts,
        })
    }
}

// =============================================================================
// FromRef implementations for extracting parts of state
// =============================================================================

impl axum::extract::FromRef<AppState> for Arc<TokenComposer> {
    fn from_ref(state: &AppState) -> Self {
        state.composer.clone()
    }
}

impl axum::extract::FromRef<AppState> for Arc<ServiceConfig> {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

// =============================================================================
// Tests
// =============================================================================
