// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service runtime orchestration.
//!
//! Loads and validates configuration, assembles the API server and runs it
//! until a shutdown signal arrives.

use std::net::IpAddr;
use std::sync::Arc;

use tracing::{info, warn};

use usergate_api::accounts::AccountVerifier;
use usergate_api::store::UserStore;
use usergate_api::{ApiServerBuilder, ServiceConfig};

use crate::error::{BinError, BinResult};
use crate::shutdown::ShutdownCoordinator;

// =============================================================================
// ServiceRuntime
// =============================================================================

/// The runtime that owns the server and its shutdown coordination.
pub struct ServiceRuntime {
    config: ServiceConfig,
    store: Option<Arc<dyn UserStore>>,
    accounts: Option<Arc<dyn AccountVerifier>>,
    shutdown: ShutdownCoordinator,
}

impl ServiceRuntime {
    /// Returns the effective configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns the shutdown coordinator.
    pub fn shutdown(&self) -> &ShutdownCoordinator {
        &self.shutdown
    }

    /// Runs the service until shutdown is signaled.
    pub async fn run(self) -> BinResult<()> {
        info!(
            version = usergate_api::VERSION,
            database = %self.config.database,
            "Starting usergate"
        );

        let shutdown_timeout = self.config.server.shutdown_timeout;
        let mut builder = ApiServerBuilder::new().config(self.config);
        if let Some(store) = self.store {
            builder = builder.store(store);
        }
        if let Some(accounts) = self.accounts {
            builder = builder.accounts(accounts);
        }
        let server = builder.build()?;
        server.check_store().await?;

        let signals = tokio::spawn({
            let coordinator = self.shutdown.clone();
            async move { coordinator.wait_for_os_signal().await }
        });

        let serve = server.run_with_shutdown(self.shutdown.shutdown_signal());
        let drain_deadline = {
            let signal = self.shutdown.shutdown_signal();
            async move {
                signal.await;
                tokio::time::sleep(shutdown_timeout).await;
            }
        };

        let result = tokio::select! {
            result = serve => result.map_err(BinError::from),
            _ = drain_deadline => {
                warn!(timeout = ?shutdown_timeout, "Graceful shutdown timed out, dropping open connections");
                Ok(())
            }
        };

        // Release the signal listener when the server stopped on its own.
        self.shutdown.initiate_shutdown();
        signals
            .await
            .map_err(|e| BinError::runtime(format!("signal listener failed: {}", e)))?;

        info!("usergate shutdown complete");
        result
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for constructing the service runtime.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: Option<ServiceConfig>,
    host: Option<IpAddr>,
    port: Option<u16>,
    store: Option<Arc<dyn UserStore>>,
    accounts: Option<Arc<dyn AccountVerifier>>,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration directly instead of reading the environment.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Overrides the bind address.
    pub fn host(mut self, host: Option<IpAddr>) -> Self {
        self.host = host;
        self
    }

    /// Overrides the listen port.
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
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

    /// Builds the runtime, validating the configuration.
    pub fn build(self) -> BinResult<ServiceRuntime> {
        let mut config = match self.config {
            Some(config) => config,
            None => ServiceConfig::from_env()?,
        };

        if let Some(host) = self.host {
            config.server = config.server.with_host(host);
        }
        if let Some(port) = self.port {
            config.server = config.server.with_port(port);
        }

        config.validate()?;

        Ok(ServiceRuntime {
            config,
            store: self.store,
            accounts: self.accounts,
            shutdown: ShutdownCoordinator::new(),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use usergate_api::auth::TokenConfig;
    use usergate_api::store::{Page, ProfileUpdate, StoreError, StoreResult, User};
    use usergate_api::ConfigurationError;

    const RSA_PRIVATE: &str = include_str!("../../../testdata/keys/rsa_private.pem");
    const RSA_PUBLIC: &str = include_str!("../../../testdata/keys/rsa_public.pem");

    fn test_config() -> ServiceConfig {
        ServiceConfig::default().with_token(TokenConfig::new(RSA_PRIVATE, RSA_PUBLIC))
    }

    #[test]
    fn test_runtime_builder_overrides() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .host(Some("127.0.0.1".parse().unwrap()))
            .port(Some(9090))
            .build()
            .unwrap();

        assert_eq!(runtime.config().socket_addr().to_string(), "127.0.0.1:9090");
    }

    #[test]
    fn test_runtime_builder_requires_keys() {
        let result = RuntimeBuilder::new().config(ServiceConfig::default()).build();
        assert!(matches!(
            result,
            Err(BinError::Configuration(ConfigurationError::MissingPrivateKey))
        ));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .host(Some("127.0.0.1".parse().unwrap()))
            .port(Some(0))
            .build()
            .unwrap();

        let coordinator = runtime.shutdown().clone();
        coordinator.initiate_shutdown();

        tokio::time::timeout(std::time::Duration::from_secs(5), runtime.run())
            .await
            .expect("runtime should stop")
            .unwrap();
    }

    struct UnreachableStore;

    #[async_trait]
    impl UserStore for UnreachableStore {
        async fn find_user(&self, _id: &str) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("unreachable".into()))
        }

        async fn find_users(&self, _offset: usize, _limit: usize) -> StoreResult<Page<User>> {
            Err(StoreError::Unavailable("unreachable".into()))
        }

        async fn search_users(
            &self,
            _query: &str,
            _offset: usize,
            _limit: usize,
        ) -> StoreResult<Page<User>> {
            Err(StoreError::Unavailable("unreachable".into()))
        }

        async fn find_or_create_by_account(&self, _account_id: &str) -> StoreResult<User> {
            Err(StoreError::Unavailable("unreachable".into()))
        }

        async fn update_profile(
            &self,
            _id: &str,
            _update: ProfileUpdate,
        ) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("unreachable".into()))
        }

        async fn update_favorites(
            &self,
            _id: &str,
            _favorites: Vec<String>,
        ) -> StoreResult<Option<User>> {
            Err(StoreError::Unavailable("unreachable".into()))
        }

        async fn is_connected(&self) -> bool {
            false
        }
    }

    #[tokio::test]
    async fn test_run_fails_without_store() {
        let runtime = RuntimeBuilder::new()
            .config(test_config())
            .host(Some("127.0.0.1".parse().unwrap()))
            .port(Some(0))
            .store(Arc::new(UnreachableStore))
            .build()
            .unwrap();

        let err = tokio::time::timeout(std::time::Duration::from_secs(5), runtime.run())
            .await
            .expect("runtime should fail fast")
            .unwrap_err();

        assert!(matches!(
            err,
            BinError::Configuration(ConfigurationError::StoreUnavailable(_))
        ));
        assert_eq!(err.exit_code(), 1);
    }
}
