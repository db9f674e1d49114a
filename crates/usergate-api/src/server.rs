// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::StatusCode, Router};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

use crate::config::ServiceConfig;
use crate::dispatch::user_routes;
use crate::error::{ApiError, ApiResult, ConfigurationError};
use crate::gate::{AuthGate, GateChain, GateLayer, MethodGate, OriginGate};
use crate::state::AppState;

// =============================================================================
// Service Assembly
// =============================================================================

/// Builds the gate chain: origin, method, then authentication.
pub fn gate_chain(state: &AppState) -> Result<GateChain, ConfigurationError> {
    Ok(GateChain::new()
        .with_gate(OriginGate::new(&state.config.cors)?)
        .with_gate(MethodGate::new())
        .with_gate(AuthGate::new(state.composer.clone())))
}

/// Builds the complete service: routes, gate chain and HTTP middleware.
pub fn build_router(state: AppState) -> Result<Router, ConfigurationError> {
    let chain = gate_chain(&state)?;
    build_router_with_chain(state, chain)
}

/// Builds the complete service around a caller-supplied gate chain.
pub fn build_router_with_chain(
    state: AppState,
    chain: GateChain,
) -> Result<Router, ConfigurationError> {
    let dispatch = user_routes().build()?;
    let request_timeout = state.config.server.request_timeout;
    let table = dispatch.table;
    let router: Router = dispatch.router.with_state(state);

    info!(
        routes = table.len(),
        stages = ?chain.stage_names(),
        "Service assembled"
    );

    let gated = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(GateLayer::new(Arc::new(chain), table))
        .service(router);

    // The gate must see requests before axum routes them.
    Ok(Router::new().fallback_service(gated))
}

// =============================================================================
// ApiServer
// =============================================================================

/// The API server.
///
/// This is the main entry point for creating and running the HTTP server.
pub struct ApiServer {
    state: AppState,
    config: Arc<ServiceConfig>,
}

impl ApiServer {
    /// Creates a new API server with the given state.
    pub fn new(state: AppState) -> Self {
        let config = state.config.clone();
        Self { state, config }
    }

    /// Creates the router with all routes and middleware.
    pub fn router(&self) -> ApiResult<Router> {
        Ok(build_router(self.state.clone())?)
    }

    /// Fails with [`ConfigurationError::StoreUnavailable`] when the user
    /// store cannot be reached.
    pub async fn check_store(&self) -> Result<(), ConfigurationError> {
        if self.state.store().is_connected().await {
            Ok(())
        } else {
            Err(ConfigurationError::StoreUnavailable(
                self.config.database.to_string(),
            ))
        }
    }

    /// Runs the server until `shutdown_signal` resolves.
    ///
    /// Refuses to start when the user store is unreachable. Callers that need
    /// that failure as a configuration error run [`ApiServer::check_store`]
    /// first.
    pub async fn run_with_shutdown(
        self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> ApiResult<()> {
        self.check_store().await?;

        let addr = self.config.socket_addr();
        let router = self.router()?;

        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| ApiError::internal(format!("Server error: {}", e)))?;

        info!("API server shutdown complete");

        Ok(())
    }

    /// Returns the server address.
    pub fn addr(&self) -> SocketAddr {
        self.config.socket_addr()
    }
}

// =============================================================================
// Server Builder
// =============================================================================

/// Builder for creating the API server.
pub struct ApiServerBuilder {
    state_builder: crate::state::AppStateBuilder,
}

impl ApiServerBuilder {
    /// Creates a new server builder.
    pub fn new() -> Self {
        Self {
            state_builder: AppState::builder(),
        }
    }

    /// Sets the configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.state_builder = self.state_builder.config(config);
        self
    }

    /// Sets the user store.
    pub fn store(mut self, store: Arc<dyn crate::store::UserStore>) -> Self {
        self.state_builder = self.state_builder.store(store);
        self
    }

    /// Sets the account verifier.
    pub fn accounts(mut self, accounts: Arc<dyn crate::accounts::AccountVerifier>) -> Self {
        self.state_builder = self.state_builder.accounts(accounts);
        self
    }

    /// Builds the server.
    pub fn build(self) -> Result<ApiServer, ConfigurationError> {
        let state = self.state_builder.build()?;
        Ok(ApiServer::new(state))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
