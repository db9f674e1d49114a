// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # usergate-api
//!
//! Authorization gate and HTTP API for the usergate user-profile service.
//!
//! Requests pass an ordered gate chain (CORS annotation, method validation,
//! bearer token authentication with permission scopes) before they are
//! dispatched to a handler. Tokens are signed and verified by the
//! [`TokenComposer`](auth::TokenComposer) with an asymmetric key pair.
//!
//! ## Modules
//!
//! - [`auth`]: permissions, claims, token composer, identity
//! - [`gate`]: the request gate chain and its tower layer
//! - [`dispatch`]: route patterns, route table and router construction
//! - [`handlers`]: user, session and capability handlers
//! - [`store`] and [`accounts`]: outbound collaborators

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod accounts;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod response;
pub mod server;
pub mod state;
pub mod store;

pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult, ConfigurationError};
pub use server::{build_router, build_router_with_chain, gate_chain, ApiServer, ApiServerBuilder};
pub use state::{AppState, AppStateBuilder};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Service name reported by capability discovery.
pub const SERVICE_NAME: &str = "usergate";
