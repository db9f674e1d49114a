// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request gate chain.
//!
//! Every request passes an ordered list of independent gates before it is
//! dispatched:
//!
//! 1. [`OriginGate`] annotates the response with CORS headers
//! 2. [`MethodGate`] rejects verbs the path does not declare
//! 3. [`AuthGate`] verifies the bearer token and checks permission scope
//!
//! The first rejection ends evaluation. [`GateLayer`] runs the chain in front
//! of the router.

mod auth;
mod chain;
mod layer;
mod method;
mod origin;

use std::net::IpAddr;

use axum::http::{HeaderMap, Method};
use uuid::Uuid;

use crate::auth::Identity;
use crate::dispatch::RouteMatch;
use crate::error::ApiError;

pub use auth::{extract_bearer_token, AuthGate};
pub use chain::{ChainOutcome, GateChain, ScopedGate};
pub use layer::{GateLayer, GateMiddleware};
pub use method::MethodGate;
pub use origin::{CorsHeaders, OriginGate};

// =============================================================================
// Gate
// =============================================================================

/// Result of evaluating one gate.
#[derive(Debug)]
pub enum GateOutcome {
    /// Continue with the next gate.
    Pass,
    /// Stop and answer with this error.
    Reject(ApiError),
}

impl GateOutcome {
    /// Returns `true` if the gate passed.
    pub fn is_pass(&self) -> bool {
        matches!(self, GateOutcome::Pass)
    }
}

/// The parts of a request a gate may inspect.
#[derive(Debug, Clone, Copy)]
pub struct GateRequest<'a> {
    /// Request method.
    pub method: &'a Method,
    /// Request path.
    pub path: &'a str,
    /// Request headers.
    pub headers: &'a HeaderMap,
    /// Route resolution for this method and path.
    pub route: &'a RouteMatch,
}

/// Per-request state the gates write into.
#[derive(Debug, Clone)]
pub struct GateContext {
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
    /// Identity established by the auth gate.
    pub identity: Option<Identity>,
    /// Headers to add to the response, whatever its outcome.
    pub response_headers: HeaderMap,
}

impl GateContext {
    /// Creates an empty context.
    pub fn new(request_id: Uuid, client_ip: Option<IpAddr>) -> Self {
        Self {
            request_id,
            client_ip,
            identity: None,
            response_headers: HeaderMap::new(),
        }
    }
}

/// A single check in the chain.
///
/// Gates are synchronous and perform no I/O.
pub trait Gate: Send + Sync {
    /// Stage name for logs.
    fn name(&self) -> &'static str;

    /// Evaluates the request.
    fn evaluate(&self, request: &GateRequest<'_>, ctx: &mut GateContext) -> GateOutcome;
}

// =============================================================================
// RequestMeta
// =============================================================================

/// Request metadata attached to every request the chain lets through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestMeta {
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    pub client_ip: Option<IpAddr>,
}
