// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! HTTP method validation.

use super::{Gate, GateContext, GateOutcome, GateRequest};
use crate::dispatch::RouteMatch;
use crate::error::ApiError;

/// Rejects requests whose path is declared, but not for their method.
///
/// Runs before authentication, so a wrong verb never gets its token examined.
/// Unknown paths pass; they are answered with 404 after the chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodGate;

impl MethodGate {
    /// Creates the gate.
    pub fn new() -> Self {
        Self
    }
}

impl Gate for MethodGate {
    fn name(&self) -> &'static str {
        "method"
    }

    fn evaluate(&self, request: &GateRequest<'_>, _ctx: &mut GateContext) -> GateOutcome {
        match request.route {
            RouteMatch::MethodNotAllowed { allowed } => {
                tracing::debug!(
                    method = %request.method,
                    path = %request.path,
                    "Method not declared for path"
                );
                GateOutcome::Reject(ApiError::method_not_allowed(
                    request.method.clone(),
                    allowed.clone(),
                ))
            }
            RouteMatch::Found { .. } | RouteMatch::NotFound => GateOutcome::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, Method};
    use uuid::Uuid;

    use super::*;

    fn evaluate(method: Method, route: RouteMatch) -> GateOutcome {
        let headers = HeaderMap::new();
        let request = GateRequest {
            method: &method,
            path: "/users/42",
            headers: &headers,
            route: &route,
        };
        MethodGate::new().evaluate(&request, &mut GateContext::new(Uuid::now_v7(), None))
    }

    #[test]
    fn test_rejects_undeclared_method() {
        let outcome = evaluate(
            Method::DELETE,
            RouteMatch::MethodNotAllowed {
                allowed: vec![Method::GET, Method::OPTIONS],
            },
        );

        match outcome {
            GateOutcome::Reject(err @ ApiError::MethodNotAllowed { .. }) => {
                assert_eq!(err.allow_header().unwrap(), "GET, OPTIONS");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_passes_unknown_path() {
        assert!(evaluate(Method::GET, RouteMatch::NotFound).is_pass());
    }
}
