// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Bearer token authentication and permission scope authorization.

use std::sync::Arc;

use axum::http::{header, HeaderMap};

use super::{Gate, GateContext, GateOutcome, GateRequest};
use crate::auth::{satisfies, AuthError, TokenVerifier};
use crate::error::ApiError;

/// Verifies the bearer token of routes that require permissions.
///
/// Every client-side failure (no token, unreadable header, malformed,
/// forged or expired token) yields the same 401; the reason is only
/// logged. A verifier that cannot run at all is a 500.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthGate {
    /// Creates the gate around a token verifier.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl Gate for AuthGate {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn evaluate(&self, request: &GateRequest<'_>, ctx: &mut GateContext) -> GateOutcome {
        let Some(requirement) = request.route.requirement() else {
            return GateOutcome::Pass;
        };
        if !requirement.requires_token() {
            return GateOutcome::Pass;
        }

        let Some(token) = extract_bearer_token(request.headers) else {
            tracing::debug!(path = %request.path, "No bearer token provided");
            return GateOutcome::Reject(ApiError::unauthorized("no bearer token"));
        };

        let identity = match self.verifier.verify(token) {
            Ok(identity) => identity,
            Err(AuthError::Configuration(e)) => {
                tracing::error!(error = %e, "Token verification is not configured");
                return GateOutcome::Reject(ApiError::internal(e.to_string()));
            }
            Err(e) => {
                tracing::debug!(reason = e.kind(), error = %e, "Token rejected");
                return GateOutcome::Reject(ApiError::unauthorized(e.to_string()));
            }
        };

        if !satisfies(&identity.permissions, &requirement.permissions) {
            tracing::warn!(
                user_id = %identity.user_id,
                held = ?identity.permissions.names(),
                required = ?requirement.permissions.names(),
                method = %request.method,
                path = %request.path,
                "Permission denied"
            );
            return GateOutcome::Reject(ApiError::forbidden(format!(
                "{} lacks {:?}",
                identity.user_id,
                requirement.permissions.names()
            )));
        }

        ctx.identity = Some(
            identity
                .with_request_id(ctx.request_id)
                .with_client_ip(ctx.client_ip),
        );
        GateOutcome::Pass
    }
}

/// Extracts the bearer token from the Authorization header.
///
/// A header that is not valid visible ASCII counts as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::http::{HeaderValue, Method};
    use uuid::Uuid;

    use super::*;
    use crate::auth::{Identity, Permission, TokenComposer, TokenConfig};
    use crate::dispatch::{PathPattern, RouteEntry, RouteMatch, RouteRequirement};
    use crate::error::ConfigurationError;

    const RSA_PRIVATE: &str = include_str!("../../../../testdata/keys/rsa_private.pem");
    const RSA_PUBLIC: &str = include_str!("../../../../testdata/keys/rsa_public.pem");

    struct Counting {
        inner: TokenComposer,
        calls: AtomicUsize,
    }

    impl TokenVerifier for Counting {
        fn verify(&self, token: &str) -> Result<Identity, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(token)
        }
    }

    fn composer() -> TokenComposer {
        TokenComposer::new(TokenConfig::new(RSA_PRIVATE, RSA_PUBLIC)).unwrap()
    }

    fn route(requirement: RouteRequirement) -> RouteMatch {
        RouteMatch::Found {
            route: Arc::new(RouteEntry {
                method: Method::PUT,
                pattern: PathPattern::parse("/users/favorites").unwrap(),
                requirement,
            }),
            params: Default::default(),
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    fn evaluate(
        gate: &AuthGate,
        headers: &HeaderMap,
        route: &RouteMatch,
    ) -> (GateOutcome, GateContext) {
        let method = Method::PUT;
        let request = GateRequest {
            method: &method,
            path: "/users/favorites",
            headers,
            route,
        };
        let mut ctx = GateContext::new(Uuid::now_v7(), None);
        let outcome = gate.evaluate(&request, &mut ctx);
        (outcome, ctx)
    }

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer mytoken123"));
        assert_eq!(extract_bearer_token(&headers), Some("mytoken123"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert!(extract_bearer_token(&headers).is_none());
    }

    #[test]
    fn test_public_route_never_verifies() {
        let counting = Arc::new(Counting {
            inner: composer(),
            calls: AtomicUsize::new(0),
        });
        let gate = AuthGate::new(counting.clone());

        let (outcome, ctx) = evaluate(&gate, &bearer("junk"), &route(RouteRequirement::public()));
        assert!(outcome.is_pass());
        assert!(ctx.identity.is_none());

        let (outcome, _) = evaluate(&gate, &HeaderMap::new(), &RouteMatch::NotFound);
        assert!(outcome.is_pass());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_token_unauthorized() {
        let gate = AuthGate::new(Arc::new(composer()));
        let (outcome, _) = evaluate(
            &gate,
            &HeaderMap::new(),
            &route(RouteRequirement::any_of([Permission::UsersAll])),
        );
        assert!(matches!(outcome, GateOutcome::Reject(ApiError::Unauthorized { .. })));
    }

    #[test]
    fn test_invalid_token_unauthorized() {
        let gate = AuthGate::new(Arc::new(composer()));
        let (outcome, _) = evaluate(
            &gate,
            &bearer("not.a.token"),
            &route(RouteRequirement::any_of([Permission::UsersAll])),
        );
        assert!(matches!(outcome, GateOutcome::Reject(ApiError::Unauthorized { .. })));
    }

    #[test]
    fn test_insufficient_scope_forbidden() {
        let composer = composer();
        let token = composer
            .issue("7", [Permission::UsersProfile], Duration::from_secs(60))
            .unwrap()
            .token;
        let gate = AuthGate::new(Arc::new(composer));

        let (outcome, ctx) = evaluate(
            &gate,
            &bearer(&token),
            &route(RouteRequirement::any_of([Permission::UsersAll])),
        );
        assert!(matches!(outcome, GateOutcome::Reject(ApiError::Forbidden { .. })));
        assert!(ctx.identity.is_none());
    }

    #[test]
    fn test_valid_token_attaches_identity() {
        let composer = composer();
        let token = composer
            .issue("7", [Permission::UsersAll], Duration::from_secs(60))
            .unwrap()
            .token;
        let gate = AuthGate::new(Arc::new(composer));

        let (outcome, ctx) = evaluate(
            &gate,
            &bearer(&token),
            &route(RouteRequirement::any_of([Permission::UsersProfile, Permission::UsersAll])),
        );
        assert!(outcome.is_pass());

        let identity = ctx.identity.unwrap();
        assert_eq!(identity.user_id, "7");
        assert_eq!(identity.request_id, ctx.request_id);
    }

    #[test]
    fn test_unconfigured_verifier_is_internal_error() {
        let signer = composer();
        let token = signer
            .issue("7", [Permission::UsersAll], Duration::from_secs(60))
            .unwrap()
            .token;

        struct Unconfigured;
        impl TokenVerifier for Unconfigured {
            fn verify(&self, _token: &str) -> Result<Identity, AuthError> {
                Err(ConfigurationError::MissingPublicKey.into())
            }
        }

        let gate = AuthGate::new(Arc::new(Unconfigured));
        let (outcome, _) = evaluate(
            &gate,
            &bearer(&token),
            &route(RouteRequirement::any_of([Permission::UsersAll])),
        );
        assert!(matches!(outcome, GateOutcome::Reject(ApiError::Internal { .. })));
    }
}
