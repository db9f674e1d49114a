// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Tower middleware running the gate chain in front of the router.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};
use tracing::Instrument;
use uuid::Uuid;

use super::{ChainOutcome, GateChain, GateContext, GateRequest, RequestMeta};
use crate::dispatch::{RouteMatch, RouteTable};
use crate::error::ApiError;

// =============================================================================
// GateLayer
// =============================================================================

/// Layer running a [`GateChain`] before the wrapped service.
///
/// It must wrap the whole router, so that gating happens before axum's own
/// routing can answer a request.
#[derive(Clone)]
pub struct GateLayer {
    chain: Arc<GateChain>,
    table: Arc<RouteTable>,
}

impl GateLayer {
    /// Creates a new gate layer.
    pub fn new(chain: Arc<GateChain>, table: Arc<RouteTable>) -> Self {
        Self { chain, table }
    }
}

impl<S> Layer<S> for GateLayer {
    type Service = GateMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GateMiddleware {
            inner,
            chain: self.chain.clone(),
            table: self.table.clone(),
        }
    }
}

// =============================================================================
// GateMiddleware
// =============================================================================

/// Middleware produced by [`GateLayer`].
#[derive(Clone)]
pub struct GateMiddleware<S> {
    inner: S,
    chain: Arc<GateChain>,
    table: Arc<RouteTable>,
}

impl<S> Service<Request<Body>> for GateMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let chain = self.chain.clone();
        let table = self.table.clone();
        let mut inner = self.inner.clone();

        let request_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "request",
            %request_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        Box::pin(
            async move {
                let client_ip = req
                    .extensions()
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ci| ci.0.ip());

                let route = table.resolve(req.method(), req.uri().path());

                req.extensions_mut().insert(RequestMeta {
                    request_id,
                    client_ip,
                });
                req.extensions_mut().insert(table);

                if route.is_ungated() {
                    return inner.call(req).await;
                }

                let mut ctx = GateContext::new(request_id, client_ip);
                let outcome = {
                    let request = GateRequest {
                        method: req.method(),
                        path: req.uri().path(),
                        headers: req.headers(),
                        route: &route,
                    };
                    chain.evaluate(&request, &mut ctx)
                };

                if let ChainOutcome::Rejected { stage, error } = outcome {
                    tracing::debug!(
                        stage,
                        status = error.status_code().as_u16(),
                        "Request rejected"
                    );
                    return Ok(annotate(error.into_response(), &ctx.response_headers));
                }

                if let RouteMatch::NotFound = route {
                    let error = ApiError::not_found("Route");
                    return Ok(annotate(error.into_response(), &ctx.response_headers));
                }

                if let Some(identity) = ctx.identity.take() {
                    tracing::debug!(user_id = %identity.user_id, "Request authenticated");
                    req.extensions_mut().insert(identity);
                }

                let response = inner.call(req).await?;
                Ok(annotate(response, &ctx.response_headers))
            }
            .instrument(span),
        )
    }
}

fn annotate(mut response: Response, headers: &HeaderMap) -> Response {
    for (name, value) in headers {
        response.headers_mut().insert(name.clone(), value.clone());
    }
    response
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::{header, Method, StatusCode};
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::{Identity, Permission, TokenComposer, TokenConfig};
    use crate::config::CorsConfig;
    use crate::dispatch::{DispatchRouter, RouteRequirement};
    use crate::gate::{AuthGate, MethodGate, OriginGate};

    const RSA_PRIVATE: &str = include_str!("../../../../testdata/keys/rsa_private.pem");
    const RSA_PUBLIC: &str = include_str!("../../../../testdata/keys/rsa_public.pem");

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        identity.user_id
    }

    async fn open() -> &'static str {
        "open"
    }

    fn service() -> (GateMiddleware<Router>, TokenComposer) {
        let composer = TokenComposer::new(TokenConfig::new(RSA_PRIVATE, RSA_PUBLIC)).unwrap();

        let dispatch = DispatchRouter::new()
            .route(
                Method::GET,
                "/me",
                RouteRequirement::any_of([Permission::UsersProfile]),
                whoami,
            )
            .route(Method::POST, "/open", RouteRequirement::public(), open)
            .route(Method::OPTIONS, "/*", RouteRequirement::ungated(), open)
            .build()
            .unwrap();

        let chain = GateChain::new()
            .with_gate(OriginGate::new(&CorsConfig::default()).unwrap())
            .with_gate(MethodGate::new())
            .with_gate(AuthGate::new(Arc::new(composer.clone())));

        let layer = GateLayer::new(Arc::new(chain), dispatch.table);
        (layer.layer(dispatch.router), composer)
    }

    fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_authenticated_request_reaches_handler() {
        let (svc, composer) = service();
        let token = composer
            .issue("42", [Permission::UsersProfile], Duration::from_secs(60))
            .unwrap()
            .token;

        let response = svc
            .oneshot(request(Method::GET, "/me", Some(&token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn test_rejection_carries_cors_headers() {
        let (svc, _) = service();
        let response = svc.oneshot(request(Method::GET, "/me", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_wrong_method_before_auth() {
        let (svc, _) = service();
        let response = svc.oneshot(request(Method::DELETE, "/me", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, OPTIONS");
    }

    #[tokio::test]
    async fn test_unknown_path_not_found() {
        let (svc, _) = service();
        let response = svc
            .oneshot(request(Method::GET, "/missing", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_public_and_ungated_routes() {
        let (svc, _) = service();
        let response = svc
            .clone()
            .oneshot(request(Method::POST, "/open", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = svc
            .oneshot(request(Method::OPTIONS, "/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[tokio::test]
    async fn test_undeclared_path_short_circuits() {
        let router: Router = Router::new().route("/x", get(open));
        let svc = GateLayer::new(Arc::new(GateChain::new()), Arc::new(RouteTable::default()))
            .layer(router);

        let response = svc.oneshot(request(Method::GET, "/x", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
