// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Harness
//!
//! Assembles the complete service in-process and drives it with
//! `tower::ServiceExt::oneshot`, so no socket is bound.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use usergate_api::accounts::AccountVerifier;
use usergate_api::auth::{Claims, Permission, TokenComposer, TokenConfig, TokenVerifier};
use usergate_api::gate::{AuthGate, GateChain, MethodGate, OriginGate};
use usergate_api::store::UserStore;
use usergate_api::{build_router, build_router_with_chain, AppState, ServiceConfig};

use super::fixtures::{ConfigFixtures, TokenFixtures, UserFixtures};

// =============================================================================
// TestApp
// =============================================================================

/// A fully assembled service.
pub struct TestApp {
    /// The state handed to the handlers.
    pub state: AppState,
    router: Router,
}

impl TestApp {
    /// The default service: RSA keys, open CORS, Alice, Bob and Carol.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a customized service.
    pub fn builder() -> TestAppBuilder {
        TestAppBuilder::default()
    }

    /// The service's token composer.
    pub fn composer(&self) -> &TokenComposer {
        self.state.composer()
    }

    /// Issues a one-hour token for `subject`.
    pub fn token_for(&self, subject: &str, permissions: &[Permission]) -> String {
        self.composer()
            .issue(subject, permissions.iter().copied(), Duration::from_secs(3600))
            .expect("test composer signs")
            .token
    }

    /// Signs a token for `subject` that expired a minute ago.
    pub fn expired_token_for(&self, subject: &str, permissions: &[Permission]) -> String {
        let claims = Claims::new(subject, permissions.iter().copied(), -60);
        self.composer().sign(&claims).expect("test composer signs")
    }

    /// Sends a request through the service.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collects");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a bodiless request, optionally with a bearer token.
    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(RequestBuilder::new(method, uri).bearer_opt(token).build())
            .await
    }

    /// Sends a GET request.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token).await
    }

    /// Sends a POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(
            RequestBuilder::new(Method::POST, uri)
                .bearer_opt(token)
                .json(body)
                .build(),
        )
        .await
    }

    /// Sends a PUT request with a JSON body.
    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(
            RequestBuilder::new(Method::PUT, uri)
                .bearer_opt(token)
                .json(body)
                .build(),
        )
        .await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TestAppBuilder
// =============================================================================

/// Builder for [`TestApp`].
#[derive(Default)]
pub struct TestAppBuilder {
    config: Option<ServiceConfig>,
    store: Option<Arc<dyn UserStore>>,
    accounts: Option<Arc<dyn AccountVerifier>>,
    verifier: Option<Arc<dyn TokenVerifier>>,
}

impl TestAppBuilder {
    /// Uses the given service configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces only the token configuration.
    pub fn token(self, token: TokenConfig) -> Self {
        let config = ConfigFixtures::service().with_token(token);
        self.config(config)
    }

    /// Uses the given user store.
    pub fn store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses the given account verifier.
    pub fn accounts(mut self, accounts: Arc<dyn AccountVerifier>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    /// Puts `verifier` in the auth gate instead of the state's composer.
    pub fn verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Assembles the service.
    pub fn build(self) -> TestApp {
        let config = self.config.unwrap_or_else(ConfigFixtures::service);
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(UserFixtures::store()));

        let mut state = AppState::builder().config(config).store(store);
        if let Some(accounts) = self.accounts {
            state = state.accounts(accounts);
        }
        let state = state.build().expect("test state builds");

        let router = match self.verifier {
            Some(verifier) => {
                let chain = GateChain::new()
                    .with_gate(OriginGate::new(&state.config.cors).expect("valid cors"))
                    .with_gate(MethodGate::new())
                    .with_gate(AuthGate::new(verifier));
                build_router_with_chain(state.clone(), chain)
            }
            None => build_router(state.clone()),
        }
        .expect("service assembles");

        TestApp { state, router }
    }
}

/// Issues tokens with the service's trusted key pair, outside any app.
pub fn trusted_composer() -> TokenComposer {
    TokenComposer::new(TokenFixtures::rsa()).expect("fixture keys parse")
}

// =============================================================================
// RequestBuilder
// =============================================================================

/// Small builder for test requests.
pub struct RequestBuilder {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Body,
}

impl RequestBuilder {
    /// Starts a request.
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            headers: HeaderMap::new(),
            body: Body::empty(),
        }
    }

    /// Sets a header.
    pub fn header(mut self, name: header::HeaderName, value: &str) -> Self {
        self.headers
            .insert(name, HeaderValue::from_str(value).expect("valid header value"));
        self
    }

    /// Adds `Authorization: Bearer <token>`.
    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION, &format!("Bearer {}", token))
    }

    /// Adds a bearer token if one is given.
    pub fn bearer_opt(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.bearer(token),
            None => self,
        }
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.body = Body::from(body.to_string());
        self
    }

    /// Sets a raw body.
    pub fn raw_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Finishes the request.
    pub fn build(self) -> Request<Body> {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.uri)
            .body(self.body)
            .expect("valid request");
        *request.headers_mut() = self.headers;
        request
    }
}

// =============================================================================
// TestResponse
// =============================================================================

/// A collected response.
#[derive(Debug)]
pub struct TestResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Bytes,
}

impl TestResponse {
    /// Parses the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "body is not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    /// The body as text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `error.code` of an error body.
    pub fn error_code(&self) -> String {
        self.json()["error"]["code"]
            .as_str()
            .expect("error body has a code")
            .to_string()
    }

    /// The `error.message` of an error body.
    pub fn error_message(&self) -> String {
        self.json()["error"]["message"]
            .as_str()
            .expect("error body has a message")
            .to_string()
    }

    /// A header value as text.
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Asserts the status, showing the body on failure.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "unexpected status, body: {}",
            self.text()
        );
        self
    }
}
