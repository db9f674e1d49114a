// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Builds the route table and the axum router from one set of declarations.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::handler::Handler;
use axum::http::Method;
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::Router;

use super::pattern::PathPattern;
use super::table::{RouteEntry, RouteRequirement, RouteTable};
use crate::error::ConfigurationError;
use crate::handlers::not_found;

struct Registration<S> {
    entry: RouteEntry,
    router: MethodRouter<S>,
}

/// Output of [`DispatchRouter::build`].
pub struct Dispatch<S = ()> {
    /// Route metadata for the gate chain.
    pub table: Arc<RouteTable>,
    /// The axum router serving the same routes.
    pub router: Router<S>,
}

/// Declares routes once and produces both the gate metadata and the router.
///
/// # Example
///
/// ```rust,ignore
/// let dispatch = DispatchRouter::new()
///     .route(Method::GET, "/users/:id", RouteRequirement::any_of([Permission::UsersAll]), get_user)
///     .build()?;
/// ```
pub struct DispatchRouter<S = ()> {
    registrations: Vec<Registration<S>>,
    errors: Vec<ConfigurationError>,
}

impl<S> DispatchRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    /// Creates an empty router.
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Declares a route.
    ///
    /// Invalid patterns, unsupported methods and duplicate declarations are
    /// reported by [`build`](Self::build).
    pub fn route<H, T>(
        mut self,
        method: Method,
        pattern: &str,
        requirement: RouteRequirement,
        handler: H,
    ) -> Self
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let pattern = match PathPattern::parse(pattern) {
            Ok(pattern) => pattern,
            Err(e) => {
                self.errors.push(e);
                return self;
            }
        };

        let filter = match MethodFilter::try_from(method.clone()) {
            Ok(filter) => filter,
            Err(_) => {
                self.errors.push(ConfigurationError::invalid_route(
                    pattern.as_str(),
                    format!("unsupported method {}", method),
                ));
                return self;
            }
        };

        let duplicate = self
            .registrations
            .iter()
            .any(|r| r.entry.method == method && r.entry.pattern == pattern);
        if duplicate {
            self.errors.push(ConfigurationError::invalid_route(
                pattern.as_str(),
                format!("{} declared twice", method),
            ));
            return self;
        }

        self.registrations.push(Registration {
            entry: RouteEntry {
                method,
                pattern,
                requirement,
            },
            router: on(filter, handler),
        });
        self
    }

    /// Builds the route table and router.
    pub fn build(self) -> Result<Dispatch<S>, ConfigurationError> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        let mut ranked: Vec<&Registration<S>> = self.registrations.iter().collect();
        ranked.sort_by(|a, b| {
            b.entry
                .pattern
                .specificity()
                .cmp(&a.entry.pattern.specificity())
        });

        // Each axum path gets, per method, the most specific declaration that
        // serves it. Wildcards also fill in their method on every concrete
        // path beneath them, since axum answers a method mismatch on a matched
        // path itself instead of falling through to the catch-all.
        let axum_paths: Vec<String> = {
            let mut paths: Vec<String> = self
                .registrations
                .iter()
                .flat_map(|r| r.entry.pattern.axum_paths())
                .collect();
            paths.sort();
            paths.dedup();
            paths
        };

        let mut per_path: BTreeMap<String, Vec<(Method, MethodRouter<S>)>> = BTreeMap::new();
        for path in axum_paths {
            let mut slots: Vec<(Method, MethodRouter<S>)> = Vec::new();
            for reg in &ranked {
                let serves = reg.entry.pattern.axum_paths().contains(&path)
                    || reg.entry.pattern.covers_axum_path(&path);
                if serves && !slots.iter().any(|(m, _)| *m == reg.entry.method) {
                    slots.push((reg.entry.method.clone(), reg.router.clone()));
                }
            }
            per_path.insert(path, slots);
        }

        let mut router = Router::new();
        for (path, slots) in per_path {
            let method_router = slots
                .into_iter()
                .map(|(_, r)| r)
                .reduce(MethodRouter::merge);
            if let Some(method_router) = method_router {
                router = router.route(&path, method_router);
            }
        }
        let router = router.fallback(not_found);

        let table = RouteTable::new(self.registrations.into_iter().map(|r| r.entry).collect());

        tracing::debug!(routes = table.len(), "Dispatch router built");

        Ok(Dispatch {
            table: Arc::new(table),
            router,
        })
    }
}

impl<S> Default for DispatchRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::auth::Permission;

    async fn ok() -> &'static str {
        "ok"
    }

    async fn options() -> &'static str {
        "options"
    }

    fn dispatch() -> Dispatch {
        DispatchRouter::new()
            .route(
                Method::GET,
                "/users/:id",
                RouteRequirement::any_of([Permission::UsersProfile]),
                ok,
            )
            .route(Method::GET, "/users/search", RouteRequirement::public(), ok)
            .route(Method::OPTIONS, "/*", RouteRequirement::ungated(), options)
            .build()
            .unwrap()
    }

    async fn status(router: Router, method: Method, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[test]
    fn test_build_collects_errors() {
        let result = DispatchRouter::<()>::new()
            .route(Method::GET, "no-slash", RouteRequirement::public(), ok)
            .build();
        assert!(matches!(result, Err(ConfigurationError::InvalidRoute { .. })));

        let result = DispatchRouter::<()>::new()
            .route(Method::GET, "/a", RouteRequirement::public(), ok)
            .route(Method::GET, "/a", RouteRequirement::public(), ok)
            .build();
        assert!(matches!(result, Err(ConfigurationError::InvalidRoute { .. })));
    }

    #[test]
    fn test_table_mirrors_declarations() {
        let dispatch = dispatch();
        assert_eq!(dispatch.table.len(), 3);
        assert_eq!(dispatch.table.methods(), vec![Method::GET, Method::OPTIONS]);
    }

    #[tokio::test]
    async fn test_router_serves_declared_routes() {
        let router = dispatch().router;
        assert_eq!(status(router.clone(), Method::GET, "/users/7").await, StatusCode::OK);
        assert_eq!(status(router, Method::GET, "/users/search").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fallback_without_wildcard() {
        let router = DispatchRouter::new()
            .route(Method::GET, "/users", RouteRequirement::public(), ok)
            .build()
            .unwrap()
            .router;
        assert_eq!(status(router, Method::GET, "/nothing").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_wildcard_reaches_concrete_paths() {
        let router = dispatch().router;
        assert_eq!(status(router.clone(), Method::OPTIONS, "/users/7").await, StatusCode::OK);
        assert_eq!(status(router.clone(), Method::OPTIONS, "/").await, StatusCode::OK);
        assert_eq!(status(router, Method::OPTIONS, "/a/b/c").await, StatusCode::OK);
    }
}
