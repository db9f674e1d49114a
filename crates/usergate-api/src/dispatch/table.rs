// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Route metadata consulted by the gate chain.

use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;

use super::pattern::{PathParams, PathPattern};
use crate::auth::{Permission, PermissionSet};

// =============================================================================
// RouteRequirement
// =============================================================================

/// What a route demands of a request before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequirement {
    /// Permissions of which the caller must hold at least one.
    pub permissions: PermissionSet,
    /// Whether the gate chain runs for this route at all.
    pub gated: bool,
}

impl RouteRequirement {
    /// Gated, but no token required.
    pub fn public() -> Self {
        Self {
            permissions: PermissionSet::new(),
            gated: true,
        }
    }

    /// Gated and requiring a token granting any of `permissions`.
    pub fn any_of(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
            gated: true,
        }
    }

    /// Bypasses the gate chain entirely.
    pub fn ungated() -> Self {
        Self {
            permissions: PermissionSet::new(),
            gated: false,
        }
    }

    /// Returns `true` if a token must be presented.
    pub fn requires_token(&self) -> bool {
        !self.permissions.is_empty()
    }
}

// =============================================================================
// RouteEntry
// =============================================================================

/// One declared route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// HTTP method.
    pub method: Method,
    /// Path pattern.
    pub pattern: PathPattern,
    /// Gate requirement.
    pub requirement: RouteRequirement,
}

/// Serializable view of a route for capability discovery.
#[derive(Debug, Clone, Serialize)]
pub struct RouteDescriptor {
    /// HTTP method.
    pub method: String,
    /// Path pattern.
    pub path: String,
    /// Permissions of which the caller must hold one (empty when none).
    pub permissions: Vec<&'static str>,
    /// Whether the gate chain runs for this route.
    pub gated: bool,
}

impl From<&RouteEntry> for RouteDescriptor {
    fn from(entry: &RouteEntry) -> Self {
        Self {
            method: entry.method.to_string(),
            path: entry.pattern.to_string(),
            permissions: entry.requirement.permissions.names(),
            gated: entry.requirement.gated,
        }
    }
}

// =============================================================================
// RouteMatch
// =============================================================================

/// Result of resolving a request against the route table.
#[derive(Debug, Clone)]
pub enum RouteMatch {
    /// A route is declared for this method and path.
    Found {
        /// The matched route.
        route: Arc<RouteEntry>,
        /// Captured path parameters.
        params: PathParams,
    },
    /// The path is declared, but not for this method.
    MethodNotAllowed {
        /// Methods declared for the path.
        allowed: Vec<Method>,
    },
    /// No route is declared for the path.
    NotFound,
}

impl RouteMatch {
    /// Returns the matched route's requirement, if any.
    pub fn requirement(&self) -> Option<&RouteRequirement> {
        match self {
            RouteMatch::Found { route, .. } => Some(&route.requirement),
            _ => None,
        }
    }

    /// Returns `true` if the gate chain should be skipped.
    pub fn is_ungated(&self) -> bool {
        self.requirement().is_some_and(|r| !r.gated)
    }
}

// =============================================================================
// RouteTable
// =============================================================================

/// Immutable table of declared routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<Arc<RouteEntry>>,
}

impl RouteTable {
    pub(crate) fn new(entries: Vec<RouteEntry>) -> Self {
        Self {
            entries: entries.into_iter().map(Arc::new).collect(),
        }
    }

    /// Resolves a request.
    ///
    /// Routes declared for `method` are tried first and the most specific
    /// match wins. Otherwise the path counts as declared only if a
    /// non-wildcard route matches it; wildcard routes still contribute their
    /// methods to the allowed list.
    pub fn resolve(&self, method: &Method, path: &str) -> RouteMatch {
        let best = self
            .entries
            .iter()
            .filter(|e| e.method == *method)
            .filter_map(|e| e.pattern.matches(path).map(|params| (e, params)))
            .max_by(|(a, _), (b, _)| a.pattern.specificity().cmp(&b.pattern.specificity()));

        if let Some((entry, params)) = best {
            return RouteMatch::Found {
                route: Arc::clone(entry),
                params,
            };
        }

        let matching: Vec<&Arc<RouteEntry>> = self
            .entries
            .iter()
            .filter(|e| e.pattern.matches(path).is_some())
            .collect();

        if !matching.iter().any(|e| !e.pattern.is_wildcard()) {
            return RouteMatch::NotFound;
        }

        let mut allowed: Vec<Method> = Vec::new();
        for entry in matching {
            if !allowed.contains(&entry.method) {
                allowed.push(entry.method.clone());
            }
        }
        RouteMatch::MethodNotAllowed { allowed }
    }

    /// Returns all entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter().map(Arc::as_ref)
    }

    /// Returns descriptors for capability discovery.
    pub fn descriptors(&self) -> Vec<RouteDescriptor> {
        self.entries().map(RouteDescriptor::from).collect()
    }

    /// Returns the distinct declared methods in declaration order.
    pub fn methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = Vec::new();
        for entry in self.entries() {
            if !methods.contains(&entry.method) {
                methods.push(entry.method.clone());
            }
        }
        methods
    }

    /// Returns the number of routes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no routes are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
