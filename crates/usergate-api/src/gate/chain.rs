// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Ordered gate evaluation.

use std::ops::ControlFlow;
use std::sync::Arc;

use super::{Gate, GateContext, GateOutcome, GateRequest};
use crate::dispatch::PathPattern;
use crate::error::{ApiError, ConfigurationError};

/// A gate restricted to paths matching a pattern.
#[derive(Clone)]
pub struct ScopedGate {
    scope: PathPattern,
    gate: Arc<dyn Gate>,
}

impl ScopedGate {
    /// Returns `true` if the gate applies to `path`.
    pub fn applies_to(&self, path: &str) -> bool {
        self.scope.matches(path).is_some()
    }

    /// Returns the gate's stage name.
    pub fn name(&self) -> &'static str {
        self.gate.name()
    }
}

/// Outcome of running the whole chain.
#[derive(Debug)]
pub enum ChainOutcome {
    /// Every applicable gate passed.
    Passed,
    /// A gate rejected the request.
    Rejected {
        /// Name of the rejecting stage.
        stage: &'static str,
        /// The rejection.
        error: ApiError,
    },
}

impl ChainOutcome {
    /// Returns `true` if the chain passed.
    pub fn is_passed(&self) -> bool {
        matches!(self, ChainOutcome::Passed)
    }
}

/// Gates evaluated in registration order.
///
/// # Example
///
/// ```rust,ignore
/// let chain = GateChain::new()
///     .with_gate(OriginGate::new(cors))
///     .with_gate(MethodGate::new())
///     .with_scoped_gate("/users/*", AuthGate::new(verifier))?;
/// ```
#[derive(Clone, Default)]
pub struct GateChain {
    stages: Vec<ScopedGate>,
}

impl GateChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a gate applying to every path.
    pub fn with_gate(mut self, gate: impl Gate + 'static) -> Self {
        self.stages.push(ScopedGate {
            scope: PathPattern::any(),
            gate: Arc::new(gate),
        });
        self
    }

    /// Appends a gate applying to paths matching `scope`.
    pub fn with_scoped_gate(
        mut self,
        scope: &str,
        gate: impl Gate + 'static,
    ) -> Result<Self, ConfigurationError> {
        self.stages.push(ScopedGate {
            scope: PathPattern::parse(scope)?,
            gate: Arc::new(gate),
        });
        Ok(self)
    }

    /// Returns the stage names in evaluation order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(ScopedGate::name).collect()
    }

    /// Returns the number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the applicable gates until one rejects.
    pub fn evaluate(&self, request: &GateRequest<'_>, ctx: &mut GateContext) -> ChainOutcome {
        let flow = self
            .stages
            .iter()
            .filter(|stage| stage.applies_to(request.path))
            .try_fold((), |(), stage| match stage.gate.evaluate(request, ctx) {
                GateOutcome::Pass => ControlFlow::Continue(()),
                GateOutcome::Reject(error) => ControlFlow::Break((stage.name(), error)),
            });

        match flow {
            ControlFlow::Continue(()) => ChainOutcome::Passed,
            ControlFlow::Break((stage, error)) => ChainOutcome::Rejected { stage, error },
        }
    }
}

impl std::fmt::Debug for GateChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateChain")
            .field("stages", &self.stage_names())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::{HeaderMap, Method};
    use uuid::Uuid;

    use super::*;
    use crate::dispatch::RouteMatch;

    struct Recording {
        name: &'static str,
        reject: bool,
        calls: Arc<AtomicUsize>,
    }

    impl Gate for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn evaluate(&self, _request: &GateRequest<'_>, _ctx: &mut GateContext) -> GateOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                GateOutcome::Reject(ApiError::forbidden(self.name))
            } else {
                GateOutcome::Pass
            }
        }
    }

    fn gate(name: &'static str, reject: bool) -> (Recording, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Recording {
                name,
                reject,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn run(chain: &GateChain, path: &str) -> ChainOutcome {
        let method = Method::GET;
        let headers = HeaderMap::new();
        let route = RouteMatch::NotFound;
        let request = GateRequest {
            method: &method,
            path,
            headers: &headers,
            route: &route,
        };
        let mut ctx = GateContext::new(Uuid::now_v7(), None);
        chain.evaluate(&request, &mut ctx)
    }

    #[test]
    fn test_all_pass() {
        let (a, a_calls) = gate("a", false);
        let (b, b_calls) = gate("b", false);
        let chain = GateChain::new().with_gate(a).with_gate(b);

        assert!(run(&chain, "/x").is_passed());
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(chain.stage_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_first_rejection_stops_chain() {
        let (a, _) = gate("a", false);
        let (b, _) = gate("b", true);
        let (c, c_calls) = gate("c", true);
        let chain = GateChain::new().with_gate(a).with_gate(b).with_gate(c);

        match run(&chain, "/x") {
            ChainOutcome::Rejected { stage, .. } => assert_eq!(stage, "b"),
            ChainOutcome::Passed => panic!("expected rejection"),
        }
        assert_eq!(c_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_scoped_gate_skipped_outside_scope() {
        let (a, a_calls) = gate("a", true);
        let chain = GateChain::new().with_scoped_gate("/users/*", a).unwrap();

        assert!(run(&chain, "/groups").is_passed());
        assert_eq!(a_calls.load(Ordering::SeqCst), 0);
        assert!(!run(&chain, "/users/42").is_passed());
    }

    #[test]
    fn test_invalid_scope() {
        let (a, _) = gate("a", false);
        assert!(GateChain::new().with_scoped_gate("users", a).is_err());
    }
}
