// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # usergate Integration Tests
//!
//! End-to-end tests driving the fully assembled service in-process: gate
//! chain, dispatch router, handlers and the in-memory store.
//!
//! ## Module Structure
//!
//! - [`common`]: Shared test utilities
//!   - `fixtures`: Key material, configurations and seeded users
//!   - `mocks`: Instrumented and failing collaborators
//!   - `harness`: Builds the service and sends requests through it
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p usergate-tests
//!
//! cargo test -p usergate-tests --test integration_token
//! cargo test -p usergate-tests --test integration_gate
//! cargo test -p usergate-tests --test integration_scenarios
//! ```
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use usergate_tests::prelude::*;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let app = TestApp::new();
//!     let token = app.token_for("1", &[Permission::UsersProfile]);
//!     let response = app.get("/users/profile", Some(&token)).await;
//!     response.assert_status(StatusCode::OK);
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::fixtures::*;
    pub use crate::common::harness::*;
    pub use crate::common::mocks::*;
    pub use crate::common::init_test_logging;

    pub use axum::http::{header, Method, StatusCode};
    pub use usergate_api::auth::Permission;
}
