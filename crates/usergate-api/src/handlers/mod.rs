// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API handlers.
//!
//! Handlers run after the gate chain, so they only see requests whose route,
//! method and permissions already checked out.
//!
//! - [`session`]: login and logout
//! - [`users`]: user record reads and updates
//! - [`options`]: capability discovery

mod options;
mod session;
mod users;

pub use options::*;
pub use session::*;
pub use users::*;

use crate::error::ApiError;

/// Fallback for paths no route serves.
pub async fn not_found() -> ApiError {
    ApiError::not_found("Route")
}
