// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Authentication and authorization module.
//!
//! This module provides:
//! - Permission scopes and the satisfaction rule
//! - Token issuance and verification
//! - The verified caller identity

mod claims;
mod composer;
mod error;
mod identity;
pub mod permission;

pub use claims::Claims;
pub use composer::{IssuedToken, TokenComposer, TokenConfig, TokenVerifier};
pub use error::AuthError;
pub use identity::Identity;
pub use permission::{satisfies, Permission, PermissionSet};
