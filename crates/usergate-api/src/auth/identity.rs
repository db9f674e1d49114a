// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Verified caller identity.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::permission::{Permission, PermissionSet};
use super::Claims;

/// The identity established by a verified token.
///
/// Only [`TokenComposer::verify`](super::TokenComposer::verify) creates one,
/// so a handler holding an `Identity` knows the token behind it checked out.
/// The gate chain attaches it to the request before dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// User ID (the token subject).
    pub user_id: String,
    /// Granted permissions.
    pub permissions: PermissionSet,
    /// Token issue time (Unix seconds).
    pub issued_at: i64,
    /// Token expiry time (Unix seconds).
    pub expires_at: i64,
    /// Request ID for tracing.
    pub request_id: Uuid,
    /// Client IP address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_ip: Option<IpAddr>,
}

impl Identity {
    pub(crate) fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            permissions: claims.permissions.clone(),
            issued_at: claims.iat,
            expires_at: claims.exp,
            request_id: Uuid::now_v7(),
            client_ip: None,
        }
    }

    /// Sets the request ID.
    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    /// Sets the client IP address.
    pub fn with_client_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.client_ip = ip;
        self
    }

    /// Returns `true` if the identity holds the given permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns the expiry as a DateTime.
    pub fn expires_at_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.expires_at, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_claims() {
        let claims = Claims::new("user123", [Permission::UsersProfile], 3600);
        let request_id = Uuid::now_v7();
        let identity = Identity::from_claims(&claims)
            .with_request_id(request_id)
            .with_client_ip(Some("10.0.0.1".parse().unwrap()));

        assert_eq!(identity.user_id, "user123");
        assert!(identity.has_permission(Permission::UsersProfile));
        assert!(!identity.has_permission(Permission::UsersAll));
        assert_eq!(identity.expires_at, claims.exp);
        assert_eq!(identity.request_id, request_id);
        assert!(identity.client_ip.is_some());
    }
}
