// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token claims structure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::permission::{Permission, PermissionSet};

/// Claims carried in a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    // =========================================================================
    // Standard JWT Claims (RFC 7519)
    // =========================================================================
    /// Subject, the user ID.
    pub sub: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at time (Unix timestamp).
    pub iat: i64,

    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    // =========================================================================
    // Custom Claims
    // =========================================================================
    /// Granted permission scopes.
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl Claims {
    /// Creates new claims for a subject, expiring `expires_in_secs` from now.
    ///
    /// A negative value produces claims that are already expired. The expiry
    /// saturates at the timestamp bounds.
    pub fn new(
        subject: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        expires_in_secs: i64,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self::at(subject, permissions, now, now.saturating_add(expires_in_secs))
    }

    /// Like [`Claims::new`], but returns `None` when the expiry does not fit
    /// in a timestamp.
    pub fn try_new(
        subject: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        expires_in_secs: i64,
    ) -> Option<Self> {
        let now = Utc::now().timestamp();
        let exp = now.checked_add(expires_in_secs)?;
        Some(Self::at(subject, permissions, now, exp))
    }

    fn at(
        subject: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        iat: i64,
        exp: i64,
    ) -> Self {
        Self {
            sub: subject.into(),
            exp,
            iat,
            iss: None,
            jti: Some(Uuid::now_v7().to_string()),
            permissions: PermissionSet::from_permissions(permissions),
        }
    }

    /// Returns the subject.
    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Returns `true` if the claims grant the given permission.
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission)
    }

    /// Returns `true` if the token is past its expiry at `now`.
    pub fn is_expired_at(&self, now: i64, leeway_secs: u64) -> bool {
        now >= self.exp.saturating_add(leeway_secs as i64)
    }

    /// Returns `true` if the token has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp(), 0)
    }

    /// Returns the expiration time as a DateTime.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Returns the issued at time as a DateTime.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("user123", [Permission::UsersProfile], 3600);

        assert_eq!(claims.subject(), "user123");
        assert!(claims.has_permission(Permission::UsersProfile));
        assert!(!claims.has_permission(Permission::UsersAll));
        assert!(!claims.is_expired());
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.jti.is_some());
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = Claims::new("user", [], 0);
        assert!(claims.is_expired_at(claims.exp, 0));
        assert!(!claims.is_expired_at(claims.exp - 1, 0));
        assert!(!claims.is_expired_at(claims.exp, 5));
    }

    #[test]
    fn test_expiry_out_of_range() {
        assert!(Claims::try_new("user", [], i64::MAX).is_none());
        assert_eq!(Claims::try_new("user", [], 60).map(|c| c.exp - c.iat), Some(60));

        let saturated = Claims::new("user", [], i64::MAX);
        assert_eq!(saturated.exp, i64::MAX);
        assert!(!saturated.is_expired());
    }

    #[test]
    fn test_claims_wire_format() {
        let claims = Claims::new("42", [Permission::UsersAll, Permission::UsersProfile], 60)
            .with_issuer("usergate");
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["sub"], "42");
        assert_eq!(value["iss"], "usergate");
        assert_eq!(value["permissions"], serde_json::json!(["users:profile", "users:all"]));
    }

    #[test]
    fn test_unknown_permission_rejected() {
        let raw = r#"{"sub":"1","exp":10,"iat":0,"permissions":["users:root"]}"#;
        assert!(serde_json::from_str::<Claims>(raw).is_err());
    }
}
