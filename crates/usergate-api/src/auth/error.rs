// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token verification failures.

use thiserror::Error;

use crate::error::ConfigurationError;

/// Why a presented token was not accepted.
///
/// The variants are for logs and operators. Clients only ever see a uniform
/// `401 Unauthorized`, except for [`AuthError::Configuration`], which is a
/// service fault rather than a client fault.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token could not be parsed.
    #[error("malformed token: {reason}")]
    Malformed {
        /// Parser detail.
        reason: String,
    },

    /// The signature did not verify against the public key.
    #[error("token signature does not verify")]
    BadSignature,

    /// The token is past its expiry.
    #[error("token expired at {expired_at}")]
    Expired {
        /// Expiry timestamp (Unix seconds) carried by the token.
        expired_at: i64,
    },

    /// Verification is not possible with the current configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl AuthError {
    /// Creates a malformed token error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the failure is caused by service configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, AuthError::Configuration(_))
    }

    /// Short label for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::Malformed { .. } => "malformed",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired { .. } => "expired",
            AuthError::Configuration(_) => "configuration",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => AuthError::BadSignature,
            _ => AuthError::malformed(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::malformed("x").kind(), "malformed");
        assert_eq!(AuthError::BadSignature.kind(), "bad_signature");
        assert_eq!(AuthError::Expired { expired_at: 1 }.kind(), "expired");

        let err = AuthError::from(ConfigurationError::MissingPublicKey);
        assert!(err.is_configuration());
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn test_jsonwebtoken_mapping() {
        use jsonwebtoken::errors::{Error, ErrorKind};

        assert!(matches!(
            AuthError::from(Error::from(ErrorKind::InvalidSignature)),
            AuthError::BadSignature
        ));
        assert!(matches!(
            AuthError::from(Error::from(ErrorKind::InvalidToken)),
            AuthError::Malformed { .. }
        ));
        assert!(matches!(
            AuthError::from(Error::from(ErrorKind::InvalidAlgorithm)),
            AuthError::Malformed { .. }
        ));
        // Expiry is decided from the decoded claims, never from the library.
        assert!(matches!(
            AuthError::from(Error::from(ErrorKind::ExpiredSignature)),
            AuthError::Malformed { .. }
        ));
    }
}
