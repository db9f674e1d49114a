// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Social login account verification.
//!
//! Login exchanges a provider-issued access code for a verified account id
//! through an [`AccountVerifier`]. The provider client itself lives outside
//! this crate; [`DevAccountVerifier`] stands in for it in development and
//! tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::error::ApiError;

/// A provider account whose ownership the provider confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccount {
    /// Provider account id.
    pub account_id: String,
}

/// Account verification failures.
#[derive(Debug, Error)]
pub enum AccountError {
    /// The provider refused the code.
    #[error("access code rejected: {0}")]
    Rejected(String),

    /// The provider could not be reached.
    #[error("account provider unavailable: {0}")]
    Unavailable(String),
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Rejected(reason) => ApiError::unauthorized(reason),
            AccountError::Unavailable(reason) => ApiError::service_unavailable(reason),
        }
    }
}

/// Exchanges provider access codes for verified accounts.
#[async_trait]
pub trait AccountVerifier: Send + Sync {
    /// Verifies an access code.
    async fn verify_code(&self, access_code: &str) -> Result<VerifiedAccount, AccountError>;
}

/// Development verifier accepting codes of the form `dev:<account-id>`.
#[derive(Debug, Clone, Default)]
pub struct DevAccountVerifier;

impl DevAccountVerifier {
    /// Code prefix this verifier accepts.
    pub const PREFIX: &'static str = "dev:";

    /// Creates a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Builds a code this verifier accepts for `account_id`.
    pub fn code_for(account_id: &str) -> String {
        format!("{}{}", Self::PREFIX, account_id)
    }
}

#[async_trait]
impl AccountVerifier for DevAccountVerifier {
    async fn verify_code(&self, access_code: &str) -> Result<VerifiedAccount, AccountError> {
        match access_code.trim().strip_prefix(Self::PREFIX) {
            Some(account_id) if !account_id.is_empty() => Ok(VerifiedAccount {
                account_id: account_id.to_string(),
            }),
            _ => Err(AccountError::Rejected("unrecognized access code".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_dev_verifier() {
        let verifier = DevAccountVerifier::new();

        let account = verifier
            .verify_code(&DevAccountVerifier::code_for("abc"))
            .await
            .unwrap();
        assert_eq!(account.account_id, "abc");

        assert!(verifier.verify_code("dev:").await.is_err());
        assert!(verifier.verify_code("abc").await.is_err());
    }

    #[test]
    fn test_error_mapping() {
        let err: ApiError = AccountError::Rejected("no".into()).into();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let err: ApiError = AccountError::Unavailable("down".into()).into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
