// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the usergate binary.

use thiserror::Error;
use usergate_api::auth::AuthError;
use usergate_api::{ApiError, ConfigurationError};

/// Result type alias for usergate-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Errors that can occur in the usergate binary.
#[derive(Debug, Error)]
pub enum BinError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Runtime error.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// A token failed verification.
    #[error("Token rejected: {0}")]
    Token(#[source] AuthError),

    /// API error.
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

impl BinError {
    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Returns the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 1,
            Self::Runtime(_) => 2,
            Self::Io(_) => 3,
            Self::Token(_) => 4,
            Self::Api(_) => 5,
        }
    }
}

impl From<AuthError> for BinError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Configuration(e) => Self::Configuration(e),
            other => Self::Token(other),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Io(format!("JSON output failed: {}", err))
    }
}

// =============================================================================
// Error Reporting
// =============================================================================

/// Reports an error with its cause chain on stderr.
pub fn report_error(error: &BinError) {
    eprintln!("Error: {}", error);

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  Caused by: {}", cause);
        source = cause.source();
    }
}

/// Reports an error and exits with the appropriate code.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BinError::from(ConfigurationError::MissingPrivateKey);
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let err = BinError::from(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"));
        assert_eq!(err.to_string(), "I/O error: pipe closed");
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_auth_error_classes() {
        let err = BinError::from(AuthError::BadSignature);
        assert_eq!(err.exit_code(), 4);

        let err = BinError::from(AuthError::Configuration(ConfigurationError::MissingPublicKey));
        assert!(matches!(err, BinError::Configuration(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(BinError::from(ConfigurationError::MissingPrivateKey).exit_code(), 1);
        assert_eq!(BinError::runtime("test").exit_code(), 2);
        assert_eq!(BinError::Api(ApiError::internal("x")).exit_code(), 5);
    }
}
