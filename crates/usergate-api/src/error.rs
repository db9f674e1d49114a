// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API error types and handling.
//!
//! [`ApiError`] maps to HTTP status codes and JSON error bodies.
//! [`ConfigurationError`] covers faults in the service's own setup, which are
//! reported at startup or, if reached at request time, as a generic 500.

use std::fmt;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

/// API error type with HTTP status code mapping.
///
/// The `message` fields are for logs. Authentication and authorization
/// failures always render the same client-facing text so responses do not
/// reveal why a credential was refused.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404).
    #[error("Resource not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Bad request (400).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message.
        message: String,
    },

    /// Unauthorized (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Forbidden (403).
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Error message.
        message: String,
    },

    /// Method not allowed on an existing path (405).
    #[error("Method {method} not allowed")]
    MethodNotAllowed {
        /// The rejected method.
        method: Method,
        /// Methods the path does accept.
        allowed: Vec<Method>,
    },

    /// Validation error (422).
    #[error("Validation error: {message}")]
    Validation {
        /// Error message.
        message: String,
    },

    /// Service unavailable (503).
    #[error("Service unavailable: {message}")]
    ServiceUnavailable {
        /// Error message.
        message: String,
    },

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl ApiError {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a not found error.
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a method not allowed error.
    pub fn method_not_allowed(method: Method, allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed { method, allowed }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a service unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::BadRequest { .. } => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-facing error message.
    ///
    /// This message never carries internal detail.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("{} not found", resource),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Unauthorized { .. } => "Authentication required".to_string(),
            ApiError::Forbidden { .. } => "Insufficient permissions".to_string(),
            ApiError::MethodNotAllowed { method, .. } => {
                format!("Method {} is not allowed for this resource", method)
            }
            ApiError::Validation { message, .. } => format!("Validation failed: {}", message),
            ApiError::ServiceUnavailable { .. } => {
                "Service temporarily unavailable".to_string()
            }
            ApiError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            ApiError::Internal { .. } | ApiError::ServiceUnavailable { .. }
        )
    }

    /// Returns the value for the `Allow` header, if this error carries one.
    pub fn allow_header(&self) -> Option<HeaderValue> {
        match self {
            ApiError::MethodNotAllowed { allowed, .. } => {
                HeaderValue::from_str(&join_methods(allowed)).ok()
            }
            _ => None,
        }
    }

    fn error_details(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::MethodNotAllowed { allowed, .. } => Some(serde_json::json!({
                "allowed": allowed.iter().map(Method::as_str).collect::<Vec<_>>()
            })),
            _ => None,
        }
    }
}

/// Joins methods into a comma-separated header value.
pub fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.user_message();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details: self.error_details(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let Some(allow) = self.allow_header() {
            response.headers_mut().insert(header::ALLOW, allow);
        }

        response
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// =============================================================================
// ConfigurationError
// =============================================================================

/// Which half of a key pair a key error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// Signing key.
    Private,
    /// Verification key.
    Public,
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRole::Private => f.write_str("private"),
            KeyRole::Public => f.write_str("public"),
        }
    }
}

/// Faults in the service's own configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// No private key is configured, so tokens cannot be issued.
    #[error("no private key configured")]
    MissingPrivateKey,

    /// No public key is configured, so tokens cannot be verified.
    #[error("no public key configured")]
    MissingPublicKey,

    /// A configured key could not be parsed.
    #[error("invalid {role} key: {reason}")]
    InvalidKey {
        /// Which key failed.
        role: KeyRole,
        /// Parser detail.
        reason: String,
    },

    /// The configured algorithm is not an asymmetric signature scheme.
    #[error("unsupported token algorithm: {algorithm}")]
    UnsupportedAlgorithm {
        /// Algorithm name.
        algorithm: String,
    },

    /// A configuration value is missing or malformed.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        /// Environment variable or setting name.
        key: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A route could not be registered.
    #[error("invalid route {pattern}: {reason}")]
    InvalidRoute {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The user store cannot be reached.
    #[error("user store unavailable: {0}")]
    StoreUnavailable(String),
}

impl ConfigurationError {
    /// Creates an invalid key error.
    pub fn invalid_key(role: KeyRole, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            role,
            reason: reason.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid route error.
    pub fn invalid_route(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRoute {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

impl From<ConfigurationError> for ApiError {
    fn from(err: ConfigurationError) -> Self {
        ApiError::internal(err.to_string())
    }
}

// =============================================================================
// From Implementations
// =============================================================================

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::bad_request(format!("Invalid JSON: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(ApiError::not_found("user").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::bad_request("invalid").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::unauthorized("no token").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::forbidden("no access").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::method_not_allowed(Method::DELETE, vec![Method::GET]).status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::validation("invalid field").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::internal("crash").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::not_found("x").error_code(), "NOT_FOUND");
        assert_eq!(ApiError::unauthorized("x").error_code(), "UNAUTHORIZED");
        assert_eq!(ApiError::forbidden("x").error_code(), "FORBIDDEN");
    }

    #[test]
    fn test_auth_messages_hide_detail() {
        let a = ApiError::unauthorized("token expired at 12");
        let b = ApiError::unauthorized("signature mismatch");
        assert_eq!(a.user_message(), b.user_message());
        assert!(!a.user_message().contains("expired"));

        assert!(!ApiError::internal("no public key configured")
            .user_message()
            .contains("key"));
    }

    #[test]
    fn test_allow_header() {
        let err = ApiError::method_not_allowed(Method::DELETE, vec![Method::GET, Method::PUT]);
        assert_eq!(err.allow_header().unwrap(), "GET, PUT");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, PUT");
    }

    #[test]
    fn test_validation_body() {
        let response = ApiError::validation("page must be at least 1").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let err = ApiError::validation("page must be at least 1");
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.user_message(), "Validation failed: page must be at least 1");
        assert!(err.error_details().is_none());
    }

    #[test]
    fn test_configuration_error_maps_to_internal() {
        let err: ApiError = ConfigurationError::MissingPublicKey.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ConfigurationError::invalid_key(KeyRole::Private, "bad pem").to_string(),
            "invalid private key: bad pem"
        );
    }
}
