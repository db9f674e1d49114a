// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! API response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::dispatch::RouteDescriptor;
use crate::extractors::PaginationParams;
use crate::store::{Page, User};

// =============================================================================
// ApiResponse
// =============================================================================

/// Bare acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Whether the operation was successful.
    pub success: bool,
}

impl ApiResponse {
    /// Creates a `{"success": true}` response.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// =============================================================================
// Response Meta
// =============================================================================

/// Pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Total number of items.
    pub total: u64,
    /// Page number (1-indexed).
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total pages.
    pub total_pages: u32,
}

impl ResponseMeta {
    /// Creates pagination metadata.
    pub fn pagination(total: u64, page: u32, per_page: u32) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page as u64) as u32
        };
        Self {
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

// =============================================================================
// Typed Responses
// =============================================================================

/// A page of users.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    /// Users on this page.
    pub users: Vec<User>,
    /// Pagination metadata.
    pub meta: ResponseMeta,
}

impl UserListResponse {
    /// Builds a response from a store page and the request's paging.
    pub fn from_page(page: Page<User>, params: &PaginationParams) -> Self {
        Self {
            meta: ResponseMeta::pagination(page.total as u64, params.page, params.limit() as u32),
            users: page.items,
        }
    }
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Access token.
    pub token: String,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// Expires in seconds.
    pub expires_in: i64,
    /// The signed-in user.
    pub user: User,
}

impl AuthResponse {
    /// Creates a new auth response.
    pub fn new(token: String, expires_in: i64, user: User) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

/// Capability discovery response.
#[derive(Debug, Serialize)]
pub struct CapabilityResponse {
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Declared routes.
    pub routes: Vec<RouteDescriptor>,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_response_ok() {
        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert_eq!(json, serde_json::json!({ "success": true }));

        let response = ApiResponse::ok().into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_response_meta_pagination() {
        let meta = ResponseMeta::pagination(101, 2, 10);
        assert_eq!(meta.total, 101);
        assert_eq!(meta.page, 2);
        assert_eq!(meta.total_pages, 11);
        assert_eq!(ResponseMeta::pagination(0, 1, 10).total_pages, 0);
    }

    #[test]
    fn test_auth_response_shape() {
        let response = AuthResponse::new("t".into(), 60, User::new("1", "acct"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "Bearer");
        assert_eq!(json["expires_in"], 60);
        assert_eq!(json["user"]["id"], "1");
    }
}
