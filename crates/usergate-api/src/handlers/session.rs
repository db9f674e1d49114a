// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Login and logout handlers.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{ClientIp, ValidatedJson};
use crate::response::{ApiResponse, AuthResponse};
use crate::state::AppState;

// =============================================================================
// Login
// =============================================================================

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Access code issued by the social login provider.
    pub access_code: String,
}

/// POST /users/login
///
/// Exchanges a provider access code for a signed token, creating the user
/// record on first sign-in.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if request.access_code.trim().is_empty() {
        return Err(ApiError::bad_request("access_code is required"));
    }

    let account = state.accounts().verify_code(&request.access_code).await?;
    let user = state
        .store()
        .find_or_create_by_account(&account.account_id)
        .await?;

    let issued = state
        .composer()
        .issue_default(&user.id, state.config.login.permissions.iter().copied())?;

    let expires_in = issued.expires_in();

    tracing::info!(
        user_id = %user.id,
        client_ip = ?client_ip,
        "User logged in"
    );

    Ok(Json(AuthResponse::new(issued.token, expires_in, user)))
}

// =============================================================================
// Logout
// =============================================================================

/// POST /users/logout
///
/// Tokens are not revocable; expiry is the only invalidation, so this only
/// acknowledges.
pub async fn logout() -> impl IntoResponse {
    ApiResponse::ok()
}

// =============================================================================
// Tests
// =============================================================================
