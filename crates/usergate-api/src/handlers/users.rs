// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User record handlers.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::extractors::{Auth, Pagination, UserIdPath, ValidatedJson};
use crate::response::UserListResponse;
use crate::state::AppState;
use crate::store::ProfileUpdate;

// =============================================================================
// Request Types
// =============================================================================

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Text matched against name and email.
    #[serde(default)]
    pub q: String,
}

/// Favorites replacement body.
#[derive(Debug, Deserialize)]
pub struct FavoritesRequest {
    /// The complete new favorites list.
    pub favorites: Vec<String>,
}

// =============================================================================
// Reads
// =============================================================================

/// GET /users/search
pub async fn search_users(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
    Pagination(pagination): Pagination,
) -> ApiResult<impl IntoResponse> {
    let query = search.q.trim();
    if query.is_empty() {
        return Err(ApiError::validation("q must not be empty"));
    }

    let page = state
        .store()
        .search_users(query, pagination.offset(), pagination.limit())
        .await?;

    tracing::debug!(query = %query, total = page.total, "User search");

    Ok(Json(UserListResponse::from_page(page, &pagination)))
}

/// GET /users/profile
///
/// Returns the caller's own record.
pub async fn get_profile(
    State(state): State<AppState>,
    Auth(identity): Auth,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store()
        .find_user(&identity.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(user))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    UserIdPath(user_id): UserIdPath,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store()
        .find_user(&user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(user))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    Pagination(pagination): Pagination,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .store()
        .find_users(pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(UserListResponse::from_page(page, &pagination)))
}

// =============================================================================
// Updates
// =============================================================================

/// PUT /users/profile
pub async fn update_profile(
    State(state): State<AppState>,
    Auth(identity): Auth,
    ValidatedJson(update): ValidatedJson<ProfileUpdate>,
) -> ApiResult<impl IntoResponse> {
    if update.is_empty() {
        return Err(ApiError::validation("at least one of name, email or picture is required"));
    }

    let user = state
        .store()
        .update_profile(&identity.user_id, update)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(user))
}

/// PUT /users/favorites
pub async fn update_favorites(
    State(state): State<AppState>,
    Auth(identity): Auth,
    ValidatedJson(request): ValidatedJson<FavoritesRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .store()
        .update_favorites(&identity.user_id, request.favorites)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    tracing::info!(user_id = %user.id, count = user.favorites.len(), "Favorites updated");

    Ok(Json(user))
}
