// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The user service's route declarations.

use axum::http::Method;

use super::router::DispatchRouter;
use super::table::RouteRequirement;
use crate::auth::Permission;
use crate::handlers;
use crate::state::AppState;

fn profile_scope() -> RouteRequirement {
    RouteRequirement::any_of([Permission::UsersProfile, Permission::UsersAll])
}

/// Declares every route of the user service.
pub fn user_routes() -> DispatchRouter<AppState> {
    DispatchRouter::new()
        .route(Method::GET, "/users/search", profile_scope(), handlers::search_users)
        .route(Method::GET, "/users/profile", profile_scope(), handlers::get_profile)
        .route(Method::GET, "/users/:id", profile_scope(), handlers::get_user)
        .route(Method::GET, "/users", profile_scope(), handlers::list_users)
        .route(Method::POST, "/users/login", RouteRequirement::public(), handlers::login)
        .route(Method::POST, "/users/logout", RouteRequirement::public(), handlers::logout)
        .route(Method::PUT, "/users/profile", profile_scope(), handlers::update_profile)
        .route(
            Method::PUT,
            "/users/favorites",
            RouteRequirement::any_of([Permission::UsersAll]),
            handlers::update_favorites,
        )
        .route(
            Method::OPTIONS,
            "/*",
            RouteRequirement::ungated(),
            handlers::capabilities,
        )
}
