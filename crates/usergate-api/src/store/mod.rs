// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! User record storage.
//!
//! Handlers reach user records only through the [`UserStore`] trait.
//! [`MemoryUserStore`] is the bundled implementation.

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;

pub use memory::MemoryUserStore;

// =============================================================================
// Types
// =============================================================================

/// A user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: String,
    /// Verified social login account the user signed up with.
    pub account_id: String,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Email address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Profile picture URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Favorite item identifiers.
    #[serde(default)]
    pub favorites: Vec<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new record for a verified account.
    pub fn new(id: impl Into<String>, account_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            account_id: account_id.into(),
            name: None,
            email: None,
            picture: None,
            favorites: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New display name.
    pub name: Option<String>,
    /// New email address.
    pub email: Option<String>,
    /// New profile picture URL.
    pub picture: Option<String>,
}

impl ProfileUpdate {
    /// Returns `true` if no field would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.picture.is_none()
    }

    pub(crate) fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = Some(name);
        }
        if let Some(email) = self.email {
            user.email = Some(email);
        }
        if let Some(picture) = self.picture {
            user.picture = Some(picture);
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Records on this page.
    pub items: Vec<T>,
    /// Total matching records.
    pub total: usize,
}

// =============================================================================
// StoreError
// =============================================================================

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// User store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the operation.
    #[error("store query failed: {0}")]
    Query(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(message) => ApiError::service_unavailable(message),
            StoreError::Query(message) => ApiError::internal(message),
        }
    }
}

// =============================================================================
// UserStore
// =============================================================================

/// Access to user records.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by id.
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;

    /// Returns a page of users ordered by id.
    async fn find_users(&self, offset: usize, limit: usize) -> StoreResult<Page<User>>;

    /// Returns a page of users whose name or email contains `query`,
    /// case-insensitively.
    async fn search_users(&self, query: &str, offset: usize, limit: usize)
        -> StoreResult<Page<User>>;

    /// Returns the user linked to a verified account, creating one if needed.
    async fn find_or_create_by_account(&self, account_id: &str) -> StoreResult<User>;

    /// Applies a profile update. Returns `None` if the user does not exist.
    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> StoreResult<Option<User>>;

    /// Replaces a user's favorites. Returns `None` if the user does not exist.
    async fn update_favorites(&self, id: &str, favorites: Vec<String>)
        -> StoreResult<Option<User>>;

    /// Returns `true` if the store is reachable.
    async fn is_connected(&self) -> bool;
}
