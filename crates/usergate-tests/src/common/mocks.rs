// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! Collaborators for injecting failures and recording interactions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use usergate_api::accounts::{AccountError, AccountVerifier, VerifiedAccount};
use usergate_api::auth::{AuthError, Identity, TokenVerifier};
use usergate_api::store::{Page, ProfileUpdate, StoreError, StoreResult, User, UserStore};

// =============================================================================
// Counting Verifier
// =============================================================================

/// Token verifier that counts how often it is asked.
pub struct CountingVerifier {
    inner: Arc<dyn TokenVerifier>,
    calls: AtomicU64,
}

impl CountingVerifier {
    /// Wraps a real verifier.
    pub fn new(inner: Arc<dyn TokenVerifier>) -> Self {
        Self {
            inner,
            calls: AtomicU64::new(0),
        }
    }

    /// Number of tokens presented so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TokenVerifier for CountingVerifier {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(token)
    }
}

// =============================================================================
// Unavailable Store
// =============================================================================

/// A user store whose backend is down.
#[derive(Debug, Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn error<T>() -> StoreResult<T> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

#[async_trait]
impl UserStore for UnavailableStore {
    async fn find_user(&self, _id: &str) -> StoreResult<Option<User>> {
        Self::error()
    }

    async fn find_users(&self, _offset: usize, _limit: usize) -> StoreResult<Page<User>> {
        Self::error()
    }

    async fn search_users(
        &self,
        _query: &str,
        _offset: usize,
        _limit: usize,
    ) -> StoreResult<Page<User>> {
        Self::error()
    }

    async fn find_or_create_by_account(&self, _account_id: &str) -> StoreResult<User> {
        Self::error()
    }

    async fn update_profile(
        &self,
        _id: &str,
        _update: ProfileUpdate,
    ) -> StoreResult<Option<User>> {
        Self::error()
    }

    async fn update_favorites(
        &self,
        _id: &str,
        _favorites: Vec<String>,
    ) -> StoreResult<Option<User>> {
        Self::error()
    }

    async fn is_connected(&self) -> bool {
        false
    }
}

// =============================================================================
// Mock Account Verifier
// =============================================================================

/// How a [`MockAccountVerifier`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountBehavior {
    /// Every code verifies as the account of the same name.
    Accept,
    /// Every code is refused.
    Reject,
    /// The provider cannot be reached.
    Unavailable,
}

/// Account verifier with fixed behavior that records the codes it sees.
#[derive(Debug)]
pub struct MockAccountVerifier {
    behavior: AccountBehavior,
    seen: Mutex<Vec<String>>,
}

impl MockAccountVerifier {
    /// Creates a verifier with the given behavior.
    pub fn new(behavior: AccountBehavior) -> Self {
        Self {
            behavior,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Codes presented so far, in order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl AccountVerifier for MockAccountVerifier {
    async fn verify_code(&self, access_code: &str) -> Result<VerifiedAccount, AccountError> {
        self.seen.lock().push(access_code.to_string());

        match self.behavior {
            AccountBehavior::Accept => Ok(VerifiedAccount {
                account_id: access_code.to_string(),
            }),
            AccountBehavior::Reject => Err(AccountError::Rejected("code expired".to_string())),
            AccountBehavior::Unavailable => {
                Err(AccountError::Unavailable("provider timeout".to_string()))
            }
        }
    }
}
