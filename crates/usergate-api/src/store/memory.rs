// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! In-memory user store.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use super::{Page, ProfileUpdate, StoreResult, User, UserStore};

#[derive(Debug, Default)]
struct Records {
    /// Users keyed by numeric id, so iteration order is id order.
    users: BTreeMap<u64, User>,
    /// Account id to user id.
    by_account: HashMap<String, u64>,
}

/// A [`UserStore`] kept in process memory.
///
/// Ids are assigned sequentially starting at 1. Data is lost when the store
/// is dropped.
#[derive(Debug)]
pub struct MemoryUserStore {
    records: RwLock<Records>,
    next_id: AtomicU64,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records::default()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a store seeded with the given users.
    ///
    /// Users whose id is not numeric are skipped.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.write();
            for user in users {
                let Ok(id) = user.id.parse::<u64>() else {
                    continue;
                };
                records.by_account.insert(user.account_id.clone(), id);
                records.users.insert(id, user);
            }
            let next = records.users.keys().next_back().map_or(1, |max| max + 1);
            store.next_id.store(next, Ordering::Relaxed);
        }
        store
    }

    /// Returns the number of stored users.
    pub fn len(&self) -> usize {
        self.records.read().users.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().users.is_empty()
    }

    fn paginate<'a>(
        users: impl Iterator<Item = &'a User>,
        offset: usize,
        limit: usize,
    ) -> Page<User> {
        let matching: Vec<&User> = users.collect();
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Page { items, total }
    }

    fn modify<F>(&self, id: &str, f: F) -> Option<User>
    where
        F: FnOnce(&mut User),
    {
        let id = id.parse::<u64>().ok()?;
        let mut records = self.records.write();
        let user = records.users.get_mut(&id)?;
        f(user);
        user.updated_at = Utc::now();
        Some(user.clone())
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        let Ok(id) = id.parse::<u64>() else {
            return Ok(None);
        };
        Ok(self.records.read().users.get(&id).cloned())
    }

    async fn find_users(&self, offset: usize, limit: usize) -> StoreResult<Page<User>> {
        let records = self.records.read();
        Ok(Self::paginate(records.users.values(), offset, limit))
    }

    async fn search_users(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> StoreResult<Page<User>> {
        let needle = query.trim().to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        };

        let records = self.records.read();
        let matching = records
            .users
            .values()
            .filter(|user| contains(&user.name) || contains(&user.email));
        Ok(Self::paginate(matching, offset, limit))
    }

    async fn find_or_create_by_account(&self, account_id: &str) -> StoreResult<User> {
        let mut records = self.records.write();

        if let Some(user) = records
            .by_account
            .get(account_id)
            .and_then(|id| records.users.get(id))
        {
            return Ok(user.clone());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let user = User::new(id.to_string(), account_id);
        records.by_account.insert(account_id.to_string(), id);
        records.users.insert(id, user.clone());

        debug!(user_id = id, "Created user for verified account");
        Ok(user)
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> StoreResult<Option<User>> {
        Ok(self.modify(id, |user| update.apply(user)))
    }

    async fn update_favorites(
        &self,
        id: &str,
        favorites: Vec<String>,
    ) -> StoreResult<Option<User>> {
        Ok(self.modify(id, |user| user.favorites = favorites))
    }

    async fn is_connected(&self) -> bool {
        true
    }
}

// =============================================================================
// Tests
// =============================================================================
