// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Permission scopes carried by tokens.
//!
//! The set is closed: every scope a token may hold is a variant of
//! [`Permission`]. Subsumption between scopes lives in exactly one place,
//! [`Permission::implies`], and [`satisfies`] is the only authorization rule
//! the gate chain consults.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Scopes a token may grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Read and update the caller's own profile, read other profiles.
    #[serde(rename = "users:profile")]
    UsersProfile,
    /// Every user-scoped operation, including favorites.
    #[serde(rename = "users:all")]
    UsersAll,
}

impl Permission {
    /// Returns the permission name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UsersProfile => "users:profile",
            Permission::UsersAll => "users:all",
        }
    }

    /// Parses a permission from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "users:profile" | "UsersProfile" | "usersProfile" => Some(Permission::UsersProfile),
            "users:all" | "UsersAll" | "usersAll" => Some(Permission::UsersAll),
            _ => None,
        }
    }

    /// Returns all available permissions.
    pub fn all() -> &'static [Permission] {
        &[Permission::UsersProfile, Permission::UsersAll]
    }

    /// Returns `true` if holding `self` is enough to meet a requirement for `other`.
    pub fn implies(&self, other: Permission) -> bool {
        match self {
            Permission::UsersAll => true,
            Permission::UsersProfile => other == Permission::UsersProfile,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::parse(s).ok_or_else(|| format!("unknown permission: {}", s))
    }
}

// =============================================================================
// Permission Set
// =============================================================================

/// An ordered set of permissions.
///
/// Ordered so that serialized token payloads and capability listings are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Creates an empty permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a permission set from a list of permissions.
    pub fn from_permissions(permissions: impl IntoIterator<Item = Permission>) -> Self {
        Self {
            permissions: permissions.into_iter().collect(),
        }
    }

    /// Adds a permission to the set.
    pub fn add(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Returns `true` if the set contains the given permission.
    pub fn contains(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns the number of permissions in the set.
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }

    /// Returns an iterator over the permissions.
    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter()
    }

    /// Returns the permission names.
    pub fn names(&self) -> Vec<&'static str> {
        self.permissions.iter().map(Permission::as_str).collect()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self::from_permissions(iter)
    }
}

impl<'a> IntoIterator for &'a PermissionSet {
    type Item = &'a Permission;
    type IntoIter = std::collections::btree_set::Iter<'a, Permission>;

    fn into_iter(self) -> Self::IntoIter {
        self.permissions.iter()
    }
}

// =============================================================================
// Satisfaction
// =============================================================================

/// Returns `true` if `held` meets an any-of requirement `required`.
///
/// An empty requirement is met by any holder.
pub fn satisfies(held: &PermissionSet, required: &PermissionSet) -> bool {
    if required.is_empty() {
        return true;
    }
    required
        .iter()
        .any(|needed| held.iter().any(|granted| granted.implies(*needed)))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn set(perms: &[Permission]) -> PermissionSet {
        perms.iter().copied().collect()
    }

    #[test]
    fn test_permission_as_str() {
        assert_eq!(Permission::UsersProfile.as_str(), "users:profile");
        assert_eq!(Permission::UsersAll.as_str(), "users:all");
    }

    #[test]
    fn test_permission_parse() {
        assert_eq!(Permission::parse("users:profile"), Some(Permission::UsersProfile));
        assert_eq!(Permission::parse("usersAll"), Some(Permission::UsersAll));
        assert_eq!(Permission::parse("users:admin"), None);
        assert!("bogus".parse::<Permission>().is_err());
    }

    #[test]
    fn test_permission_serde_names() {
        let json = serde_json::to_string(&set(&[Permission::UsersAll, Permission::UsersProfile])).unwrap();
        assert_eq!(json, r#"["users:profile","users:all"]"#);

        let back: PermissionSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
    }

    #[test]
    fn test_implies_table() {
        assert!(Permission::UsersAll.implies(Permission::UsersAll));
        assert!(Permission::UsersAll.implies(Permission::UsersProfile));
        assert!(Permission::UsersProfile.implies(Permission::UsersProfile));
        assert!(!Permission::UsersProfile.implies(Permission::UsersAll));
    }

    #[test]
    fn test_satisfies_exhaustive() {
        use Permission::*;

        let subsets: Vec<PermissionSet> = vec![
            set(&[]),
            set(&[UsersProfile]),
            set(&[UsersAll]),
            set(&[UsersProfile, UsersAll]),
        ];

        for held in &subsets {
            for required in &subsets {
                let expected = required.is_empty()
                    || held.contains(UsersAll)
                    || (held.contains(UsersProfile) && required.contains(UsersProfile));
                assert_eq!(
                    satisfies(held, required),
                    expected,
                    "held={:?} required={:?}",
                    held.names(),
                    required.names()
                );
            }
        }
    }

    #[test]
    fn test_all_scope_satisfies_any_requirement() {
        let held = set(&[Permission::UsersAll]);
        assert!(satisfies(&held, &set(&[Permission::UsersProfile])));
        assert!(satisfies(&held, &set(&[Permission::UsersAll])));
    }

    #[test]
    fn test_profile_scope_not_enough_for_all_only() {
        let held = set(&[Permission::UsersProfile]);
        assert!(satisfies(&held, &set(&[Permission::UsersProfile, Permission::UsersAll])));
        assert!(!satisfies(&held, &set(&[Permission::UsersAll])));
    }

    #[test]
    fn test_empty_holder() {
        assert!(!satisfies(&PermissionSet::new(), &set(&[Permission::UsersProfile])));
        assert!(satisfies(&PermissionSet::new(), &PermissionSet::new()));
    }
}
