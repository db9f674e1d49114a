// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Key material, configurations and users shared across the suites.
//! The PEM files live in `testdata/keys` at the workspace root.

use std::time::Duration;

use jsonwebtoken::Algorithm;
use usergate_api::auth::TokenConfig;
use usergate_api::config::CorsConfig;
use usergate_api::store::{MemoryUserStore, User};
use usergate_api::ServiceConfig;

// =============================================================================
// Key Fixtures
// =============================================================================

/// RSA private key the service signs with.
pub const RSA_PRIVATE: &str = include_str!("../../../../testdata/keys/rsa_private.pem");

/// Public half of [`RSA_PRIVATE`].
pub const RSA_PUBLIC: &str = include_str!("../../../../testdata/keys/rsa_public.pem");

/// An unrelated RSA private key.
pub const RSA_OTHER_PRIVATE: &str =
    include_str!("../../../../testdata/keys/rsa_other_private.pem");

/// Public half of [`RSA_OTHER_PRIVATE`].
pub const RSA_OTHER_PUBLIC: &str = include_str!("../../../../testdata/keys/rsa_other_public.pem");

/// Ed25519 private key.
pub const ED25519_PRIVATE: &str = include_str!("../../../../testdata/keys/ed25519_private.pem");

/// Public half of [`ED25519_PRIVATE`].
pub const ED25519_PUBLIC: &str = include_str!("../../../../testdata/keys/ed25519_public.pem");

// =============================================================================
// Token Fixtures
// =============================================================================

/// Token configurations.
pub struct TokenFixtures;

impl TokenFixtures {
    /// The service's RS256 key pair.
    pub fn rsa() -> TokenConfig {
        TokenConfig::new(RSA_PRIVATE, RSA_PUBLIC)
    }

    /// A key pair the service does not trust.
    pub fn foreign_rsa() -> TokenConfig {
        TokenConfig::new(RSA_OTHER_PRIVATE, RSA_OTHER_PUBLIC)
    }

    /// An EdDSA key pair.
    pub fn ed25519() -> TokenConfig {
        TokenConfig::new(ED25519_PRIVATE, ED25519_PUBLIC).with_algorithm(Algorithm::EdDSA)
    }

    /// The service's public key only.
    pub fn verify_only() -> TokenConfig {
        TokenConfig::verify_only(RSA_PUBLIC)
    }

    /// The service's private key only.
    pub fn sign_only() -> TokenConfig {
        TokenConfig {
            private_key: Some(RSA_PRIVATE.to_string()),
            ..TokenConfig::default()
        }
    }

    /// The service's key pair with a short default lifetime.
    pub fn short_lived(ttl: Duration) -> TokenConfig {
        Self::rsa().with_expiration(ttl)
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// Service configurations.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// Default configuration with the service's key pair.
    pub fn service() -> ServiceConfig {
        ServiceConfig::default().with_token(TokenFixtures::rsa())
    }

    /// Configuration with a CORS origin allowlist.
    pub fn strict_cors(origins: &[&str]) -> ServiceConfig {
        Self::service().with_cors(CorsConfig::strict(
            origins.iter().map(|o| o.to_string()).collect(),
        ))
    }
}

// =============================================================================
// User Fixtures
// =============================================================================

/// Seeded user records.
pub struct UserFixtures;

impl UserFixtures {
    /// User 1.
    pub fn alice() -> User {
        User::new("1", "fb-alice")
            .with_name("Alice Archer")
            .with_email("alice@example.com")
    }

    /// User 2.
    pub fn bob() -> User {
        User::new("2", "fb-bob")
            .with_name("Bob Baker")
            .with_email("bob@example.org")
    }

    /// User 3.
    pub fn carol() -> User {
        User::new("3", "fb-carol")
            .with_name("Carol Chen")
            .with_email("carol@example.com")
    }

    /// Alice, Bob and Carol.
    pub fn trio() -> Vec<User> {
        vec![Self::alice(), Self::bob(), Self::carol()]
    }

    /// `count` numbered users with ids starting at 1.
    pub fn batch(count: usize) -> Vec<User> {
        (1..=count)
            .map(|i| {
                User::new(i.to_string(), format!("fb-{:03}", i))
                    .with_name(format!("User {:03}", i))
            })
            .collect()
    }

    /// A store seeded with [`UserFixtures::trio`].
    pub fn store() -> MemoryUserStore {
        MemoryUserStore::with_users(Self::trio())
    }
}
