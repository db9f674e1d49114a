// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Token Integration Tests
//!
//! Issuing and verifying tokens through the public composer API.
//!
//! - `test_token_*`: issue and verify round trips
//! - `test_reject_*`: verification failure classes
//! - `test_config_*`: key configuration handling

use std::time::Duration;

use usergate_api::auth::{AuthError, Claims, PermissionSet, TokenComposer, TokenConfig};
use usergate_api::error::ConfigurationError;
use usergate_tests::prelude::*;

fn composer(config: TokenConfig) -> TokenComposer {
    TokenComposer::new(config).expect("composer builds")
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn test_token_carries_subject_and_permissions() {
    let composer = composer(TokenFixtures::rsa());
    let issued = composer
        .issue(
            "42",
            [Permission::UsersProfile, Permission::UsersAll],
            Duration::from_secs(600),
        )
        .unwrap();

    assert_eq!(issued.token.split('.').count(), 3);
    assert_eq!(issued.expires_in(), 600);

    let identity = composer.verify(&issued.token).unwrap();
    assert_eq!(identity.user_id, "42");
    assert!(identity.has_permission(Permission::UsersProfile));
    assert!(identity.has_permission(Permission::UsersAll));
    assert_eq!(identity.expires_at, issued.claims.exp);
}

#[test]
fn test_token_with_no_permissions_verifies() {
    let composer = composer(TokenFixtures::rsa());
    let issued = composer
        .issue("7", Vec::<Permission>::new(), Duration::from_secs(60))
        .unwrap();

    let identity = composer.verify(&issued.token).unwrap();
    assert!(identity.permissions.is_empty());
}

#[test]
fn test_token_default_lifetime() {
    let composer = composer(TokenFixtures::short_lived(Duration::from_secs(90)));
    let issued = composer
        .issue_default("1", [Permission::UsersProfile])
        .unwrap();
    assert_eq!(issued.expires_in(), 90);
}

#[test]
fn test_token_issuer_recorded() {
    let composer = composer(TokenFixtures::rsa().with_issuer("profiles"));
    let issued = composer
        .issue("1", [Permission::UsersProfile], Duration::from_secs(60))
        .unwrap();
    assert_eq!(issued.claims.iss.as_deref(), Some("profiles"));
}

#[test]
fn test_token_eddsa_round_trip() {
    let composer = composer(TokenFixtures::ed25519());
    let issued = composer
        .issue("5", [Permission::UsersAll], Duration::from_secs(60))
        .unwrap();

    let identity = composer.verify(&issued.token).unwrap();
    assert_eq!(identity.user_id, "5");
}

#[test]
fn test_token_verified_by_separate_verify_only_instance() {
    let signer = composer(TokenFixtures::rsa());
    let verifier = composer(TokenFixtures::verify_only());

    let issued = signer
        .issue("9", [Permission::UsersProfile], Duration::from_secs(60))
        .unwrap();
    assert_eq!(verifier.verify(&issued.token).unwrap().user_id, "9");
}

#[test]
fn test_token_lifetime_out_of_range() {
    let composer = composer(TokenFixtures::rsa());

    for ttl in [Duration::from_secs(u64::MAX), Duration::from_secs(i64::MAX as u64)] {
        match composer.issue("42", [Permission::UsersProfile], ttl) {
            Err(ConfigurationError::InvalidValue { key, .. }) => assert_eq!(key, "ttl"),
            other => panic!("{:?} gave {:?}", ttl, other),
        }
    }

    let ttl = Duration::from_secs(i64::MAX as u64 / 2);
    let issued = composer.issue("42", [Permission::UsersProfile], ttl).unwrap();
    assert_eq!(composer.verify(&issued.token).unwrap().user_id, "42");
}

// =============================================================================
// Rejections
// =============================================================================

#[test]
fn test_reject_foreign_signature() {
    let foreign = composer(TokenFixtures::foreign_rsa());
    let trusted = trusted_composer();

    let issued = foreign
        .issue("1", [Permission::UsersAll], Duration::from_secs(60))
        .unwrap();
    assert!(matches!(
        trusted.verify(&issued.token),
        Err(AuthError::BadSignature)
    ));
}

#[test]
fn test_reject_expired() {
    let composer = trusted_composer();
    let token = composer
        .sign(&Claims::new("1", [Permission::UsersProfile], -5))
        .unwrap();

    assert!(matches!(
        composer.verify(&token),
        Err(AuthError::Expired { .. })
    ));
}

#[test]
fn test_reject_tampered_payload() {
    let composer = trusted_composer();
    let issued = composer
        .issue("1", [Permission::UsersProfile], Duration::from_secs(60))
        .unwrap();

    let mut forged = issued.claims.clone();
    forged.permissions = PermissionSet::from_permissions([Permission::UsersAll]);
    let forged_payload = {
        let other = composer.sign(&forged).unwrap();
        other.split('.').nth(1).unwrap().to_string()
    };

    let parts: Vec<&str> = issued.token.split('.').collect();
    let tampered = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

    assert!(matches!(
        composer.verify(&tampered),
        Err(AuthError::BadSignature)
    ));
}

#[test]
fn test_reject_garbage() {
    let composer = trusted_composer();
    for token in ["", "abc", "a.b", "a.b.c"] {
        let err = composer.verify(token).unwrap_err();
        assert!(
            !err.is_configuration(),
            "{:?} misclassified as configuration",
            token
        );
    }
}

// =============================================================================
// Key Configuration
// =============================================================================

#[test]
fn test_config_missing_public_key() {
    let composer = composer(TokenFixtures::sign_only());
    let issued = composer
        .issue("1", [Permission::UsersProfile], Duration::from_secs(60))
        .unwrap();

    let err = composer.verify(&issued.token).unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_config_missing_private_key() {
    let composer = composer(TokenFixtures::verify_only());
    assert!(matches!(
        composer.issue("1", [Permission::UsersProfile], Duration::from_secs(60)),
        Err(ConfigurationError::MissingPrivateKey)
    ));
}

#[test]
fn test_config_rejects_unparseable_key() {
    let result = TokenComposer::new(TokenConfig::new("not a key", RSA_PUBLIC));
    assert!(matches!(
        result,
        Err(ConfigurationError::InvalidKey { .. })
    ));
}

#[test]
fn test_config_rejects_symmetric_algorithm() {
    let config = TokenFixtures::rsa().with_algorithm(jsonwebtoken::Algorithm::HS256);
    assert!(matches!(
        TokenComposer::new(config),
        Err(ConfigurationError::UnsupportedAlgorithm { .. })
    ));
}
