// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Token issuance and verification.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::error::AuthError;
use super::identity::Identity;
use super::permission::Permission;
use super::Claims;
use crate::error::{ConfigurationError, KeyRole};

// =============================================================================
// TokenConfig
// =============================================================================

/// Token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// PEM private key used to sign tokens.
    #[serde(skip_serializing)]
    pub private_key: Option<String>,
    /// PEM public key used to verify tokens.
    #[serde(skip_serializing)]
    pub public_key: Option<String>,
    /// Token issuer.
    pub issuer: String,
    /// Default token lifetime in seconds.
    pub expiration_secs: i64,
    /// Algorithm to use for signing.
    #[serde(with = "algorithm_serde")]
    pub algorithm: Algorithm,
    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            public_key: None,
            issuer: "usergate".to_string(),
            expiration_secs: 86400, // 1 day
            algorithm: Algorithm::RS256,
            leeway_secs: 0,
        }
    }
}

impl TokenConfig {
    /// Creates a configuration with both halves of a key pair.
    pub fn new(private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            private_key: Some(private_key.into()),
            public_key: Some(public_key.into()),
            ..Default::default()
        }
    }

    /// Creates a verify-only configuration.
    pub fn verify_only(public_key: impl Into<String>) -> Self {
        Self {
            public_key: Some(public_key.into()),
            ..Default::default()
        }
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Sets the default token lifetime.
    pub fn with_expiration(mut self, duration: Duration) -> Self {
        self.expiration_secs = duration.as_secs() as i64;
        self
    }

    /// Returns `true` if a private key is present.
    pub fn can_sign(&self) -> bool {
        present(&self.private_key).is_some()
    }

    /// Returns `true` if a public key is present.
    pub fn can_verify(&self) -> bool {
        present(&self.public_key).is_some()
    }

    /// Validates the configuration for a process that must both issue and
    /// verify tokens.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.can_sign() {
            return Err(ConfigurationError::MissingPrivateKey);
        }
        if !self.can_verify() {
            return Err(ConfigurationError::MissingPublicKey);
        }
        if self.expiration_secs <= 0 {
            return Err(ConfigurationError::invalid(
                "JWT_EXPIRATION_SECS",
                "token lifetime must be positive",
            ));
        }
        key_family(self.algorithm)?;
        Ok(())
    }
}

fn present(key: &Option<String>) -> Option<&str> {
    key.as_deref().filter(|k| !k.trim().is_empty())
}

// =============================================================================
// TokenVerifier
// =============================================================================

/// Verifies raw bearer tokens into identities.
///
/// The auth gate depends on this trait rather than on [`TokenComposer`] so the
/// chain can be exercised without key material.
pub trait TokenVerifier: Send + Sync {
    /// Verifies a raw token.
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

// =============================================================================
// IssuedToken
// =============================================================================

/// A freshly signed token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Serialized token.
    pub token: String,
    /// Claims embedded in the token.
    pub claims: Claims,
}

impl IssuedToken {
    /// Seconds from issuance to expiry.
    pub fn expires_in(&self) -> i64 {
        self.claims.exp - self.claims.iat
    }
}

// =============================================================================
// TokenComposer
// =============================================================================

/// Creates and verifies signed, expiring tokens.
///
/// Built once at startup and shared read-only. Either key may be absent:
/// signing then fails with [`ConfigurationError::MissingPrivateKey`] and
/// verification with [`ConfigurationError::MissingPublicKey`].
#[derive(Clone)]
pub struct TokenComposer {
    config: Arc<TokenConfig>,
    encoding_key: Option<Arc<EncodingKey>>,
    decoding_key: Option<Arc<DecodingKey>>,
    validation: Arc<Validation>,
}

impl TokenComposer {
    /// Creates a composer from the given configuration.
    ///
    /// Fails if a configured key cannot be parsed for the configured
    /// algorithm, or if the algorithm is not asymmetric.
    pub fn new(config: TokenConfig) -> Result<Self, ConfigurationError> {
        let family = key_family(config.algorithm)?;

        let encoding_key = present(&config.private_key)
            .map(|pem| family.encoding_key(pem.as_bytes()))
            .transpose()
            .map_err(|e| ConfigurationError::invalid_key(KeyRole::Private, e.to_string()))?;

        let decoding_key = present(&config.public_key)
            .map(|pem| family.decoding_key(pem.as_bytes()))
            .transpose()
            .map_err(|e| ConfigurationError::invalid_key(KeyRole::Public, e.to_string()))?;

        if encoding_key.is_none() {
            tracing::warn!("No private key configured, token signing is disabled");
        }
        if decoding_key.is_none() {
            tracing::warn!("No public key configured, token verification is disabled");
        }

        // Expiry is checked after the signature so an expired token with a
        // valid signature is reported as expired rather than malformed.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            config: Arc::new(config),
            encoding_key: encoding_key.map(Arc::new),
            decoding_key: decoding_key.map(Arc::new),
            validation: Arc::new(validation),
        })
    }

    /// Signs the given claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, ConfigurationError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or(ConfigurationError::MissingPrivateKey)?;

        encode(&Header::new(self.config.algorithm), claims, key)
            .map_err(|e| ConfigurationError::invalid_key(KeyRole::Private, e.to_string()))
    }

    /// Issues a token binding `subject` to `permissions` for `ttl`.
    ///
    /// Fails if the expiry would not fit in a timestamp.
    pub fn issue(
        &self,
        subject: &str,
        permissions: impl IntoIterator<Item = Permission>,
        ttl: Duration,
    ) -> Result<IssuedToken, ConfigurationError> {
        let claims = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| Claims::try_new(subject, permissions, secs))
            .ok_or_else(|| {
                ConfigurationError::invalid(
                    "ttl",
                    format!("token lifetime of {}s is out of range", ttl.as_secs()),
                )
            })?
            .with_issuer(&self.config.issuer);
        let token = self.sign(&claims)?;

        tracing::debug!(
            subject = %subject,
            permissions = ?claims.permissions.names(),
            expires_at = claims.exp,
            "Token issued"
        );

        Ok(IssuedToken { token, claims })
    }

    /// Issues a token with the configured default lifetime.
    pub fn issue_default(
        &self,
        subject: &str,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Result<IssuedToken, ConfigurationError> {
        self.issue(subject, permissions, self.default_ttl())
    }

    /// Verifies a raw token and returns the identity it carries.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let key = self
            .decoding_key
            .as_ref()
            .ok_or(ConfigurationError::MissingPublicKey)?;

        let claims = decode::<Claims>(token, key, &self.validation)?.claims;

        if claims.is_expired_at(Utc::now().timestamp(), self.config.leeway_secs) {
            return Err(AuthError::Expired {
                expired_at: claims.exp,
            });
        }

        Ok(Identity::from_claims(&claims))
    }

    /// Returns the default token lifetime.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.config.expiration_secs.max(0) as u64)
    }

    /// Returns `true` if tokens can be issued.
    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    /// Returns `true` if tokens can be verified.
    pub fn can_verify(&self) -> bool {
        self.decoding_key.is_some()
    }

    /// Returns the signing algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.config.algorithm
    }
}

impl TokenVerifier for TokenComposer {
    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        TokenComposer::verify(self, token)
    }
}

impl std::fmt::Debug for TokenComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenComposer")
            .field("issuer", &self.config.issuer)
            .field("algorithm", &self.config.algorithm)
            .field("can_sign", &self.can_sign())
            .field("can_verify", &self.can_verify())
            .finish()
    }
}

// =============================================================================
// Key Families
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum KeyFamily {
    Rsa,
    Ec,
    Ed,
}

impl KeyFamily {
    fn encoding_key(self, pem: &[u8]) -> jsonwebtoken::errors::Result<EncodingKey> {
        match self {
            KeyFamily::Rsa => EncodingKey::from_rsa_pem(pem),
            KeyFamily::Ec => EncodingKey::from_ec_pem(pem),
            KeyFamily::Ed => EncodingKey::from_ed_pem(pem),
        }
    }

    fn decoding_key(self, pem: &[u8]) -> jsonwebtoken::errors::Result<DecodingKey> {
        match self {
            KeyFamily::Rsa => DecodingKey::from_rsa_pem(pem),
            KeyFamily::Ec => DecodingKey::from_ec_pem(pem),
            KeyFamily::Ed => DecodingKey::from_ed_pem(pem),
        }
    }
}

fn key_family(algorithm: Algorithm) -> Result<KeyFamily, ConfigurationError> {
    match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => Ok(KeyFamily::Rsa),
        Algorithm::ES256 | Algorithm::ES384 => Ok(KeyFamily::Ec),
        Algorithm::EdDSA => Ok(KeyFamily::Ed),
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Err(ConfigurationError::UnsupportedAlgorithm {
                algorithm: format!("{:?}", algorithm),
            })
        }
    }
}

// =============================================================================
// Algorithm Serialization
// =============================================================================

mod algorithm_serde {
    use jsonwebtoken::Algorithm;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(algorithm: &Algorithm, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        format!("{:?}", algorithm).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Algorithm, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Algorithm>()
            .map_err(|_| serde::de::Error::custom(format!("Unknown algorithm: {}", s)))
    }
}

// =============================================================================
// Tests
// =============================================================================
