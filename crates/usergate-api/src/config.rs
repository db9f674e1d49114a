// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Service configuration.
//!
//! Configuration is read once at startup from the process environment and
//! then shared read-only. [`ServiceConfig::from_lookup`] takes any lookup
//! function so loading can be exercised without touching process state.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::auth::{Permission, TokenConfig};
use crate::error::ConfigurationError;

// =============================================================================
// Environment Keys
// =============================================================================

/// Environment variable names.
pub mod env {
    /// Bind address.
    pub const HOST: &str = "USERGATE_HOST";
    /// Bind port.
    pub const PORT: &str = "PORT";
    /// Database host.
    pub const MYSQL_HOST: &str = "MYSQL_HOST";
    /// Database port.
    pub const MYSQL_PORT: &str = "MYSQL_PORT";
    /// Database user.
    pub const MYSQL_USER: &str = "MYSQL_USER";
    /// Database password.
    pub const MYSQL_PASSWORD: &str = "MYSQL_PASSWORD";
    /// Database name.
    pub const MYSQL_DATABASE: &str = "MYSQL_DATABASE";
    /// Database connection pool size.
    pub const MYSQL_POOL_SIZE: &str = "MYSQL_POOL_SIZE";
    /// Social login application id.
    pub const FACEBOOK_APP_ID: &str = "FACEBOOK_APP_ID";
    /// Social login application secret.
    pub const ACCOUNT_KIT_APP_SECRET: &str = "ACCOUNT_KIT_APP_SECRET";
    /// PEM private key used to sign tokens.
    pub const PRIVATE_KEY: &str = "PRIVATE_KEY";
    /// PEM public key used to verify tokens.
    pub const PUBLIC_KEY: &str = "PUBLIC_KEY";
    /// Token signing algorithm.
    pub const JWT_ALGORITHM: &str = "JWT_ALGORITHM";
    /// Token issuer.
    pub const JWT_ISSUER: &str = "JWT_ISSUER";
    /// Default token lifetime in seconds.
    pub const JWT_EXPIRATION_SECS: &str = "JWT_EXPIRATION_SECS";
}

// =============================================================================
// ServiceConfig
// =============================================================================

/// Configuration for the whole service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// User store connection settings.
    pub database: DatabaseConfig,
    /// Social login provider settings.
    pub social_login: SocialLoginConfig,
    /// Token signing settings.
    pub token: TokenConfig,
    /// CORS settings.
    pub cors: CorsConfig,
    /// Login settings.
    pub login: LoginConfig,
}

impl ServiceConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through the given lookup function.
    ///
    /// Unset variables fall back to defaults. Set but malformed variables are
    /// errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: parse_or(&var, env::HOST, defaults.server.host)?,
            port: parse_or(&var, env::PORT, defaults.server.port)?,
            ..defaults.server
        };

        let database = DatabaseConfig {
            host: var(env::MYSQL_HOST).unwrap_or(defaults.database.host),
            port: parse_or(&var, env::MYSQL_PORT, defaults.database.port)?,
            user: var(env::MYSQL_USER).unwrap_or(defaults.database.user),
            password: var(env::MYSQL_PASSWORD).unwrap_or(defaults.database.password),
            name: var(env::MYSQL_DATABASE).unwrap_or(defaults.database.name),
            pool_size: parse_or(&var, env::MYSQL_POOL_SIZE, defaults.database.pool_size)?,
        };

        let social_login = SocialLoginConfig {
            app_id: var(env::FACEBOOK_APP_ID),
            app_secret: var(env::ACCOUNT_KIT_APP_SECRET),
        };

        let algorithm = match var(env::JWT_ALGORITHM) {
            Some(raw) => Algorithm::from_str(raw.trim()).map_err(|_| {
                ConfigurationError::invalid(env::JWT_ALGORITHM, format!("unknown algorithm {}", raw))
            })?,
            None => defaults.token.algorithm,
        };

        let token = TokenConfig {
            private_key: var(env::PRIVATE_KEY).map(|k| normalize_key(&k)),
            public_key: var(env::PUBLIC_KEY).map(|k| normalize_key(&k)),
            issuer: var(env::JWT_ISSUER).unwrap_or(defaults.token.issuer),
            expiration_secs: parse_or(&var, env::JWT_EXPIRATION_SECS, defaults.token.expiration_secs)?,
            algorithm,
            leeway_secs: defaults.token.leeway_secs,
        };

        Ok(Self {
            server,
            database,
            social_login,
            token,
            cors: defaults.cors,
            login: defaults.login,
        })
    }

    /// Validates the configuration, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.token.validate()?;
        self.login.validate()?;
        Ok(())
    }

    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        self.server.socket_addr()
    }

    /// Sets the token configuration.
    pub fn with_token(mut self, token: TokenConfig) -> Self {
        self.token = token;
        self
    }

    /// Sets the CORS configuration.
    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T, ConfigurationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigurationError::invalid(key, format!("{:?}: {}", raw, e))),
        None => Ok(default),
    }
}

/// Replaces literal `\n` sequences with newlines.
///
/// Keys injected through single-line environment variables arrive escaped.
pub fn normalize_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

// =============================================================================
// ServerConfig
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: IpAddr,
    /// Server port.
    pub port: u16,
    /// Request timeout.
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,
    /// Graceful shutdown timeout.
    #[serde(with = "duration_secs")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
            request_timeout: Duration::from_secs(30),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind to.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Sets the host address.
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigurationError::invalid(
                "server.request_timeout",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// DatabaseConfig
// =============================================================================

/// User store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Database user.
    pub user: String,
    /// Database password.
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name.
    pub name: String,
    /// Connection pool size.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: "password".to_string(),
            name: "game_night".to_string(),
            pool_size: 10,
        }
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.pool_size == 0 {
            return Err(ConfigurationError::invalid(
                env::MYSQL_POOL_SIZE,
                "pool size must be at least 1",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}/{}", self.user, self.host, self.port, self.name)
    }
}

// =============================================================================
// SocialLoginConfig
// =============================================================================

/// Social login provider settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialLoginConfig {
    /// Provider application id.
    pub app_id: Option<String>,
    /// Provider application secret.
    #[serde(skip_serializing)]
    pub app_secret: Option<String>,
}

// =============================================================================
// CorsConfig
// =============================================================================

/// CORS (Cross-Origin Resource Sharing) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Allowed methods.
    pub allowed_methods: Vec<String>,
    /// Allowed headers.
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "PUT".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec![
                "Origin".to_string(),
                "X-Requested-With".to_string(),
                "Content-Type".to_string(),
                "Accept".to_string(),
                "Authorization".to_string(),
            ],
        }
    }
}

impl CorsConfig {
    /// Creates a configuration restricted to the given origins.
    pub fn strict(origins: Vec<String>) -> Self {
        Self {
            allowed_origins: origins,
            ..Default::default()
        }
    }

    /// Returns `true` if any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

// =============================================================================
// LoginConfig
// =============================================================================

/// Login settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Permissions granted to tokens issued at login.
    pub permissions: Vec<Permission>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            permissions: vec![Permission::UsersProfile, Permission::UsersAll],
        }
    }
}

impl LoginConfig {
    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.permissions.is_empty() {
            return Err(ConfigurationError::invalid(
                "login.permissions",
                "login must grant at least one permission",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Duration Serialization
// =============================================================================

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_from_empty_environment() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.host, "127.0.0.1");
        assert_eq!(config.database.port, 3306);
        assert_eq!(config.database.user, "root");
        assert_eq!(config.database.name, "game_night");
        assert_eq!(config.database.pool_size, 10);
        assert_eq!(config.token.algorithm, Algorithm::RS256);
        assert_eq!(config.token.issuer, "usergate");
        assert!(config.token.private_key.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            (env::PORT, "9090"),
            (env::HOST, "127.0.0.1"),
            (env::MYSQL_DATABASE, "users"),
            (env::JWT_ALGORITHM, "EdDSA"),
            (env::JWT_EXPIRATION_SECS, "600"),
            (env::FACEBOOK_APP_ID, "app"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:9090".parse().unwrap());
        assert_eq!(config.database.name, "users");
        assert_eq!(config.token.algorithm, Algorithm::EdDSA);
        assert_eq!(config.token.expiration_secs, 600);
        assert_eq!(config.social_login.app_id.as_deref(), Some("app"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = ServiceConfig::from_lookup(lookup(&[(env::PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { ref key, .. } if key == "PORT"));

        let err = ServiceConfig::from_lookup(lookup(&[(env::JWT_ALGORITHM, "XYZ")])).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }

    #[test]
    fn test_key_newlines_normalized() {
        let config = ServiceConfig::from_lookup(lookup(&[(
            env::PUBLIC_KEY,
            "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----",
        )]))
        .unwrap();

        let key = config.token.public_key.unwrap();
        assert_eq!(key.lines().count(), 3);
        assert!(!key.contains("\\n"));
    }

    #[test]
    fn test_blank_key_treated_as_absent() {
        let config = ServiceConfig::from_lookup(lookup(&[(env::PRIVATE_KEY, "  ")])).unwrap();
        assert!(config.token.private_key.is_none());
    }

    #[test]
    fn test_validate_requires_keys() {
        let config = ServiceConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingPrivateKey)
        ));
    }

    #[test]
    fn test_secrets_not_serialized() {
        let mut config = ServiceConfig::default();
        config.social_login.app_secret = Some("secret".to_string());
        config.token.private_key = Some("pem".to_string());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("pem"));
        assert!(!json.contains("password"));
    }

    #[test]
    fn test_cors_defaults() {
        let cors = CorsConfig::default();
        assert!(cors.allows_any_origin());
        assert!(!CorsConfig::strict(vec!["https://app.example".into()]).allows_any_origin());
    }
}
