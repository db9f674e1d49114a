// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use usergate_api::auth::TokenComposer;
use usergate_api::ServiceConfig;

use crate::cli::{Cli, ValidateArgs};
use crate::error::BinResult;

/// Executes the `validate` command.
///
/// Loads the environment configuration, checks it and parses the key
/// material, without binding a socket.
pub fn validate(_cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config = ServiceConfig::from_env()?;
    let warnings = check(&config)?;

    println!("✓ Configuration is valid");
    println!();
    println!("Summary:");
    println!("  Listen:     {}", config.socket_addr());
    println!("  Database:   {}", config.database);
    println!("  Algorithm:  {:?}", config.token.algorithm);
    println!("  Issuer:     {}", config.token.issuer);
    println!("  Lifetime:   {}s", config.token.expiration_secs);

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &warnings {
            println!("  ⚠ {}", warning);
        }
    }

    if args.show_config {
        println!();
        println!("{}", serde_json::to_string_pretty(&config)?);
    }

    Ok(())
}

/// Validates `config` and its keys, returning non-fatal findings.
fn check(config: &ServiceConfig) -> BinResult<Vec<String>> {
    config.validate()?;
    TokenComposer::new(config.token.clone())?;

    let mut warnings = Vec::new();
    if config.social_login.app_id.is_none() {
        warnings.push("FACEBOOK_APP_ID is not set".to_string());
    }
    if config.cors.allows_any_origin() {
        warnings.push("CORS allows any origin".to_string());
    }
    Ok(warnings)
}
