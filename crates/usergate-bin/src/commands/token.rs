// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `issue-token` and `verify-token` commands.

use std::time::Duration;

use usergate_api::auth::{Identity, IssuedToken, TokenComposer};
use usergate_api::ServiceConfig;

use crate::cli::{Cli, IssueTokenArgs, VerifyTokenArgs};
use crate::error::BinResult;

/// Executes the `issue-token` command.
///
/// Prints the token on stdout and its claims on stderr, so the token can be
/// piped.
pub fn issue_token(_cli: &Cli, args: IssueTokenArgs) -> BinResult<()> {
    let composer = composer_from_env()?;
    let issued = issue(&composer, &args)?;

    println!("{}", issued.token);
    eprintln!("subject:     {}", issued.claims.sub);
    eprintln!("permissions: {}", issued.claims.permissions.names().join(", "));
    if let Some(expires_at) = issued.claims.expires_at() {
        eprintln!("expires at:  {}", expires_at.to_rfc3339());
    }

    Ok(())
}

/// Executes the `verify-token` command.
///
/// Prints the carried identity as JSON, or fails with the verification
/// failure class.
pub fn verify_token(_cli: &Cli, args: VerifyTokenArgs) -> BinResult<()> {
    let composer = composer_from_env()?;
    let identity = verify(&composer, &args)?;

    println!("{}", serde_json::to_string_pretty(&identity)?);
    if let Some(expires_at) = identity.expires_at_time() {
        eprintln!("valid until: {}", expires_at.to_rfc3339());
    }
    Ok(())
}

fn composer_from_env() -> BinResult<TokenComposer> {
    let config = ServiceConfig::from_env()?;
    Ok(TokenComposer::new(config.token)?)
}

fn issue(composer: &TokenComposer, args: &IssueTokenArgs) -> BinResult<IssuedToken> {
    let ttl = args
        .ttl_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| composer.default_ttl());

    Ok(composer.issue(&args.subject, args.permissions.iter().copied(), ttl)?)
}

fn verify(composer: &TokenComposer, args: &VerifyTokenArgs) -> BinResult<Identity> {
    Ok(composer.verify(args.token.trim())?)
}
