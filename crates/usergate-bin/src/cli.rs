// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the service (default)
//! - `validate`: Validate the environment configuration
//! - `version`: Show version information
//! - `issue-token`: Mint a token with the configured private key
//! - `verify-token`: Verify a token with the configured public key

use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};
use usergate_api::auth::Permission;

// =============================================================================
// Main CLI Structure
// =============================================================================

/// usergate - authorization gate for the user-profile API
///
/// Configuration is read from the environment (`PORT`, `MYSQL_*`,
/// `PRIVATE_KEY`, `PUBLIC_KEY`, `JWT_*`, ...).
#[derive(Parser, Debug)]
#[command(
    name = "usergate",
    author = "Sylvex <contact@sylvex.io>",
    version = usergate_api::VERSION,
    about = "Authorization gate for the usergate user-profile API",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        default_value = "info",
        env = "USERGATE_LOG_LEVEL",
        global = true
    )]
    pub log_level: String,

    /// Log format (text, json, compact)
    #[arg(long, default_value = "text", env = "USERGATE_LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the API server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration
    ///
    /// Loads the environment configuration and key material without
    /// starting the server.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Issue a signed token
    ///
    /// Mints a token for a subject with the configured private key.
    #[command(name = "issue-token")]
    IssueToken(IssueTokenArgs),

    /// Verify a token
    ///
    /// Checks a token against the configured public key and prints the
    /// identity it carries.
    #[command(name = "verify-token")]
    VerifyToken(VerifyTokenArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Bind address, overriding USERGATE_HOST
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Listen port, overriding PORT
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Print the configuration (secrets redacted) after validation
    #[arg(short, long)]
    pub show_config: bool,
}

/// Arguments for the `issue-token` command.
#[derive(Args, Debug, Clone)]
pub struct IssueTokenArgs {
    /// Token subject (user id)
    pub subject: String,

    /// Permission to grant; repeatable
    #[arg(short, long = "permission", value_parser = parse_permission, required = true)]
    pub permissions: Vec<Permission>,

    /// Token lifetime in seconds (default: JWT_EXPIRATION_SECS)
    #[arg(long)]
    pub ttl_secs: Option<u64>,
}

/// Arguments for the `verify-token` command.
#[derive(Args, Debug, Clone)]
pub struct VerifyTokenArgs {
    /// The token to verify
    pub token: String,
}

fn parse_permission(raw: &str) -> Result<Permission, String> {
    Permission::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = Permission::all().iter().map(Permission::as_str).collect();
        format!("unknown permission '{}' (expected one of {})", raw, known.join(", "))
    })
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Get the effective log level based on flags.
    pub fn effective_log_level(&self) -> &str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            &self.log_level
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
