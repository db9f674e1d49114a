// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the API server
//! - `validate`: Validate the configuration
//! - `version`: Show version information
//! - `issue-token`: Mint a signed token
//! - `verify-token`: Verify a token

mod run;
mod token;
mod validate;
mod version;

pub use run::run;
pub use token::{issue_token, verify_token};
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::IssueToken(args) => token::issue_token(&cli, args),
        Commands::VerifyToken(args) => token::verify_token(&cli, args),
    }
}
