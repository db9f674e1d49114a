// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # usergate-bin
//!
//! CLI binary for the usergate service.
//!
//! - CLI argument parsing with clap
//! - Service runtime orchestration
//! - Graceful shutdown handling
//! - Logging initialization
//! - Operator commands (run, validate, version, issue-token, verify-token)
//!
//! ## Usage
//!
//! ```bash
//! # Start the service (default command)
//! PRIVATE_KEY="$(cat private.pem)" PUBLIC_KEY="$(cat public.pem)" usergate
//!
//! # Validate the environment configuration
//! usergate validate --show-config
//!
//! # Mint a token for operator testing
//! usergate issue-token 42 -p users:profile --ttl-secs 600
//!
//! # Check a token
//! usergate verify-token <token>
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod runtime;
pub mod shutdown;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use runtime::{RuntimeBuilder, ServiceRuntime};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
