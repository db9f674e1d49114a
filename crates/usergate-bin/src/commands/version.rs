// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use usergate_api::auth::Permission;

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    let permissions: Vec<&str> = Permission::all().iter().map(Permission::as_str).collect();

    println!("usergate - authorization gate for the user-profile API");
    println!();
    println!("Version Information:");
    println!("  usergate-bin: {}", crate::VERSION);
    println!("  usergate-api: {}", usergate_api::VERSION);
    println!();
    println!("Build Information:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Permissions:    {}", permissions.join(", "));
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
