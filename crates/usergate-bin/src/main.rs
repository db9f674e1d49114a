// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! usergate binary entry point.

use usergate_bin::error::report_error_and_exit;
use usergate_bin::{commands, init_logging, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.effective_log_level(), cli.log_format);

    if let Err(e) = commands::execute(cli).await {
        tracing::error!(error = %e, exit_code = e.exit_code(), "usergate failed");
        report_error_and_exit(e);
    }
}
