// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! uaprobe - simple opc/ua client test routines
//!
//! Main binary entry point.

use clap::Parser;
use uaprobe_bin::cli::{Cli, USAGE};
use uaprobe_bin::error::{report_error_and_exit, BinError, EXIT_MISSING_ARGUMENTS};
use uaprobe_bin::{commands, init_logging};

fn main() {
    if std::env::args_os().len() <= 1 {
        eprint!("{}", USAGE);
        std::process::exit(EXIT_MISSING_ARGUMENTS);
    }

    // Help and version exit 0, malformed arguments exit 2.
    let cli = Cli::try_parse().unwrap_or_else(|e| e.exit());

    init_logging(cli.effective_log_level(), cli.log_format);
    tracing::debug!(version = uaprobe_bin::VERSION, "Starting uaprobe");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => report_error_and_exit(BinError::runtime(e.to_string())),
    };

    if let Err(e) = runtime.block_on(commands::execute(&cli)) {
        report_error_and_exit(e);
    }
}
