// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! `tms` - request gate for the training-management web application.

use tms_bin::cli::Cli;
use tms_bin::error::report_error_and_exit;
use tms_bin::logging::{self, LogOptions};
use tms_bin::commands;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let file = commands::file_logging(&cli);
    let options = file
        .as_ref()
        .map(|l| LogOptions {
            with_target: l.with_target,
            with_file: l.with_file,
        })
        .unwrap_or_default();
    let level = cli.effective_log_level(file.as_ref());
    let format = cli.effective_log_format(file.as_ref());

    if let Err(e) = logging::init_logging_with(&level, format, options) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
