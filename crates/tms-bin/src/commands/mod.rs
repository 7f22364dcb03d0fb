// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Start the gate server
//! - `validate`: Validate the configuration
//! - `version`: Show version information
//! - `token`: Mint a purpose credential
//! - `check`: Evaluate a request offline

mod check;
mod run;
mod token;
mod validate;
mod version;

pub use check::check;
pub use run::run;
pub use token::token;
pub use validate::validate;
pub use version::version;

use tms_config::LoggingConfig;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;
use crate::runtime::load_app_config;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
        Commands::Token(args) => token::token(&cli, args),
        Commands::Check(args) => check::check(&cli, args),
    }
}

/// Returns the logging section of the configuration, if it loads.
///
/// Called before logging is up, so load errors are left for the command
/// itself to report.
pub fn file_logging(cli: &Cli) -> Option<LoggingConfig> {
    load_app_config(cli.config_path().as_deref())
        .ok()
        .map(|config| config.logging)
}
