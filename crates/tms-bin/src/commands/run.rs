// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Executes the `run` command to start the gate server.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let config_path = cli.config_path();
    match &config_path {
        Some(path) => info!(config = %path.display(), "Starting TMS gate"),
        None => info!("Starting TMS gate with environment configuration"),
    }

    let runtime = RuntimeBuilder::new()
        .config_path(config_path)
        .host(args.host)
        .port(args.port)
        .build()?;

    runtime.run().await
}
