// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::cli::Cli;
use crate::error::BinResult;

/// Executes the `version` command to display version information.
pub fn version(_cli: &Cli) -> BinResult<()> {
    println!("TMS - request gate for the training-management web application");
    println!();
    println!("Version Information:");
    println!("  tms-bin:    {}", crate::VERSION);
    println!("  tms-gate:   {}", tms_gate::VERSION);
    println!("  tms-config: {}", tms_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
