// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # tms-bin
//!
//! Command-line host for the training-management request gate.
//!
//! - CLI argument parsing with clap
//! - Configuration loading and bridging into the gate
//! - Logging initialization
//! - Graceful shutdown handling
//! - Developer commands for minting credentials and dry-running decisions
//!
//! ## Architecture
//!
//! ```text
//!                 main.rs
//!                    │
//!                 cli.rs
//!                    │
//!        ┌───────────┼───────────┐
//!        ▼           ▼           ▼
//!    commands     runtime     logging
//!                    │
//!                 shutdown
//!                    │
//!              tms-gate / tms-config
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the gate (default command)
//! tms -c /etc/tms/tms.yaml
//!
//! # Validate configuration
//! tms validate
//!
//! # Mint a dashboard credential for a local session
//! tms token 42 instructor --cookie
//!
//! # Dry-run a request
//! tms check /dashboard --cookie dashboard_token=eyJ...
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
pub use runtime::{GateRuntime, RuntimeBuilder, gate_config};
pub use shutdown::{ShutdownCoordinator, ShutdownSignal};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
