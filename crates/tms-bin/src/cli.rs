// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `run`: Start the gate server (default)
//! - `validate`: Validate the configuration
//! - `version`: Show version information
//! - `token`: Mint a purpose credential for local testing
//! - `check`: Evaluate a path and cookies offline

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tms_config::LoggingConfig;
use tms_gate::CredentialSource;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "tms.yaml";

// =============================================================================
// Main CLI Structure
// =============================================================================

/// Request gate for the training-management web application.
///
/// Checks every page request for a signed credential cookie, enforces the
/// role route table, and redirects to login or a landing page otherwise.
#[derive(Parser, Debug)]
#[command(
    name = "tms",
    author = "Sylvex <contact@sylvex.io>",
    version = tms_gate::VERSION,
    about = "Role-based request gate for the training-management web application",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path (defaults to ./tms.yaml when present)
    #[arg(short, long, env = "TMS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the `tms` CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the gate server
    ///
    /// This is the default command when no subcommand is specified.
    Run(RunArgs),

    /// Validate the configuration
    ///
    /// Loads and validates the configuration, then builds the gatekeeper
    /// without binding a socket.
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,

    /// Mint a purpose credential
    ///
    /// Signs a token with the configured secret for the given subject and
    /// role. Meant for local development against a running gate.
    Token(TokenArgs),

    /// Evaluate a request offline
    ///
    /// Runs the gatekeeper against a path and cookies and prints the
    /// decision without starting the server.
    Check(CheckArgs),
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `run` command.
#[derive(Args, Debug, Default, Clone)]
pub struct RunArgs {
    /// Override the bind address
    #[arg(long)]
    pub host: Option<IpAddr>,

    /// Override the bind port
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `token` command.
#[derive(Args, Debug, Clone)]
pub struct TokenArgs {
    /// Subject id
    pub subject: String,

    /// Role label (admin, instructor, participant, ...)
    pub role: String,

    /// Credential source the token is meant for
    #[arg(short, long, default_value = "dashboard")]
    pub source: SourceArg,

    /// Email claim
    #[arg(long)]
    pub email: Option<String>,

    /// Name claim
    #[arg(long)]
    pub name: Option<String>,

    /// Lifetime in seconds (defaults to auth.token_expiration_secs)
    #[arg(long)]
    pub expires_in: Option<i64>,

    /// Print a `name=value` cookie pair instead of the bare token
    #[arg(long)]
    pub cookie: bool,
}

/// Arguments for the `check` command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Request path, e.g. `/dashboard`
    pub path: String,

    /// Cookie as `name=value`; repeatable
    #[arg(short = 'k', long = "cookie")]
    pub cookies: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<tms_config::LogFormat> for LogFormat {
    fn from(format: tms_config::LogFormat) -> Self {
        match format {
            tms_config::LogFormat::Text => LogFormat::Text,
            tms_config::LogFormat::Json => LogFormat::Json,
            tms_config::LogFormat::Compact => LogFormat::Compact,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

/// Credential source selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceArg {
    /// Admin cookie
    Admin,
    /// Dashboard cookie
    Dashboard,
    /// Debug cookie
    Debug,
    /// Session cookie (needs `auth.session_secret`)
    Session,
}

impl From<SourceArg> for CredentialSource {
    fn from(source: SourceArg) -> Self {
        match source {
            SourceArg::Admin => CredentialSource::Admin,
            SourceArg::Dashboard => CredentialSource::Dashboard,
            SourceArg::Debug => CredentialSource::Debug,
            SourceArg::Session => CredentialSource::Session,
        }
    }
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Run` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Run(RunArgs::default()))
    }

    /// Returns the config file to load, if any.
    ///
    /// An explicit `--config` is always returned, even if missing, so the
    /// loader can report it. Otherwise `./tms.yaml` is used when it exists.
    pub fn config_path(&self) -> Option<PathBuf> {
        match &self.config {
            Some(path) => Some(path.clone()),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                default.exists().then(|| default.to_path_buf())
            }
        }
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level based on flags, then the config file.
    pub fn effective_log_level(&self, file: Option<&LoggingConfig>) -> String {
        if self.quiet {
            "warn".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else if let Some(level) = &self.log_level {
            level.clone()
        } else {
            file.map(|l| l.level.as_str())
                .unwrap_or("info")
                .to_string()
        }
    }

    /// Get the effective log format based on flags, then the config file.
    pub fn effective_log_format(&self, file: Option<&LoggingConfig>) -> LogFormat {
        self.log_format
            .or_else(|| file.map(|l| l.format.into()))
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
