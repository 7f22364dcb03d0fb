// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Logging and tracing initialization.

use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::LogFormat;
use crate::error::{BinError, BinResult};

/// Noisy dependencies kept at a quieter level.
const DEPENDENCY_DIRECTIVES: &[&str] = &["hyper=warn", "tower=warn", "axum=info", "tokio=info"];

// =============================================================================
// Logging Initialization
// =============================================================================

/// Output toggles beyond level and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Include span targets.
    pub with_target: bool,
    /// Include file and line.
    pub with_file: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            with_target: true,
            with_file: false,
        }
    }
}

/// Initializes the logging subsystem.
///
/// `RUST_LOG` wins over `level` when set.
///
/// ```ignore
/// use tms_bin::cli::LogFormat;
/// use tms_bin::logging::init_logging;
///
/// init_logging("info", LogFormat::Text)?;
/// ```
pub fn init_logging(level: &str, format: LogFormat) -> BinResult<()> {
    init_logging_with(level, format, LogOptions::default())
}

/// Initializes the logging subsystem with explicit output toggles.
pub fn init_logging_with(level: &str, format: LogFormat, options: LogOptions) -> BinResult<()> {
    let filter = build_filter(level)?;

    match format {
        LogFormat::Text => init_text_logging(filter, options),
        LogFormat::Json => init_json_logging(filter, options),
        LogFormat::Compact => init_compact_logging(filter, options),
    }
}

/// Builds the env filter for a level string.
pub fn build_filter(level: &str) -> BinResult<EnvFilter> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(parse_level(level).as_str()));

    for directive in DEPENDENCY_DIRECTIVES {
        let directive = directive
            .parse()
            .map_err(|e| BinError::init(format!("invalid log directive '{}': {}", directive, e)))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

fn init_text_logging(filter: EnvFilter, options: LogOptions) -> BinResult<()> {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(options.with_target)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(options.with_file)
                .with_line_number(options.with_file)
                .with_ansi(is_terminal),
        )
        .try_init()
        .map_err(|e| BinError::init(format!("failed to install logger: {}", e)))
}

fn init_json_logging(filter: EnvFilter, options: LogOptions) -> BinResult<()> {
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .with_target(options.with_target)
                .with_file(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true),
        )
        .try_init()
        .map_err(|e| BinError::init(format!("failed to install logger: {}", e)))
}

fn init_compact_logging(filter: EnvFilter, options: LogOptions) -> BinResult<()> {
    let is_terminal = std::io::IsTerminal::is_terminal(&std::io::stdout());

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(options.with_file)
                .with_line_number(options.with_file)
                .with_ansi(is_terminal),
        )
        .try_init()
        .map_err(|e| BinError::init(format!("failed to install logger: {}", e)))
}

// =============================================================================
// Log Level Parsing
// =============================================================================

/// Parses a log level string into a `Level`, defaulting to `INFO`.
pub fn parse_level(level: &str) -> Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

// =============================================================================
// Tests
// =============================================================================
