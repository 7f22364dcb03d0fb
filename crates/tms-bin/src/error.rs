// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error types for the `tms` binary and their process exit codes.

use thiserror::Error;

/// Result type alias for tms-bin operations.
pub type BinResult<T> = Result<T, BinError>;

/// Process exit codes.
pub mod exit {
    /// Bad or incomplete configuration.
    pub const CONFIG: i32 = 1;
    /// The runtime could not be set up.
    pub const INIT: i32 = 2;
    /// Failure while serving.
    pub const RUNTIME: i32 = 3;
    /// Filesystem or socket failure.
    pub const IO: i32 = 4;
    /// Bad command-line arguments (`EX_USAGE`).
    pub const USAGE: i32 = 64;
}

/// Failures surfaced by `tms` commands.
#[derive(Debug, Error)]
pub enum BinError {
    /// The configuration cannot be turned into a gate.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The runtime could not be set up.
    #[error("startup failed: {0}")]
    Initialization(String),

    /// Failure while serving.
    #[error("{0}")]
    Runtime(String),

    /// Filesystem or socket failure.
    #[error("i/o failure: {0}")]
    Io(String),

    /// Arguments were accepted by clap but make no sense together.
    #[error("{0}")]
    Usage(String),

    /// Raised by the gatekeeper while building or serving.
    #[error(transparent)]
    Gate(#[from] tms_gate::GateError),

    /// Raised while loading the configuration file.
    #[error(transparent)]
    Config(#[from] tms_config::ConfigError),

    /// Another error with a note on what was being attempted.
    #[error("{context}: {source}")]
    WithContext {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: Box<BinError>,
    },
}

impl BinError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a startup error.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Creates a runtime error.
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Creates an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    /// Creates a usage error.
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Wraps the error with what was being attempted.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Exit code for the process, see [`exit`].
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Config(_) => exit::CONFIG,
            Self::Gate(tms_gate::GateError::Configuration { .. }) => exit::CONFIG,
            Self::Initialization(_) => exit::INIT,
            Self::Runtime(_) | Self::Gate(_) => exit::RUNTIME,
            Self::Io(_) => exit::IO,
            Self::Usage(_) => exit::USAGE,
            Self::WithContext { source, .. } => source.exit_code(),
        }
    }
}

impl From<std::io::Error> for BinError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<anyhow::Error> for BinError {
    fn from(err: anyhow::Error) -> Self {
        Self::Runtime(format!("{:#}", err))
    }
}

/// Writes `error` and every underlying cause to stderr.
pub fn report_error(error: &BinError) {
    eprintln!("tms: {}", error);

    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        eprintln!("  caused by: {}", inner);
        cause = inner.source();
    }
}

/// Reports `error` and terminates the process.
pub fn report_error_and_exit(error: BinError) -> ! {
    report_error(&error);
    std::process::exit(error.exit_code())
}
