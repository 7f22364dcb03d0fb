// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration error types for tms-config.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or checking an [`AppConfig`](crate::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file is not valid YAML, TOML or JSON for the schema.
    #[error("Cannot parse '{path}': {message}")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// A value was read but is not acceptable.
    #[error("Invalid value for '{field}': {message}")]
    Validation {
        /// Dotted path of the offending setting.
        field: String,
        /// Error message.
        message: String,
    },

    /// A mandatory setting has no value.
    #[error("Required setting '{field}' is not set")]
    MissingField {
        /// Dotted path of the setting.
        field: String,
    },

    /// File I/O error.
    #[error("Cannot read '{path}': {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An override variable could not be parsed.
    #[error("Environment variable {name} is invalid: {message}")]
    InvalidEnvVar {
        /// Variable name, prefix included.
        name: String,
        /// Error message.
        message: String,
    },

    /// The configuration path does not exist.
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Requested path.
        path: PathBuf,
    },

    /// Unsupported file format.
    #[error("Unsupported configuration format '{format}', expected yaml, toml or json")]
    UnsupportedFormat {
        /// The format or extension.
        format: String,
    },

    /// Serialization or deserialization failed.
    #[error("Cannot (de)serialize configuration: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },
}

impl ConfigError {
    /// Creates a parse error.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Creates an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid environment variable error.
    pub fn invalid_env_var(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEnvVar {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a file not found error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Returns `true` if the error concerns a missing or invalid secret.
    pub fn is_secret_error(&self) -> bool {
        match self {
            ConfigError::MissingField { field } | ConfigError::Validation { field, .. } => {
                field.ends_with("secret")
            }
            _ => false,
        }
    }
}
