// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gate error types and HTTP mapping.
//!
//! The gatekeeper itself never surfaces these to a browser: any error raised
//! while evaluating a request is turned into a login redirect. They do reach
//! the JSON endpoints (`/api/auth/*`) and the startup path.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::CredentialError;

/// Result type alias for gate operations.
pub type GateResult<T> = Result<T, GateError>;

// =============================================================================
// GateError
// =============================================================================

/// Error type for the gate crate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Invalid or incomplete configuration (startup only).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message.
        message: String,
    },

    /// The `Cookie` header could not be read.
    #[error("Malformed cookie header: {message}")]
    MalformedCookie {
        /// Error message.
        message: String,
    },

    /// No usable credential was presented (401).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Error message.
        message: String,
    },

    /// Credential verification failed.
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),

    /// Internal server error (500).
    #[error("Internal error: {message}")]
    Internal {
        /// Error message (for logging, not user-facing).
        message: String,
    },
}

impl GateError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a malformed cookie error.
    pub fn malformed_cookie(message: impl Into<String>) -> Self {
        Self::MalformedCookie {
            message: message.into(),
        }
    }

    /// Creates an unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::Configuration { .. } | GateError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            GateError::MalformedCookie { .. } => StatusCode::BAD_REQUEST,
            GateError::Unauthorized { .. } | GateError::Credential(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Returns the error code for categorization.
    pub fn error_code(&self) -> &'static str {
        match self {
            GateError::Configuration { .. } => "CONFIGURATION_ERROR",
            GateError::MalformedCookie { .. } => "MALFORMED_COOKIE",
            GateError::Unauthorized { .. } => "UNAUTHORIZED",
            GateError::Credential(_) => "INVALID_CREDENTIAL",
            GateError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Returns a message that is safe to show to end users.
    ///
    /// Credential failures are deliberately collapsed into one message so a
    /// caller cannot tell an expired token from a forged one.
    pub fn user_message(&self) -> String {
        match self {
            GateError::Unauthorized { .. } | GateError::Credential(_) => {
                "Authentication required".to_string()
            }
            GateError::MalformedCookie { .. } => "Malformed cookie header".to_string(),
            GateError::Configuration { .. } | GateError::Internal { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    /// Returns `true` if this error should be logged at error level.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            GateError::Configuration { .. } | GateError::Internal { .. }
        )
    }
}

// =============================================================================
// IntoResponse Implementation
// =============================================================================

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if self.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                error_code = error_code,
                status = %status,
                "Client error occurred"
            );
        }

        let body = ErrorResponseBody {
            error: ErrorDetails {
                code: error_code.to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Error Response Body
// =============================================================================

/// Error response body structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseBody {
    /// Error details.
    pub error: ErrorDetails,
}

/// Error details within the response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl From<std::io::Error> for GateError {
    fn from(err: std::io::Error) -> Self {
        GateError::internal(format!("IO error: {}", err))
    }
}

// =============================================================================
// Tests
// =============================================================================
