// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Decoder for the authentication framework's session cookie.
//!
//! The session cookie is signed by the framework with its own secret, and
//! carries the subject under `sub` rather than `id`. It is verified by a
//! separate [`JwtManager`] so a purpose-cookie secret can never validate a
//! session token and vice versa.

use super::credential::{ClaimsDecoder, CredentialError};
use super::{Claims, JwtConfig, JwtManager};
use crate::error::GateResult;

/// Verifies session-framework tokens.
#[derive(Debug, Clone)]
pub struct SessionDecoder {
    inner: JwtManager,
}

impl SessionDecoder {
    /// Creates a decoder for the given session configuration.
    pub fn new(config: JwtConfig) -> GateResult<Self> {
        Ok(Self {
            inner: JwtManager::new(config)?,
        })
    }

    /// Builds a decoder only when a session secret is configured.
    pub fn from_optional(config: Option<&JwtConfig>) -> GateResult<Option<Self>> {
        match config {
            Some(config) if !config.secret.trim().is_empty() => Ok(Some(Self::new(config.clone())?)),
            _ => {
                tracing::warn!("No session secret configured, session cookies will not be accepted");
                Ok(None)
            }
        }
    }
}

impl ClaimsDecoder for SessionDecoder {
    fn decode(&self, token: &str) -> Result<Claims, CredentialError> {
        let claims = self.inner.verify(token)?;
        if claims.sub.is_empty() {
            return Err(CredentialError::rejected("session token has no subject"));
        }
        Ok(claims)
    }
}
