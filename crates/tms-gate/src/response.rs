// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Response bodies of the host server.

use serde::{Deserialize, Serialize};

use crate::auth::{CredentialSource, Principal, Role};

/// Liveness response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Version string.
    pub version: String,
}

impl HealthResponse {
    /// Creates a healthy response.
    pub fn healthy() -> Self {
        Self {
            status: "ok".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Current session, as reported by `GET /api/auth/session`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    /// The signed-in user.
    pub user: SessionUser,
    /// Credential that produced the session.
    pub source: CredentialSource,
}

/// User part of a [`SessionResponse`].
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionUser {
    /// Subject id.
    pub id: String,
    /// Email, if the credential carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name, if the credential carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Normalized role.
    pub role: Role,
}

impl From<Principal> for SessionResponse {
    fn from(principal: Principal) -> Self {
        Self {
            source: principal.source,
            user: SessionUser {
                id: principal.id,
                email: principal.email,
                name: principal.name,
                role: principal.role,
            },
        }
    }
}

/// Response of `POST /api/auth/logout`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    /// Always `true`.
    pub success: bool,
    /// Cookies that were expired.
    pub cleared: Vec<String>,
}

/// Placeholder body served for gated pages.
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    /// Requested path.
    pub path: String,
    /// Principal the gate resolved, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
}
