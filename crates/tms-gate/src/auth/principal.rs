// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! The resolved identity for one request.

use serde::{Deserialize, Serialize};

use super::{Claims, CredentialSource, Role};

/// Identity resolved from the first credential that verified.
///
/// Built fresh per request and attached to the request extensions by the
/// gate middleware. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Subject id.
    pub id: String,
    /// User's email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// User's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Normalized role.
    pub role: Role,
    /// Role label, lower-cased and trimmed.
    pub role_label: String,
    /// Which cookie slot produced this principal.
    pub source: CredentialSource,
}

impl Principal {
    /// Builds a principal from verified claims.
    pub fn from_claims(claims: &Claims, source: CredentialSource) -> Self {
        let role_label = claims.role_label().trim().to_lowercase();

        Self {
            id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            role: Role::from_label(&role_label),
            role_label,
            source,
        }
    }

    /// Returns `true` if the principal has the given role.
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` if the principal has any of the given roles.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }

    /// Returns `true` if this principal is an administrator.
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_claims_normalizes_role() {
        let claims = Claims::builder("9")
            .role(" Admin ")
            .email("root@example.com")
            .build();
        let principal = Principal::from_claims(&claims, CredentialSource::Dashboard);

        assert_eq!(principal.id, "9");
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.role_label, "admin");
        assert_eq!(principal.email.as_deref(), Some("root@example.com"));
        assert!(principal.is_admin());
    }

    #[test]
    fn test_missing_role_is_unknown() {
        let claims = Claims::builder("9").build();
        let principal = Principal::from_claims(&claims, CredentialSource::Session);

        assert_eq!(principal.role, Role::Unknown);
        assert_eq!(principal.role_label, "");
        assert!(!principal.has_any_role(&[Role::Admin, Role::Instructor]));
    }
}
